//! DeviceStore: the paired device identity. A single-row table, keyed by
//! a constant id.

use async_trait::async_trait;
use wacore::store::error::{db_err, StoreError};
use wacore::store::traits::DeviceStore;
use wacore::store::Device;

use super::{SqlxSessionStore, StoreResult};

// Device's serde impls (key_pair_serde, BigArray) call deserialize_bytes,
// which JSON cannot represent, so this blob is bincode rather than the
// JSON used elsewhere in the store.
const DEVICE_ROW: i64 = 1;

#[async_trait]
impl DeviceStore for SqlxSessionStore {
    async fn save(&self, device: &Device) -> StoreResult<()> {
        let data =
            bincode::serialize(device).map_err(|e| StoreError::Serialization(e.to_string()))?;
        sqlx::query("INSERT OR REPLACE INTO device_info (id, data) VALUES (?, ?)")
            .bind(DEVICE_ROW)
            .bind(&data)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn load(&self) -> StoreResult<Option<Device>> {
        let data: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT data FROM device_info WHERE id = ?")
                .bind(DEVICE_ROW)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err)?;
        data.map(|d| {
            bincode::deserialize(&d).map_err(|e| StoreError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn exists(&self) -> StoreResult<bool> {
        let row: Option<i64> = sqlx::query_scalar("SELECT id FROM device_info WHERE id = ?")
            .bind(DEVICE_ROW)
            .fetch_optional(self.pool())
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }

    async fn create(&self) -> StoreResult<i32> {
        // Pairing writes the actual device data through save(); nothing to
        // insert up front for a single-device store.
        Ok(DEVICE_ROW as i32)
    }
}
