//! AppSyncStore: app-state sync keys, per-collection hash state, and the
//! mutation MACs used to validate patches.

use async_trait::async_trait;
use wacore::appstate::hash::HashState;
use wacore::appstate::processor::AppStateMutationMAC;
use wacore::store::error::db_err;
use wacore::store::traits::{AppStateSyncKey, AppSyncStore};

use super::{from_json, to_json, SqlxSessionStore, StoreResult};

#[async_trait]
impl AppSyncStore for SqlxSessionStore {
    async fn get_sync_key(&self, key_id: &[u8]) -> StoreResult<Option<AppStateSyncKey>> {
        let row: Option<(Vec<u8>, i64, Option<Vec<u8>>)> = sqlx::query_as(
            "SELECT key_data, timestamp, fingerprint FROM app_sync_keys WHERE key_id = ?",
        )
        .bind(key_id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(
            row.map(|(key_data, timestamp, fingerprint)| AppStateSyncKey {
                key_data,
                timestamp,
                fingerprint: fingerprint.unwrap_or_default(),
            }),
        )
    }

    async fn set_sync_key(&self, key_id: &[u8], key: AppStateSyncKey) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO app_sync_keys (key_id, key_data, timestamp, fingerprint) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(key_id)
        .bind(&key.key_data)
        .bind(key.timestamp)
        .bind(&key.fingerprint)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    /// A collection with no stored row is at the zero hash state, not an
    /// error.
    async fn get_version(&self, name: &str) -> StoreResult<HashState> {
        let data: Option<String> =
            sqlx::query_scalar("SELECT data FROM app_versions WHERE collection = ?")
                .bind(name)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err)?;
        match data {
            Some(data) => from_json(&data),
            None => Ok(HashState::default()),
        }
    }

    async fn set_version(&self, name: &str, state: HashState) -> StoreResult<()> {
        let data = to_json(&state)?;
        sqlx::query("INSERT OR REPLACE INTO app_versions (collection, data) VALUES (?, ?)")
            .bind(name)
            .bind(&data)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn put_mutation_macs(
        &self,
        name: &str,
        version: u64,
        mutations: &[AppStateMutationMAC],
    ) -> StoreResult<()> {
        // All MACs of a patch land together or not at all; a half-applied
        // patch would fail validation on the next sync.
        let mut tx = self.pool().begin().await.map_err(db_err)?;
        for m in mutations {
            sqlx::query(
                "INSERT OR REPLACE INTO mutation_macs (collection, index_mac, version, value_mac) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(name)
            .bind(&m.index_mac)
            .bind(version as i64)
            .bind(&m.value_mac)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    async fn get_mutation_mac(&self, name: &str, index_mac: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        sqlx::query_scalar(
            "SELECT value_mac FROM mutation_macs WHERE collection = ? AND index_mac = ?",
        )
        .bind(name)
        .bind(index_mac)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)
    }

    async fn delete_mutation_macs(&self, name: &str, index_macs: &[Vec<u8>]) -> StoreResult<()> {
        let mut tx = self.pool().begin().await.map_err(db_err)?;
        for mac in index_macs {
            sqlx::query("DELETE FROM mutation_macs WHERE collection = ? AND index_mac = ?")
                .bind(name)
                .bind(mac)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }
}
