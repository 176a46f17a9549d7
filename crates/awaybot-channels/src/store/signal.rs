//! SignalStore: identities, sessions, prekeys, sender keys. Every table
//! here is a single blob per key, so this is all keyed-row helpers.

use async_trait::async_trait;
use wacore::store::error::db_err;
use wacore::store::traits::SignalStore;

use super::{SqlxSessionStore, StoreResult};

#[async_trait]
impl SignalStore for SqlxSessionStore {
    async fn put_identity(&self, address: &str, key: [u8; 32]) -> StoreResult<()> {
        self.put_keyed(
            "INSERT OR REPLACE INTO identities (address, key_data) VALUES (?, ?)",
            address,
            &key,
        )
        .await
    }

    async fn load_identity(&self, address: &str) -> StoreResult<Option<Vec<u8>>> {
        self.fetch_keyed("SELECT key_data FROM identities WHERE address = ?", address)
            .await
    }

    async fn delete_identity(&self, address: &str) -> StoreResult<()> {
        self.delete_keyed("DELETE FROM identities WHERE address = ?", address)
            .await
    }

    async fn get_session(&self, address: &str) -> StoreResult<Option<Vec<u8>>> {
        self.fetch_keyed(
            "SELECT session_data FROM sessions WHERE address = ?",
            address,
        )
        .await
    }

    async fn put_session(&self, address: &str, session: &[u8]) -> StoreResult<()> {
        self.put_keyed(
            "INSERT OR REPLACE INTO sessions (address, session_data) VALUES (?, ?)",
            address,
            session,
        )
        .await
    }

    async fn delete_session(&self, address: &str) -> StoreResult<()> {
        self.delete_keyed("DELETE FROM sessions WHERE address = ?", address)
            .await
    }

    async fn store_prekey(&self, id: u32, record: &[u8], uploaded: bool) -> StoreResult<()> {
        // The upload flag rides along, so this one bypasses the helpers.
        sqlx::query("INSERT OR REPLACE INTO prekeys (id, record, uploaded) VALUES (?, ?, ?)")
            .bind(i64::from(id))
            .bind(record)
            .bind(uploaded)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn load_prekey(&self, id: u32) -> StoreResult<Option<Vec<u8>>> {
        self.fetch_slot("SELECT record FROM prekeys WHERE id = ?", id)
            .await
    }

    async fn remove_prekey(&self, id: u32) -> StoreResult<()> {
        self.delete_slot("DELETE FROM prekeys WHERE id = ?", id).await
    }

    async fn store_signed_prekey(&self, id: u32, record: &[u8]) -> StoreResult<()> {
        self.put_slot(
            "INSERT OR REPLACE INTO signed_prekeys (id, record) VALUES (?, ?)",
            id,
            record,
        )
        .await
    }

    async fn load_signed_prekey(&self, id: u32) -> StoreResult<Option<Vec<u8>>> {
        self.fetch_slot("SELECT record FROM signed_prekeys WHERE id = ?", id)
            .await
    }

    async fn load_all_signed_prekeys(&self) -> StoreResult<Vec<(u32, Vec<u8>)>> {
        let rows: Vec<(i64, Vec<u8>)> = sqlx::query_as("SELECT id, record FROM signed_prekeys")
            .fetch_all(self.pool())
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|(id, r)| (id as u32, r)).collect())
    }

    async fn remove_signed_prekey(&self, id: u32) -> StoreResult<()> {
        self.delete_slot("DELETE FROM signed_prekeys WHERE id = ?", id)
            .await
    }

    async fn put_sender_key(&self, address: &str, record: &[u8]) -> StoreResult<()> {
        self.put_keyed(
            "INSERT OR REPLACE INTO sender_keys (address, record) VALUES (?, ?)",
            address,
            record,
        )
        .await
    }

    async fn get_sender_key(&self, address: &str) -> StoreResult<Option<Vec<u8>>> {
        self.fetch_keyed("SELECT record FROM sender_keys WHERE address = ?", address)
            .await
    }

    async fn delete_sender_key(&self, address: &str) -> StoreResult<()> {
        self.delete_keyed("DELETE FROM sender_keys WHERE address = ?", address)
            .await
    }
}
