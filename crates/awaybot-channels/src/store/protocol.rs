//! ProtocolStore: group send bookkeeping (SKDM recipients, forget marks),
//! LID/PN mappings, retry base keys, cached device lists.

use async_trait::async_trait;
use wacore::store::error::db_err;
use wacore::store::traits::{DeviceListRecord, LidPnMappingEntry, ProtocolStore};

use super::{from_json, to_json, SqlxSessionStore, StoreResult};

/// Rows from `lid_mappings` always select the same five columns in the
/// same order; both lookup directions funnel through this.
fn lid_entry(
    (lid, phone_number, created_at, updated_at, learning_source): (String, String, i64, i64, String),
) -> LidPnMappingEntry {
    LidPnMappingEntry {
        lid,
        phone_number,
        created_at,
        updated_at,
        learning_source,
    }
}

const LID_COLUMNS: &str = "lid, phone_number, created_at, updated_at, learning_source";

#[async_trait]
impl ProtocolStore for SqlxSessionStore {
    async fn get_skdm_recipients(&self, group_jid: &str) -> StoreResult<Vec<String>> {
        self.fetch_strings(
            "SELECT device_jid FROM skdm_recipients WHERE group_jid = ?",
            group_jid,
        )
        .await
    }

    async fn add_skdm_recipients(&self, group_jid: &str, device_jids: &[String]) -> StoreResult<()> {
        // One transaction for the batch; a partial recipient list would
        // mean skipping devices on the next group send.
        let mut tx = self.pool().begin().await.map_err(db_err)?;
        for device in device_jids {
            sqlx::query(
                "INSERT OR IGNORE INTO skdm_recipients (group_jid, device_jid) VALUES (?, ?)",
            )
            .bind(group_jid)
            .bind(device)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)
    }

    async fn clear_skdm_recipients(&self, group_jid: &str) -> StoreResult<()> {
        self.delete_keyed(
            "DELETE FROM skdm_recipients WHERE group_jid = ?",
            group_jid,
        )
        .await
    }

    async fn get_lid_mapping(&self, lid: &str) -> StoreResult<Option<LidPnMappingEntry>> {
        let row = sqlx::query_as(&format!(
            "SELECT {LID_COLUMNS} FROM lid_mappings WHERE lid = ?"
        ))
        .bind(lid)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(lid_entry))
    }

    async fn get_pn_mapping(&self, phone: &str) -> StoreResult<Option<LidPnMappingEntry>> {
        let row = sqlx::query_as(&format!(
            "SELECT {LID_COLUMNS} FROM lid_mappings WHERE phone_number = ?"
        ))
        .bind(phone)
        .fetch_optional(self.pool())
        .await
        .map_err(db_err)?;
        Ok(row.map(lid_entry))
    }

    async fn put_lid_mapping(&self, entry: &LidPnMappingEntry) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT OR REPLACE INTO lid_mappings ({LID_COLUMNS}) VALUES (?, ?, ?, ?, ?)"
        ))
        .bind(&entry.lid)
        .bind(&entry.phone_number)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .bind(&entry.learning_source)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_all_lid_mappings(&self) -> StoreResult<Vec<LidPnMappingEntry>> {
        let rows: Vec<(String, String, i64, i64, String)> =
            sqlx::query_as(&format!("SELECT {LID_COLUMNS} FROM lid_mappings"))
                .fetch_all(self.pool())
                .await
                .map_err(db_err)?;
        Ok(rows.into_iter().map(lid_entry).collect())
    }

    async fn save_base_key(
        &self,
        address: &str,
        message_id: &str,
        base_key: &[u8],
    ) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO base_keys (address, message_id, base_key) VALUES (?, ?, ?)",
        )
        .bind(address)
        .bind(message_id)
        .bind(base_key)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn has_same_base_key(
        &self,
        address: &str,
        message_id: &str,
        current_base_key: &[u8],
    ) -> StoreResult<bool> {
        let stored: Option<Vec<u8>> =
            sqlx::query_scalar("SELECT base_key FROM base_keys WHERE address = ? AND message_id = ?")
                .bind(address)
                .bind(message_id)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err)?;
        Ok(stored.as_deref() == Some(current_base_key))
    }

    async fn delete_base_key(&self, address: &str, message_id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM base_keys WHERE address = ? AND message_id = ?")
            .bind(address)
            .bind(message_id)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn update_device_list(&self, record: DeviceListRecord) -> StoreResult<()> {
        let data = to_json(&record)?;
        sqlx::query("INSERT OR REPLACE INTO device_lists (user, data) VALUES (?, ?)")
            .bind(&record.user)
            .bind(&data)
            .execute(self.pool())
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_devices(&self, user: &str) -> StoreResult<Option<DeviceListRecord>> {
        let data: Option<String> =
            sqlx::query_scalar("SELECT data FROM device_lists WHERE user = ?")
                .bind(user)
                .fetch_optional(self.pool())
                .await
                .map_err(db_err)?;
        data.as_deref().map(from_json).transpose()
    }

    async fn mark_forget_sender_key(&self, group_jid: &str, participant: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO forget_sender_keys (group_jid, participant) VALUES (?, ?)",
        )
        .bind(group_jid)
        .bind(participant)
        .execute(self.pool())
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn consume_forget_marks(&self, group_jid: &str) -> StoreResult<Vec<String>> {
        // Read and delete atomically so a mark is consumed exactly once.
        let mut tx = self.pool().begin().await.map_err(db_err)?;
        let participants: Vec<String> =
            sqlx::query_scalar("SELECT participant FROM forget_sender_keys WHERE group_jid = ?")
                .bind(group_jid)
                .fetch_all(&mut *tx)
                .await
                .map_err(db_err)?;
        sqlx::query("DELETE FROM forget_sender_keys WHERE group_jid = ?")
            .bind(group_jid)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        tx.commit().await.map_err(db_err)?;
        Ok(participants)
    }
}
