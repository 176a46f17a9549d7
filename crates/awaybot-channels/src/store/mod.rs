//! SQLx-based session storage for `whatsapp-rust`.
//!
//! Implements the library's `Backend` trait bundle (DeviceStore + SignalStore
//! + ProtocolStore + AppSyncStore) on top of a dedicated SQLite database, so
//! pairing survives restarts. Using sqlx directly avoids the
//! `libsqlite3-sys` version conflict between sqlx and diesel (which the
//! upstream `whatsapp-rust-sqlite-storage` crate pulls in).
//!
//! Most of what the library persists is one blob under one key, so the
//! trait impls in the submodules go through the keyed-row helpers below
//! and only spell out SQL inline where a row carries more columns.

mod app_sync;
mod device;
mod protocol;
mod signal;

use sqlx::{Pool, Sqlite, SqlitePool};
use wacore::store::error::{db_err, StoreError};

pub(super) type StoreResult<T> = wacore::store::error::Result<T>;

/// One table per concern the library persists: device identity, Signal
/// crypto material, protocol bookkeeping, and app-state sync.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS device_info (
        id INTEGER PRIMARY KEY,
        data BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS identities (
        address TEXT PRIMARY KEY,
        key_data BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        address TEXT PRIMARY KEY,
        session_data BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS prekeys (
        id INTEGER PRIMARY KEY,
        record BLOB NOT NULL,
        uploaded INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS signed_prekeys (
        id INTEGER PRIMARY KEY,
        record BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sender_keys (
        address TEXT PRIMARY KEY,
        record BLOB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS skdm_recipients (
        group_jid TEXT NOT NULL,
        device_jid TEXT NOT NULL,
        PRIMARY KEY (group_jid, device_jid)
    )",
    "CREATE TABLE IF NOT EXISTS lid_mappings (
        lid TEXT PRIMARY KEY,
        phone_number TEXT NOT NULL,
        created_at INTEGER NOT NULL DEFAULT 0,
        updated_at INTEGER NOT NULL DEFAULT 0,
        learning_source TEXT NOT NULL DEFAULT ''
    )",
    "CREATE TABLE IF NOT EXISTS base_keys (
        address TEXT NOT NULL,
        message_id TEXT NOT NULL,
        base_key BLOB NOT NULL,
        PRIMARY KEY (address, message_id)
    )",
    "CREATE TABLE IF NOT EXISTS device_lists (
        user TEXT PRIMARY KEY,
        data TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS forget_sender_keys (
        group_jid TEXT NOT NULL,
        participant TEXT NOT NULL,
        PRIMARY KEY (group_jid, participant)
    )",
    "CREATE TABLE IF NOT EXISTS app_sync_keys (
        key_id BLOB PRIMARY KEY,
        key_data BLOB NOT NULL,
        timestamp INTEGER NOT NULL DEFAULT 0,
        fingerprint BLOB
    )",
    "CREATE TABLE IF NOT EXISTS app_versions (
        collection TEXT PRIMARY KEY,
        data TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS mutation_macs (
        collection TEXT NOT NULL,
        index_mac BLOB NOT NULL,
        version INTEGER NOT NULL,
        value_mac BLOB NOT NULL,
        PRIMARY KEY (collection, index_mac)
    )",
];

/// SQLx-backed WhatsApp session store.
pub struct SqlxSessionStore {
    pool: Pool<Sqlite>,
}

impl SqlxSessionStore {
    /// Open (or create) the session database and initialize the schema.
    /// The DDL runs in one transaction: either every table exists
    /// afterwards or none were touched.
    pub async fn new(db_path: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePool::connect(&format!("sqlite:{db_path}?mode=rwc")).await?;
        let mut tx = pool.begin().await?;
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(Self { pool })
    }

    pub(super) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Upsert one blob under a text key. `sql` names table and columns
    /// and binds key first, value second.
    pub(super) async fn put_keyed(
        &self,
        sql: &'static str,
        key: &str,
        value: &[u8],
    ) -> StoreResult<()> {
        sqlx::query(sql)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Fetch the blob stored under a text key, if any.
    pub(super) async fn fetch_keyed(
        &self,
        sql: &'static str,
        key: &str,
    ) -> StoreResult<Option<Vec<u8>>> {
        sqlx::query_scalar(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Delete whatever is stored under a text key; absent rows are fine.
    pub(super) async fn delete_keyed(&self, sql: &'static str, key: &str) -> StoreResult<()> {
        sqlx::query(sql)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Same as [`put_keyed`](Self::put_keyed) for integer-keyed tables
    /// (prekey slots).
    pub(super) async fn put_slot(
        &self,
        sql: &'static str,
        id: u32,
        record: &[u8],
    ) -> StoreResult<()> {
        sqlx::query(sql)
            .bind(i64::from(id))
            .bind(record)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    pub(super) async fn fetch_slot(
        &self,
        sql: &'static str,
        id: u32,
    ) -> StoreResult<Option<Vec<u8>>> {
        sqlx::query_scalar(sql)
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)
    }

    pub(super) async fn delete_slot(&self, sql: &'static str, id: u32) -> StoreResult<()> {
        sqlx::query(sql)
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Fetch every string in the first result column for a key.
    pub(super) async fn fetch_strings(
        &self,
        sql: &'static str,
        key: &str,
    ) -> StoreResult<Vec<String>> {
        sqlx::query_scalar(sql)
            .bind(key)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }
}

/// JSON (de)serialization with the library's error type, for the records
/// stored as JSON text columns.
pub(super) fn to_json<T: serde::Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub(super) fn from_json<T: serde::de::DeserializeOwned>(data: &str) -> StoreResult<T> {
    serde_json::from_str(data).map_err(|e| StoreError::Serialization(e.to_string()))
}
