use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::db::models::NewPair;
use crate::db::schema::kv_pairs;

use super::{KeyValueStore, StoreError, StoreResult, validate_key};

const CREATE_KV_PAIRS: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_pairs (
        pair_key TEXT PRIMARY KEY NOT NULL,
        pair_value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
"#;

fn establish_connection(path: &str) -> StoreResult<SqliteConnection> {
    SqliteConnection::establish(path).map_err(|e| StoreError::Connection(e.to_string()))
}

/// SQLite dialect of the `anysql` family. Serves `sqlite:`, `websql:` and
/// `cordova-sqlite:` URLs.
///
/// A single connection is held while the store is open, so `:memory:`
/// databases live as long as the store stays open.
pub struct SqliteKvStore {
    url: String,
    db_path: Arc<String>,
    conn: Arc<Mutex<Option<SqliteConnection>>>,
}

impl SqliteKvStore {
    pub fn new(url: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            db_path: Arc::new(db_path.into()),
            conn: Arc::new(Mutex::new(None)),
        }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    async fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> StoreResult<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            let conn = guard.as_mut().ok_or(StoreError::NotOpen)?;
            f(conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    fn url(&self) -> &str {
        &self.url
    }

    fn backend(&self) -> &str {
        "anysql/sqlite"
    }

    async fn open(&self) -> StoreResult<()> {
        let conn = self.conn.clone();
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            if guard.is_some() {
                return Ok(());
            }

            let mut connection = establish_connection(&db_path)?;
            diesel::sql_query(CREATE_KV_PAIRS)
                .execute(&mut connection)
                .map_err(|e| StoreError::Migration(e.to_string()))?;
            *guard = Some(connection);
            debug!(path = %db_path, "opened sqlite store");
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    async fn close(&self) -> StoreResult<()> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            if conn.lock().take().is_some() {
                debug!("closed sqlite store");
            }
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        validate_key(key)?;
        let key = key.to_string();
        let raw = self
            .with_connection(move |conn| {
                use crate::db::schema::kv_pairs::dsl::*;
                kv_pairs
                    .filter(pair_key.eq(key))
                    .select(pair_value)
                    .first::<String>(conn)
                    .optional()
                    .map_err(|e| StoreError::Query(e.to_string()))
            })
            .await?;

        raw.map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn put(&self, key: &str, value: &Value) -> StoreResult<()> {
        validate_key(key)?;
        let key = key.to_string();
        let raw = serde_json::to_string(value)?;
        self.with_connection(move |conn| {
            diesel::replace_into(kv_pairs::table)
                .values(&NewPair::new(&key, &raw, Utc::now()))
                .execute(conn)
                .map_err(|e| StoreError::Query(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        validate_key(key)?;
        let key = key.to_string();
        self.with_connection(move |conn| {
            use crate::db::schema::kv_pairs::dsl::*;
            let removed = diesel::delete(kv_pairs.filter(pair_key.eq(key)))
                .execute(conn)
                .map_err(|e| StoreError::Query(e.to_string()))?;
            Ok(removed > 0)
        })
        .await
    }
}
