use async_trait::async_trait;
use chrono::Utc;
use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::db::models::NewPair;
use crate::db::schema::kv_pairs;

use super::{KeyValueStore, StoreError, StoreResult, validate_key};

pub type Pool = r2d2::Pool<ConnectionManager<MysqlConnection>>;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Key width matches `MAX_KEY_LEN`.
const CREATE_KV_PAIRS: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_pairs (
        pair_key VARCHAR(255) NOT NULL PRIMARY KEY,
        pair_value LONGTEXT NOT NULL,
        updated_at VARCHAR(64) NOT NULL
    )
"#;

/// MySQL dialect of the `anysql` family. Builds an r2d2 pool on `open`.
pub struct MysqlKvStore {
    url: String,
    pool: RwLock<Option<Pool>>,
}

impl MysqlKvStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool: RwLock::new(None),
        }
    }

    fn pool(&self) -> StoreResult<Pool> {
        self.pool.read().clone().ok_or(StoreError::NotOpen)
    }

    async fn with_connection<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MysqlConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool()?;
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl KeyValueStore for MysqlKvStore {
    fn url(&self) -> &str {
        &self.url
    }

    fn backend(&self) -> &str {
        "anysql/mysql"
    }

    async fn open(&self) -> StoreResult<()> {
        if self.pool.read().is_some() {
            return Ok(());
        }

        let url = self.url.clone();
        let pool = tokio::task::spawn_blocking(move || {
            let manager = ConnectionManager::<MysqlConnection>::new(url);
            let pool = r2d2::Pool::builder()
                .max_size(DEFAULT_MAX_CONNECTIONS)
                .min_idle(Some(1))
                .build(manager)
                .map_err(|e| StoreError::Connection(e.to_string()))?;

            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            diesel::sql_query(CREATE_KV_PAIRS)
                .execute(&mut conn)
                .map_err(|e| StoreError::Migration(e.to_string()))?;
            Ok::<_, StoreError>(pool)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;

        let mut slot = self.pool.write();
        if slot.is_none() {
            *slot = Some(pool);
            debug!("opened mysql store");
        }
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        if self.pool.write().take().is_some() {
            debug!("closed mysql store");
        }
        Ok(())
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
