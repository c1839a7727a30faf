//! The `anysql` backend family.
//!
//! Several schemes share this family, so the constructor receives the whole
//! connection string and branches on its scheme to pick a SQL dialect.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{KeyValueStore, StoreError, StoreResult};

#[cfg(feature = "mysql")]
use super::mysql::MysqlKvStore;
#[cfg(feature = "sqlite")]
use super::sqlite::SqliteKvStore;

pub const FAMILY: &str = "anysql";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlDialect {
    Sqlite,
    Mysql,
}

impl SqlDialect {
    pub fn from_url(url: &str) -> StoreResult<Self> {
        let (scheme, _) = url
            .split_once(':')
            .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;
        match scheme {
            "mysql" => Ok(SqlDialect::Mysql),
            "sqlite" | "websql" | "cordova-sqlite" => Ok(SqlDialect::Sqlite),
            other => Err(StoreError::UnsupportedDialect(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SqlDialect::Sqlite => "sqlite",
            SqlDialect::Mysql => "mysql",
        }
    }
}

/// Family constructor: builds the store for the dialect named by `url`'s
/// scheme. No connection is made until the store is opened.
///
/// A dialect whose cargo feature is off still resolves; the returned store
/// fails on `open` and on every data operation.
pub fn connect(url: &str) -> StoreResult<Box<dyn KeyValueStore>> {
    let dialect = SqlDialect::from_url(url)?;
    debug!(dialect = dialect.as_str(), "constructing anysql store");

    match dialect {
        #[cfg(feature = "sqlite")]
        SqlDialect::Sqlite => Ok(Box::new(SqliteKvStore::new(url, sqlite_path(url)?))),
        #[cfg(not(feature = "sqlite"))]
        SqlDialect::Sqlite => {
            sqlite_path(url)?;
            Ok(Box::new(DisabledStore::new(url, dialect, "SQLite")))
        }
        #[cfg(feature = "mysql")]
        SqlDialect::Mysql => {
            mysql_target(url)?;
            Ok(Box::new(MysqlKvStore::new(url)))
        }
        #[cfg(not(feature = "mysql"))]
        SqlDialect::Mysql => {
            mysql_target(url)?;
            Ok(Box::new(DisabledStore::new(url, dialect, "MySQL")))
        }
    }
}

/// Store for a dialect compiled out of this build.
pub struct DisabledStore {
    url: String,
    backend: String,
    feature: &'static str,
}

impl DisabledStore {
    pub fn new(url: impl Into<String>, dialect: SqlDialect, feature: &'static str) -> Self {
        Self {
            url: url.into(),
            backend: format!("{FAMILY}/{}", dialect.as_str()),
            feature,
        }
    }

    fn unavailable(&self) -> StoreError {
        StoreError::Connection(format!("{} feature not enabled", self.feature))
    }
}

#[async_trait]
impl KeyValueStore for DisabledStore {
    fn url(&self) -> &str {
        &self.url
    }

    fn backend(&self) -> &str {
        &self.backend
    }

    async fn open(&self) -> StoreResult<()> {
        Err(self.unavailable())
    }

    async fn close(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get(&self, _key: &str) -> StoreResult<Option<Value>> {
        Err(self.unavailable())
    }

    async fn put(&self, _key: &str, _value: &Value) -> StoreResult<()> {
        Err(self.unavailable())
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Err(self.unavailable())
    }
}

/// Database file for the SQLite dialect: everything after `scheme:`, minus a
/// leading `//`.
pub fn sqlite_path(url: &str) -> StoreResult<String> {
    let (_, rest) = url
        .split_once(':')
        .ok_or_else(|| StoreError::InvalidUrl(url.to_string()))?;
    let path = rest.strip_prefix("//").unwrap_or(rest);
    if path.is_empty() {
        return Err(StoreError::InvalidUrl(format!(
            "missing database path in {url}"
        )));
    }
    Ok(path.to_string())
}

pub fn mysql_target(url: &str) -> StoreResult<url::Url> {
    let parsed =
        url::Url::parse(url).map_err(|e| StoreError::InvalidUrl(format!("{url}: {e}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(StoreError::InvalidUrl(format!("missing host in {url}")));
    }
    Ok(parsed)
}
