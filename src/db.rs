pub use self::anysql::SqlDialect;
pub use self::error::{StoreError, StoreResult};
pub use self::stores::{KeyValueStore, MAX_KEY_LEN, validate_key};

pub mod anysql;
pub mod error;
pub mod stores;

#[cfg(any(feature = "sqlite", feature = "mysql"))]
mod models;

#[cfg(any(feature = "sqlite", feature = "mysql"))]
pub mod schema;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "sqlite")]
pub mod sqlite;
