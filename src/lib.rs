//! Resolve key/value store backends from connection strings.
//!
//! ```no_run
//! use store_resolver::BackendResolver;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = BackendResolver::default().resolve("websql:app.db")?;
//! store.open().await?;
//! store.put("greeting", &serde_json::json!("hello")).await?;
//! store.close().await?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

pub mod config;
pub mod db;
pub mod resolver;
pub mod utils;

pub use config::{Config, ConfigError, RegistryPreset, StoreConfig};
pub use db::{KeyValueStore, StoreError};
pub use resolver::{BackendResolver, ResolveError, SchemeRegistry};
