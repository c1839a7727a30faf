pub use self::parser::{Config, LogFormat, LoggingConfig, RegistryPreset, StoreConfig};
pub use self::validator::ConfigError;

mod parser;
mod validator;
