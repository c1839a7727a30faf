use super::ConfigError;
use crate::resolver::scheme_of;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default, alias = "conn_string")]
    pub url: Option<String>,
    #[serde(default)]
    pub registry: RegistryPreset,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            registry: RegistryPreset::default(),
        }
    }

    pub fn with_registry(mut self, registry: RegistryPreset) -> Self {
        self.registry = registry;
        self
    }

    /// The configured connection string, if one is set and non-empty.
    pub fn connection_string(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Which closed set of scheme aliases a resolver is built with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryPreset {
    /// `mysql`, `websql`, `cordova-sqlite`
    #[default]
    KeyValueStore,
    /// `mysql`, `websql`, `sqlite`
    StoreLayer,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(alias = "console", default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self
            .store
            .connection_string()
            .ok_or(ConfigError::UrlMissing)?;
        scheme_of(url)?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn load_from_file_reads_store_and_logging() {
        let mut file = NamedTempFile::new().expect("temp config file");
        writeln!(
            file,
            "store:\n  url: \"sqlite:///tmp/kv.db\"\n  registry: store_layer\nlogging:\n  level: debug\n  format: json"
        )
        .expect("write config");

        let config = Config::load_from_file(file.path()).expect("load config");
        assert_eq!(config.store.connection_string(), Some("sqlite:///tmp/kv.db"));
        assert_eq!(config.store.registry, RegistryPreset::StoreLayer);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn defaults_apply_when_sections_are_sparse() {
        let config = Config::from_yaml("store:\n  conn_string: \"mysql://db/app\"\n")
            .expect("parse config");
        assert_eq!(config.store.connection_string(), Some("mysql://db/app"));
        assert_eq!(config.store.registry, RegistryPreset::KeyValueStore);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_url_is_rejected() {
        let err = Config::from_yaml("store:\n  registry: store_layer\n").unwrap_err();
        assert!(matches!(err, ConfigError::UrlMissing));
        assert_eq!(err.to_string(), "URL is missing");
    }

    #[test]
    fn empty_url_counts_as_missing() {
        let err = Config::from_yaml("store:\n  url: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UrlMissing));
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        let err = Config::from_yaml("store:\n  url: nope\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl));
    }

    #[test]
    fn unknown_preset_fails_to_parse() {
        let err = Config::from_yaml("store:\n  url: \"mysql://h/db\"\n  registry: postgres\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn blank_log_level_is_rejected() {
        let err = Config::from_yaml("store:\n  url: \"mysql://h/db\"\nlogging:\n  level: \" \"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Config::load_from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
