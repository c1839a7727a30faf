use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("URL is missing")]
    UrlMissing,

    #[error("Invalid URL")]
    InvalidUrl,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
