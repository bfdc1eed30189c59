use thiserror::Error;

use crate::transport::TlsError;

/// Configuration errors. Raised once, before the first network call.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("domain is missing or invalid")]
    InvalidDomain,

    #[error("resolver_ip is missing or invalid")]
    InvalidResolverIp,

    #[error("resolver_port is missing or invalid")]
    InvalidResolverPort,

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tls(#[from] TlsError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
