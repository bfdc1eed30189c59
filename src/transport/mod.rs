//! Resolver transport
//!
//! One query/response exchange with a resolver over:
//! - UDP and TCP (RFC 1035)
//! - DNS-over-TLS (DoT) (RFC 7858)

pub mod client;
pub mod tcp;
pub mod tls;
pub mod udp;

pub use client::ResolverClient;
pub use tls::TlsError;

use std::fmt;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::dns::DNSPacket;

/// Transport protocol types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransportProtocol {
    #[default]
    Udp,
    Tcp,
    Tls,
}

impl TransportProtocol {
    /// Parse a configured protocol name. An empty name means UDP; unknown
    /// names fall back to UDP with a warning.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "udp" => TransportProtocol::Udp,
            "tcp" => TransportProtocol::Tcp,
            "tcp-tls" => TransportProtocol::Tls,
            other => {
                warn!("Unknown resolver protocol {:?}, falling back to udp", other);
                TransportProtocol::Udp
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportProtocol::Udp => "udp",
            TransportProtocol::Tcp => "tcp",
            TransportProtocol::Tls => "tcp-tls",
        }
    }

}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified exchange failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Resolver did not answer within the timeout")]
    Timeout,
    #[error("Resolver connection failed: {0}")]
    ConnectionFailed(String),
}

impl From<io::Error> for TransportError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => TransportError::Timeout,
            _ => TransportError::ConnectionFailed(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A response together with the measured round-trip time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchanged {
    pub response: DNSPacket,
    pub rtt: Duration,
}

/// One query/response exchange with the configured resolver.
#[async_trait]
pub trait Exchange: Send + Sync {
    async fn exchange(&self, query: &DNSPacket) -> Result<Exchanged>;
}
