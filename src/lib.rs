pub mod config;
pub mod dns;
pub mod dnssec;
pub mod domain;
pub mod error;
pub mod probe;
pub mod sink;
pub mod transport;

pub use config::{ProbeConfig, ProbeSettings};
pub use dns::DNSPacket;
pub use error::ConfigError;
pub use probe::{DnsProbe, ProbeOutput, ProbeResult};
