use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use jiff::{Span, SpanRelativeTo};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dns::name::DomainName;
use crate::domain::validate_domain;
use crate::error::{ConfigError, Result};
use crate::transport::TransportProtocol;

/// Timeout used when none (or zero) is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const SAMPLE_CONFIG: &str = r#"# Query a domain through a resolver and verify its DNSSEC keys
[[inputs.deepmon_dns]]
  ## Domain to query
  domain = "example.com"

  ## Resolver to send the queries to
  resolver_ip = "8.8.8.8"
  resolver_port = 53

  ## Transport: "udp", "tcp" or "tcp-tls" (DNS-over-TLS, usually port 853).
  ## Unknown values fall back to "udp".
  # resolver_protocol = "udp"

  ## Timeout for each query
  # timeout = "2s"
"#;

/// Annotated sample configuration
pub fn sample_config() -> &'static str {
    SAMPLE_CONFIG
}

/// Probe settings as written in a config file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    pub domain: String,
    pub resolver_ip: String,
    pub resolver_port: i64,
    pub resolver_protocol: String,
    pub timeout: Option<String>,
}

/// Validated, immutable probe configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Target as configured, used as the `domain` tag
    pub domain: String,
    /// Target in IDNA ASCII form, used for queries
    pub domain_name: DomainName,
    pub resolver_ip: IpAddr,
    pub resolver_port: u16,
    pub protocol: TransportProtocol,
    pub timeout: Duration,
}

impl ProbeConfig {
    pub fn resolver_addr(&self) -> SocketAddr {
        SocketAddr::new(self.resolver_ip, self.resolver_port)
    }
}

/// Config file layout: either the bare settings or a plugin table
/// `[[inputs.deepmon_dns]]` like the sample config.
#[derive(Deserialize)]
struct PluginFile {
    inputs: PluginInputs,
}

#[derive(Deserialize)]
struct PluginInputs {
    deepmon_dns: Vec<ProbeSettings>,
}

impl ProbeSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if let Ok(file) = toml::from_str::<PluginFile>(content) {
            return file
                .inputs
                .deepmon_dns
                .into_iter()
                .next()
                .ok_or_else(|| ConfigError::Parse("no [[inputs.deepmon_dns]] entry".to_string()));
        }
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading probe settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply `DNSPROBE_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `DNSPROBE_*` overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = lookup("DNSPROBE_DOMAIN") {
            self.domain = domain;
        }
        if let Some(resolver_ip) = lookup("DNSPROBE_RESOLVER_IP") {
            self.resolver_ip = resolver_ip;
        }
        if let Some(port) = lookup("DNSPROBE_RESOLVER_PORT") {
            self.resolver_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidResolverPort)?;
        }
        if let Some(protocol) = lookup("DNSPROBE_RESOLVER_PROTOCOL") {
            self.resolver_protocol = protocol;
        }
        if let Some(timeout) = lookup("DNSPROBE_TIMEOUT") {
            self.timeout = Some(timeout);
        }
        Ok(())
    }

    /// Validate the settings into a [`ProbeConfig`]
    pub fn validate(&self) -> Result<ProbeConfig> {
        let ascii = validate_domain(&self.domain).ok_or(ConfigError::InvalidDomain)?;
        let domain_name = DomainName::parse(&ascii).map_err(|_| ConfigError::InvalidDomain)?;

        let resolver_ip: IpAddr = self
            .resolver_ip
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidResolverIp)?;

        let resolver_port = u16::try_from(self.resolver_port)
            .ok()
            .filter(|port| *port >= 1)
            .ok_or(ConfigError::InvalidResolverPort)?;

        let protocol = TransportProtocol::parse(&self.resolver_protocol);

        let timeout = match self.timeout.as_deref() {
            Some(value) => parse_duration(value)?,
            None => Duration::ZERO,
        };
        let timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };

        Ok(ProbeConfig {
            domain: self.domain.trim().to_string(),
            domain_name,
            resolver_ip,
            resolver_port,
            protocol,
            timeout,
        })
    }
}

/// Parse a duration such as `"2s"`, `"500ms"`, `"1m30s"` or `"PT1.5S"`.
/// A bare integer is taken as seconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || ConfigError::InvalidTimeout(value.to_string());

    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    let span: Span = value.parse().map_err(|e| {
        debug!("Unable to parse {} as a duration: {}", value, e);
        invalid()
    })?;
    let signed = span
        .to_duration(SpanRelativeTo::days_are_24_hours())
        .map_err(|_| invalid())?;
    Duration::try_from(signed).map_err(|_| invalid())
}
