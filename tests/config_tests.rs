//! Loading probe settings from files

use std::io::Write;
use std::time::Duration;

use dnsprobe::config::{DEFAULT_TIMEOUT, ProbeSettings, sample_config};
use dnsprobe::error::ConfigError;
use dnsprobe::transport::TransportProtocol;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_plugin_table() {
    let file = write_config(
        r#"
[[inputs.deepmon_dns]]
  domain = "example.org"
  resolver_ip = "9.9.9.9"
  resolver_port = 853
  resolver_protocol = "tcp-tls"
  timeout = "750ms"
"#,
    );

    let config = ProbeSettings::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap();

    assert_eq!(config.domain, "example.org");
    assert_eq!(config.resolver_addr(), "9.9.9.9:853".parse().unwrap());
    assert_eq!(config.protocol, TransportProtocol::Tls);
    assert_eq!(config.timeout, Duration::from_millis(750));
}

#[test]
fn test_load_bare_settings_with_defaults() {
    let file = write_config(
        r#"
domain = "example.net"
resolver_ip = "2001:db8::53"
resolver_port = 53
"#,
    );

    let config = ProbeSettings::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap();

    assert_eq!(config.protocol, TransportProtocol::Udp);
    assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    assert!(config.resolver_ip.is_ipv6());
}

#[test]
fn test_sample_config_loads() {
    let file = write_config(sample_config());
    let settings = ProbeSettings::from_file(file.path()).unwrap();
    assert!(settings.validate().is_ok());
}

#[test]
fn test_validation_messages() {
    let file = write_config(
        r#"
domain = "example.com"
resolver_ip = "not-an-ip"
resolver_port = 53
"#,
    );
    let err = ProbeSettings::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap_err();
    assert_eq!(err.to_string(), "resolver_ip is missing or invalid");

    let file = write_config("resolver_ip = \"8.8.8.8\"\nresolver_port = 53\n");
    let err = ProbeSettings::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap_err();
    assert_eq!(err.to_string(), "domain is missing or invalid");

    let file = write_config("domain = \"example.com\"\nresolver_ip = \"8.8.8.8\"\n");
    let err = ProbeSettings::from_file(file.path())
        .unwrap()
        .validate()
        .unwrap_err();
    assert_eq!(err.to_string(), "resolver_port is missing or invalid");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = ProbeSettings::from_file(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_malformed_file() {
    let file = write_config("domain = [unterminated");
    let result = ProbeSettings::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_overrides_apply_after_file() {
    let file = write_config(sample_config());
    let mut settings = ProbeSettings::from_file(file.path()).unwrap();
    settings
        .apply_overrides(|key| match key {
            "DNSPROBE_DOMAIN" => Some("override.example".to_string()),
            "DNSPROBE_RESOLVER_PROTOCOL" => Some("tcp".to_string()),
            _ => None,
        })
        .unwrap();

    let config = settings.validate().unwrap();
    assert_eq!(config.domain, "override.example");
    assert_eq!(config.protocol, TransportProtocol::Tcp);
}
