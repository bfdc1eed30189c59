use std::path::PathBuf;

use clap::Parser;
use dnsprobe::config::{ProbeSettings, sample_config};
use dnsprobe::probe::DnsProbe;
use dnsprobe::sink::JsonLinesSink;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Probe a domain through a DNS resolver and print the result as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain to query
    #[arg(short, long)]
    domain: Option<String>,

    /// Resolver IP address
    #[arg(long)]
    resolver_ip: Option<String>,

    /// Resolver port
    #[arg(long)]
    resolver_port: Option<i64>,

    /// Resolver transport: udp, tcp or tcp-tls
    #[arg(short, long)]
    protocol: Option<String>,

    /// Per-query timeout, e.g. 2s or 500ms
    #[arg(short, long)]
    timeout: Option<String>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print the sample config and exit
    #[arg(long)]
    sample_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.sample_config {
        print!("{}", sample_config());
        return Ok(());
    }

    let mut settings = match &args.config {
        Some(path) => ProbeSettings::from_file(path)?,
        None => ProbeSettings::default(),
    };
    settings.apply_env()?;

    if let Some(domain) = args.domain {
        settings.domain = domain;
    }
    if let Some(resolver_ip) = args.resolver_ip {
        settings.resolver_ip = resolver_ip;
    }
    if let Some(resolver_port) = args.resolver_port {
        settings.resolver_port = resolver_port;
    }
    if let Some(protocol) = args.protocol {
        settings.resolver_protocol = protocol;
    }
    if let Some(timeout) = args.timeout {
        settings.timeout = Some(timeout);
    }
    debug!("Effective settings: {:?}", settings);

    let probe = DnsProbe::from_settings(&settings)?;
    let mut sink = JsonLinesSink::new(std::io::stdout().lock());
    probe.gather(&mut sink).await;
    Ok(())
}
