//! DNS health probe
//!
//! One invocation fetches the target's DNSKEY set, sweeps a fixed list of
//! record types through the configured resolver and folds the outcomes into
//! a single [`ProbeOutput`].

pub mod keys;
pub mod ksk;
pub mod mapper;
pub mod output;
pub mod verify;

pub use keys::{KeyMaterial, partition_signature};
pub use output::{AnswerRecord, ProbeOutput, ProbeResult};

use tracing::{debug, info, warn};

use crate::config::{ProbeConfig, ProbeSettings};
use crate::dns::{
    DNSPacket, enums::DNSResourceType, name::DomainName, rdata::RData, resource::DNSResource,
};
use crate::error::ConfigError;
use crate::sink::MetricsSink;
use crate::transport::{self, Exchange, Exchanged, ResolverClient, TransportError};

/// Measurement name the output is emitted under
pub const MEASUREMENT: &str = "deepmon_dns";

/// Record types queried by every invocation, in order
pub const RECORD_TYPES: [DNSResourceType; 11] = [
    DNSResourceType::A,
    DNSResourceType::AAAA,
    DNSResourceType::CNAME,
    DNSResourceType::MX,
    DNSResourceType::NS,
    DNSResourceType::PTR,
    DNSResourceType::SOA,
    DNSResourceType::TXT,
    DNSResourceType::SRV,
    DNSResourceType::SPF,
    DNSResourceType::DS,
];

pub struct DnsProbe<T: Exchange = ResolverClient> {
    config: ProbeConfig,
    transport: T,
}

impl DnsProbe<ResolverClient> {
    pub fn new(config: ProbeConfig) -> Result<Self, ConfigError> {
        let transport = ResolverClient::from_config(&config)?;
        Ok(Self { config, transport })
    }

    pub fn from_settings(settings: &ProbeSettings) -> Result<Self, ConfigError> {
        Self::new(settings.validate()?)
    }
}

impl<T: Exchange> DnsProbe<T> {
    pub fn with_transport(config: ProbeConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Query `name`/`rtype` with a fresh random ID
    pub async fn send_message(
        &self,
        name: &DomainName,
        rtype: DNSResourceType,
    ) -> transport::Result<Exchanged> {
        let query = DNSPacket::query(name, rtype, rand::random());
        debug!("Querying {} {} via {}", name, rtype, self.config.resolver_addr());
        self.transport.exchange(&query).await
    }

    /// Run one measurement and hand the output to `sink`.
    pub async fn gather(&self, sink: &mut dyn MetricsSink) {
        let output = self.run().await;
        sink.add_fields(MEASUREMENT, output.fields(), output.tags());
    }

    /// Run one measurement. Outcomes are reported in the output, never as errors.
    pub async fn run(&self) -> ProbeOutput {
        let mut output = ProbeOutput::new(&self.config.domain);
        let domain = &self.config.domain_name;

        let keys = match self.send_message(domain, DNSResourceType::DNSKEY).await {
            Ok(exchanged) => KeyMaterial::from_answers(&exchanged.response.answers),
            Err(e) => {
                warn!("DNSKEY query for {} failed: {}", domain, e);
                output.result = ProbeResult::ConnectionFailed;
                return output;
            }
        };
        debug!(
            "Fetched {} DNSKEY records for {} (signed: {})",
            keys.keys.len(),
            domain,
            keys.signature.is_some()
        );
        output.zsk_verified = keys.zsk_self_check();

        let mut succeeded = false;
        let mut failed = false;
        let mut total_rtt_ms: u128 = 0;

        for rtype in RECORD_TYPES {
            let exchanged = match self.send_message(domain, rtype).await {
                Ok(exchanged) => exchanged,
                Err(e) => {
                    debug!("{} query for {} failed: {}", rtype, domain, e);
                    output.result = match e {
                        TransportError::Timeout => ProbeResult::Timeout,
                        TransportError::ConnectionFailed(_) => ProbeResult::ConnectionFailed,
                    };
                    failed = true;
                    continue;
                }
            };

            succeeded = true;
            total_rtt_ms += exchanged.rtt.as_millis();
            if exchanged.response.answers.is_empty() {
                continue;
            }

            let (records, signature) = partition_signature(&exchanged.response.answers);
            let verified = self
                .verify_answer_set(&records, signature.as_ref(), &keys)
                .await;

            let ds_records: Vec<_> = records
                .iter()
                .filter_map(|r| match &r.rdata {
                    RData::DS(ds) => Some(ds),
                    _ => None,
                })
                .collect();
            if !ds_records.is_empty() {
                output.ksk_verified = ksk::cross_check(&keys, &ds_records);
            }

            let rcode = exchanged.response.rcode_name();
            output.records.extend(mapper::map_answers(
                &rcode,
                &records,
                exchanged.rtt,
                verified,
            ));
        }

        if succeeded && failed {
            output.result = ProbeResult::PartialFailure;
        } else if succeeded {
            output.result = ProbeResult::Success;
        }

        output.resolver_ip = self.config.resolver_ip.to_string();
        output.resolver_port = self.config.resolver_port.to_string();
        output.resolver_protocol = self.config.protocol.as_str().to_string();
        output.response_time = total_rtt_ms.to_string();
        output.resolver_name = self.resolver_name().await;

        info!(
            "Probe of {} via {} finished: result={}, records={}, zsk={}, ksk={}",
            self.config.domain,
            self.config.resolver_addr(),
            output.result,
            output.records.len(),
            output.zsk_verified,
            output.ksk_verified
        );
        output
    }

    /// Reverse name of the resolver through the same transport, empty when
    /// the lookup fails or has no answer.
    async fn resolver_name(&self) -> String {
        let name = DomainName::reverse_pointer(self.config.resolver_ip);
        match self.send_message(&name, DNSResourceType::PTR).await {
            Ok(exchanged) => first_ptr(&exchanged.response.answers).unwrap_or_default(),
            Err(e) => {
                debug!("Reverse lookup of {} failed: {}", self.config.resolver_ip, e);
                String::new()
            }
        }
    }
}

fn first_ptr(answers: &[DNSResource]) -> Option<String> {
    answers.iter().find_map(|r| match &r.rdata {
        RData::PTR(target) => Some(target.to_fqdn()),
        _ => None,
    })
}
