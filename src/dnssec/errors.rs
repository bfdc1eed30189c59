use thiserror::Error;

/// DNSSEC verification errors. The probe reports these as `false` flags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DnsSecError {
    /// No RRSIG found for RRset
    #[error("No RRSIG record found for RRset")]
    NoRrsig,
    /// No DNSKEY usable for validation
    #[error("No DNSKEY record found for validation")]
    NoDnsKey,
    #[error("Key tag does not match")]
    KeyTagMismatch,
    #[error("Signer name {signer} does not match key owner {owner}")]
    SignerMismatch { signer: String, owner: String },
    #[error("DNSKEY protocol {0} is not 3")]
    InvalidProtocol(u8),
    #[error("RRSIG algorithm {sig} does not match DNSKEY algorithm {key}")]
    AlgorithmMismatch { sig: u8, key: u8 },
    #[error("Unsupported DNSSEC algorithm: {0}")]
    UnsupportedAlgorithm(u8),
    #[error("Unsupported digest type: {0}")]
    UnsupportedDigestType(u8),
    /// Records do not form the single RRset the signature covers
    #[error("RRset is inconsistent with the covering RRSIG")]
    RrsetMismatch,
    #[error("RRSIG label count {labels} exceeds owner label count {owner}")]
    InvalidLabelCount { labels: u8, owner: usize },
    #[error("Invalid DNSKEY public key format")]
    InvalidPublicKey,
    #[error("DNSSEC signature verification failed")]
    SignatureVerificationFailed,
}

pub type Result<T> = std::result::Result<T, DnsSecError>;
