pub mod algorithm;
pub mod digest;
pub mod errors;
pub mod key_tag;

pub use algorithm::DnsSecAlgorithm;
pub use digest::DigestType;
pub use errors::DnsSecError;
pub use key_tag::calculate_key_tag;

use tracing::trace;

use crate::dns::{
    enums::DNSResourceClass,
    name::DomainName,
    rdata::{Dnskey, RData, Rrsig},
    resource::DNSResource,
};
use errors::Result;

/// DNSKEY protocol field value required by RFC 4034 §2.1.2
pub const DNSKEY_PROTOCOL: u8 = 3;

/// A DNSKEY together with its owner name and class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneKey {
    pub owner: DomainName,
    pub class: DNSResourceClass,
    pub dnskey: Dnskey,
}

impl ZoneKey {
    pub fn from_record(record: &DNSResource) -> Option<Self> {
        match &record.rdata {
            RData::DNSKEY(dnskey) => Some(Self {
                owner: record.name.clone(),
                class: record.rclass,
                dnskey: dnskey.clone(),
            }),
            _ => None,
        }
    }

    pub fn key_tag(&self) -> u16 {
        self.dnskey.key_tag()
    }

    /// DS digest of this key: digest(canonical owner | DNSKEY RDATA) (RFC 4034 §5.1.4)
    pub fn ds_digest(&self, digest_type: DigestType) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.owner.wire_len() + 4 + self.dnskey.public_key.len());
        self.owner.write_canonical(&mut data);
        data.extend_from_slice(&self.dnskey.to_wire());
        digest_type.digest(&data)
    }
}

/// An RRSIG together with the header fields of the record that carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRecord {
    pub owner: DomainName,
    pub class: DNSResourceClass,
    pub ttl: u32,
    pub rrsig: Rrsig,
}

impl SignatureRecord {
    pub fn from_record(record: &DNSResource) -> Option<Self> {
        match &record.rdata {
            RData::RRSIG(rrsig) => Some(Self {
                owner: record.name.clone(),
                class: record.rclass,
                ttl: record.ttl,
                rrsig: rrsig.clone(),
            }),
            _ => None,
        }
    }
}

/// Build the data an RRSIG signs (RFC 4034 §3.1.8.1): the RRSIG RDATA
/// without the signature, followed by the RRset in canonical form and order.
pub fn signed_data(rrsig: &Rrsig, rrset: &[DNSResource]) -> Result<Vec<u8>> {
    let first = rrset.first().ok_or(DnsSecError::RrsetMismatch)?;

    let owner_labels = first.name.label_count();
    let labels = rrsig.labels as usize;
    let owner = if labels > owner_labels {
        return Err(DnsSecError::InvalidLabelCount {
            labels: rrsig.labels,
            owner: owner_labels,
        });
    } else if labels < owner_labels {
        first.name.wildcard_suffix(labels)
    } else {
        first.name.clone()
    };

    let mut owner_wire = Vec::with_capacity(owner.wire_len());
    owner.write_canonical(&mut owner_wire);

    let mut rdatas: Vec<Vec<u8>> = rrset.iter().map(|r| r.rdata.canonical_wire()).collect();
    rdatas.sort();
    rdatas.dedup();

    let mut data = rrsig.signed_prefix();
    for rdata in &rdatas {
        data.extend_from_slice(&owner_wire);
        data.extend_from_slice(&u16::from(first.rtype).to_be_bytes());
        data.extend_from_slice(&u16::from(first.rclass).to_be_bytes());
        data.extend_from_slice(&rrsig.original_ttl.to_be_bytes());
        data.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        data.extend_from_slice(rdata);
    }
    Ok(data)
}

/// Verify `signature` over `rrset` with `key`. The validity window is not checked.
pub fn verify_rrsig(
    signature: &SignatureRecord,
    key: &ZoneKey,
    rrset: &[DNSResource],
) -> Result<()> {
    let rrsig = &signature.rrsig;

    if key.key_tag() != rrsig.key_tag {
        return Err(DnsSecError::KeyTagMismatch);
    }
    if key.class != signature.class {
        return Err(DnsSecError::RrsetMismatch);
    }
    if key.dnskey.algorithm != rrsig.algorithm {
        return Err(DnsSecError::AlgorithmMismatch {
            sig: rrsig.algorithm,
            key: key.dnskey.algorithm,
        });
    }
    if !rrsig.signer_name.eq_ignore_case(&key.owner) {
        return Err(DnsSecError::SignerMismatch {
            signer: rrsig.signer_name.to_fqdn(),
            owner: key.owner.to_fqdn(),
        });
    }
    if key.dnskey.protocol != DNSKEY_PROTOCOL {
        return Err(DnsSecError::InvalidProtocol(key.dnskey.protocol));
    }

    let first = rrset.first().ok_or(DnsSecError::RrsetMismatch)?;
    let consistent = rrset.iter().all(|r| {
        r.name.eq_ignore_case(&first.name)
            && r.rclass == signature.class
            && r.rtype == rrsig.type_covered
    });
    if !consistent {
        return Err(DnsSecError::RrsetMismatch);
    }

    let algorithm = DnsSecAlgorithm::from_u8(rrsig.algorithm)
        .ok_or(DnsSecError::UnsupportedAlgorithm(rrsig.algorithm))?;
    let data = signed_data(rrsig, rrset)?;
    trace!(
        "Verifying {} RRSIG for {} with key {} ({} bytes signed)",
        algorithm,
        first.name,
        rrsig.key_tag,
        data.len()
    );
    algorithm.verify(&key.dnskey.public_key, &data, &rrsig.signature)
}
