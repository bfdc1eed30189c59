//! DNSKEY fetch result and the key-set self check

use tracing::debug;

use crate::dns::{enums::DNSResourceType, resource::DNSResource};
use crate::dnssec::{SignatureRecord, ZoneKey, verify_rrsig};

/// Split an answer section into its non-signature records and the first
/// RRSIG. Further RRSIGs are discarded.
pub fn partition_signature(
    answers: &[DNSResource],
) -> (Vec<DNSResource>, Option<SignatureRecord>) {
    let mut records = Vec::with_capacity(answers.len());
    let mut signature = None;
    for answer in answers {
        if answer.rtype == DNSResourceType::RRSIG {
            if signature.is_none() {
                signature = SignatureRecord::from_record(answer);
            }
        } else {
            records.push(answer.clone());
        }
    }
    (records, signature)
}

/// DNSKEY set of the target, in response order, with the signature over it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMaterial {
    pub keys: Vec<ZoneKey>,
    pub signature: Option<SignatureRecord>,
    /// Signature-stripped DNSKEY records as received
    rrset: Vec<DNSResource>,
}

impl KeyMaterial {
    pub fn from_answers(answers: &[DNSResource]) -> Self {
        let (records, signature) = partition_signature(answers);
        let rrset: Vec<DNSResource> = records
            .into_iter()
            .filter(|r| r.rtype == DNSResourceType::DNSKEY)
            .collect();
        let keys = rrset.iter().filter_map(ZoneKey::from_record).collect();
        Self {
            keys,
            signature,
            rrset,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn rrset(&self) -> &[DNSResource] {
        &self.rrset
    }

    /// Keys with the Zone Key flag, KSKs included
    pub fn zone_keys(&self) -> impl Iterator<Item = &ZoneKey> {
        self.keys.iter().filter(|k| k.dnskey.is_zone_key())
    }

    pub fn ksks(&self) -> impl Iterator<Item = &ZoneKey> {
        self.keys.iter().filter(|k| k.dnskey.is_ksk())
    }

    pub fn first_ksk(&self) -> Option<&ZoneKey> {
        self.ksks().next()
    }

    /// True when any KSK validates the signature over the key set.
    pub fn zsk_self_check(&self) -> bool {
        let Some(signature) = &self.signature else {
            debug!("DNSKEY set carries no signature");
            return false;
        };
        self.ksks().any(|ksk| match verify_rrsig(signature, ksk, &self.rrset) {
            Ok(()) => true,
            Err(e) => {
                debug!("KSK {} did not validate the key set: {}", ksk.key_tag(), e);
                false
            }
        })
    }
}
