//! Per-answer RRSIG verification

use tracing::debug;

use super::{DnsProbe, keys::KeyMaterial};
use crate::dns::{enums::DNSResourceType, name::DomainName, resource::DNSResource};
use crate::dnssec::{SignatureRecord, ZoneKey, verify_rrsig};
use crate::domain::registrable_domain;
use crate::transport::Exchange;

impl<T: Exchange> DnsProbe<T> {
    /// Verify one response's records with the signature partitioned off it.
    /// Any zone key of the fetched set may validate; a DS signature is checked
    /// against the keys of the registrable domain instead.
    pub async fn verify_answer_set(
        &self,
        records: &[DNSResource],
        signature: Option<&SignatureRecord>,
        keys: &KeyMaterial,
    ) -> bool {
        let Some(signature) = signature else {
            return false;
        };
        if keys.is_empty() {
            return false;
        }

        if signature.rrsig.type_covered == DNSResourceType::DS {
            return self.verify_delegation_signer(signature, records).await;
        }

        keys.zone_keys()
            .any(|key| verify_rrsig(signature, key, records).is_ok())
    }

    async fn verify_delegation_signer(
        &self,
        signature: &SignatureRecord,
        records: &[DNSResource],
    ) -> bool {
        let target = self.config.domain_name.to_string();
        let Some(registrable) = registrable_domain(&target) else {
            debug!("No registrable domain for {}", target);
            return false;
        };
        let Ok(name) = DomainName::parse(&registrable) else {
            return false;
        };

        match self.send_message(&name, DNSResourceType::DNSKEY).await {
            Ok(exchanged) => exchanged
                .response
                .answers
                .iter()
                .filter_map(ZoneKey::from_record)
                .any(|key| verify_rrsig(signature, &key, records).is_ok()),
            Err(e) => {
                debug!("DNSKEY query for {} failed: {}", name, e);
                false
            }
        }
    }
}
