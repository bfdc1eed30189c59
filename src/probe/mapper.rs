use std::time::Duration;

use super::output::AnswerRecord;
use crate::dns::{rdata::RData, resource::DNSResource};

/// Map typed answers to output records. Types without a payload are dropped.
pub fn map_answers(
    rcode: &str,
    records: &[DNSResource],
    rtt: Duration,
    dnssec_verified: bool,
) -> Vec<AnswerRecord> {
    records
        .iter()
        .filter_map(|record| {
            answer_payload(&record.rdata).map(|rdata| AnswerRecord {
                rcode: rcode.to_string(),
                rtype: record.rtype.to_string(),
                ttl: record.ttl,
                response_time: format!("{:?}", rtt),
                rdata,
                dnssec_verified,
            })
        })
        .collect()
}

pub fn answer_payload(rdata: &RData) -> Option<String> {
    match rdata {
        RData::A(addr) => Some(addr.to_string()),
        RData::AAAA(addr) => Some(addr.to_string()),
        RData::CNAME(target) | RData::NS(target) | RData::PTR(target) => Some(target.to_fqdn()),
        RData::MX {
            preference,
            exchange,
        } => Some(format!("({}) {}", preference, exchange)),
        RData::SOA(_) | RData::TXT(_) | RData::SPF(_) | RData::SRV(_) | RData::DS(_) => {
            Some(rdata.to_string())
        }
        RData::DNSKEY(_) | RData::RRSIG(_) | RData::Unknown { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::name::DomainName;
    use crate::dns::rdata::{Ds, Rrsig};
    use crate::dns::enums::DNSResourceType;

    fn name(s: &str) -> DomainName {
        DomainName::parse(s).unwrap()
    }

    #[test]
    fn test_payloads() {
        assert_eq!(
            answer_payload(&RData::AAAA("2001:db8::1".parse().unwrap())).as_deref(),
            Some("2001:db8::1")
        );
        assert_eq!(
            answer_payload(&RData::CNAME(name("target.example.com"))).as_deref(),
            Some("target.example.com.")
        );
        assert_eq!(
            answer_payload(&RData::MX {
                preference: 10,
                exchange: name("mail.example.com"),
            })
            .as_deref(),
            Some("(10) mail.example.com.")
        );
        assert_eq!(
            answer_payload(&RData::TXT(vec![b"hello world".to_vec()])).as_deref(),
            Some("\"hello world\"")
        );
        assert_eq!(
            answer_payload(&RData::DS(Ds {
                key_tag: 370,
                algorithm: 13,
                digest_type: 2,
                digest: vec![0xbe, 0xef],
            }))
            .as_deref(),
            Some("370 13 2 BEEF")
        );
        assert_eq!(
            answer_payload(&RData::Unknown {
                rtype: 13,
                data: vec![1]
            }),
            None
        );
    }

    #[test]
    fn test_map_answers_drops_signatures() {
        let owner = name("example.com");
        let records = vec![
            DNSResource::new(owner.clone(), 60, RData::A("192.0.2.1".parse().unwrap())),
            DNSResource::new(
                owner.clone(),
                60,
                RData::RRSIG(Rrsig {
                    type_covered: DNSResourceType::A,
                    algorithm: 15,
                    labels: 2,
                    original_ttl: 60,
                    expiration: 0,
                    inception: 0,
                    key_tag: 1,
                    signer_name: owner.clone(),
                    signature: vec![0; 64],
                }),
            ),
        ];

        let mapped = map_answers("NOERROR", &records, Duration::from_micros(12_345), true);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].rtype, "A");
        assert_eq!(mapped[0].rcode, "NOERROR");
        assert_eq!(mapped[0].ttl, 60);
        assert_eq!(mapped[0].response_time, "12.345ms");
        assert!(mapped[0].dnssec_verified);
    }
}
