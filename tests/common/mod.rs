//! Shared helpers: a scripted resolver and an Ed25519-signed test zone

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dnsprobe::config::{ProbeConfig, ProbeSettings};
use dnsprobe::dns::{
    DNSPacket,
    enums::DNSResourceType,
    name::DomainName,
    rdata::{Dnskey, Ds, RData, Rrsig},
    resource::DNSResource,
};
use dnsprobe::dnssec::{DigestType, ZoneKey, signed_data};
use dnsprobe::transport::{self, Exchange, Exchanged, TransportError};
use ring::signature::{Ed25519KeyPair, KeyPair};

pub const RESOLVER_IP: &str = "192.0.2.53";
pub const RESOLVER_NAME: &str = "resolver.example.net.";
pub const RTT: Duration = Duration::from_millis(3);

pub fn name(s: &str) -> DomainName {
    DomainName::parse(s).unwrap()
}

pub fn probe_config(domain: &str) -> ProbeConfig {
    ProbeSettings {
        domain: domain.to_string(),
        resolver_ip: RESOLVER_IP.to_string(),
        resolver_port: 53,
        resolver_protocol: "udp".to_string(),
        timeout: Some("1s".to_string()),
    }
    .validate()
    .unwrap()
}

/// Reverse name of [`RESOLVER_IP`]
pub fn resolver_reverse_name() -> String {
    DomainName::reverse_pointer(RESOLVER_IP.parse().unwrap()).to_fqdn()
}

pub fn response(answers: Vec<DNSResource>) -> DNSPacket {
    let mut packet = DNSPacket::default();
    packet.header.qr = true;
    packet.header.ra = true;
    packet.answers = answers;
    packet
}

/// Resolver answering from a table keyed by (fqdn, type). Unscripted
/// queries get the fallback, an empty NOERROR response by default.
pub struct ScriptedTransport {
    responses: HashMap<(String, DNSResourceType), Result<DNSPacket, TransportError>>,
    fallback: Result<DNSPacket, TransportError>,
    pub queries: Mutex<Vec<(String, DNSResourceType)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fallback: Ok(response(Vec::new())),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(mut self, owner: &str, rtype: DNSResourceType, answers: Vec<DNSResource>) -> Self {
        self.responses
            .insert((name(owner).to_fqdn().to_ascii_lowercase(), rtype), Ok(response(answers)));
        self
    }

    pub fn reply(mut self, owner: &str, rtype: DNSResourceType, packet: DNSPacket) -> Self {
        self.responses.insert((name(owner).to_fqdn().to_ascii_lowercase(), rtype), Ok(packet));
        self
    }

    pub fn fail(mut self, owner: &str, rtype: DNSResourceType, error: TransportError) -> Self {
        self.responses
            .insert((name(owner).to_fqdn().to_ascii_lowercase(), rtype), Err(error));
        self
    }

    pub fn fallback(mut self, fallback: Result<DNSPacket, TransportError>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Answer the resolver's reverse lookup
    pub fn with_resolver_name(self) -> Self {
        let reverse = resolver_reverse_name();
        let ptr = DNSResource::new(name(&reverse), 3600, RData::PTR(name(RESOLVER_NAME)));
        self.answer(&reverse, DNSResourceType::PTR, vec![ptr])
    }

    pub fn recorded(&self) -> Vec<(String, DNSResourceType)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exchange for ScriptedTransport {
    async fn exchange(&self, query: &DNSPacket) -> transport::Result<Exchanged> {
        let question = &query.questions[0];
        let key = (question.name.to_fqdn().to_ascii_lowercase(), question.qtype);
        self.queries.lock().unwrap().push(key.clone());

        let mut response = self.responses.get(&key).unwrap_or(&self.fallback).clone()?;
        response.header.id = query.header.id;
        response.questions = query.questions.clone();
        Ok(Exchanged { response, rtt: RTT })
    }
}

/// A zone with an Ed25519 KSK (flags 257) and ZSK (flags 256)
pub struct TestZone {
    pub owner: DomainName,
    ksk_pair: Ed25519KeyPair,
    zsk_pair: Ed25519KeyPair,
    pub ksk: ZoneKey,
    pub zsk: ZoneKey,
}

impl TestZone {
    pub fn new(owner: &str, seed: u8) -> Self {
        let owner = name(owner);
        let ksk_pair = Ed25519KeyPair::from_seed_unchecked(&[seed; 32]).unwrap();
        let zsk_pair = Ed25519KeyPair::from_seed_unchecked(&[seed.wrapping_add(1); 32]).unwrap();
        let ksk = zone_key(&owner, &ksk_pair, 257);
        let zsk = zone_key(&owner, &zsk_pair, 256);
        Self {
            owner,
            ksk_pair,
            zsk_pair,
            ksk,
            zsk,
        }
    }

    pub fn dnskey_records(&self) -> Vec<DNSResource> {
        [&self.ksk, &self.zsk]
            .into_iter()
            .map(|key| DNSResource::new(self.owner.clone(), 3600, RData::DNSKEY(key.dnskey.clone())))
            .collect()
    }

    /// DNSKEY answer section signed by the KSK
    pub fn signed_dnskey_answers(&self) -> Vec<DNSResource> {
        let mut answers = self.dnskey_records();
        answers.push(self.sign_with_ksk(&answers));
        answers
    }

    pub fn sign_with_ksk(&self, rrset: &[DNSResource]) -> DNSResource {
        sign(&self.ksk_pair, &self.ksk, rrset)
    }

    pub fn sign_with_zsk(&self, rrset: &[DNSResource]) -> DNSResource {
        sign(&self.zsk_pair, &self.zsk, rrset)
    }

    /// `rrset` followed by its ZSK signature
    pub fn signed(&self, rrset: Vec<DNSResource>) -> Vec<DNSResource> {
        let sig = self.sign_with_zsk(&rrset);
        let mut answers = rrset;
        answers.push(sig);
        answers
    }

    pub fn ds_for_ksk(&self, digest_type: DigestType) -> Ds {
        Ds {
            key_tag: self.ksk.key_tag(),
            algorithm: 15,
            digest_type: digest_type.to_u8(),
            digest: self.ksk.ds_digest(digest_type),
        }
    }
}

fn zone_key(owner: &DomainName, pair: &Ed25519KeyPair, flags: u16) -> ZoneKey {
    ZoneKey {
        owner: owner.clone(),
        class: Default::default(),
        dnskey: Dnskey {
            flags,
            protocol: 3,
            algorithm: 15,
            public_key: pair.public_key().as_ref().to_vec(),
        },
    }
}

fn sign(pair: &Ed25519KeyPair, key: &ZoneKey, rrset: &[DNSResource]) -> DNSResource {
    let first = &rrset[0];
    let mut rrsig = Rrsig {
        type_covered: first.rtype,
        algorithm: 15,
        labels: first.name.label_count() as u8,
        original_ttl: first.ttl,
        expiration: 1_900_000_000,
        inception: 1_700_000_000,
        key_tag: key.key_tag(),
        signer_name: key.owner.clone(),
        signature: Vec::new(),
    };
    let data = signed_data(&rrsig, rrset).unwrap();
    rrsig.signature = pair.sign(&data).as_ref().to_vec();
    DNSResource::new(first.name.clone(), first.ttl, RData::RRSIG(rrsig))
}
