use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::DateTime;

use super::{ParseError, common::WireReader, enums::DNSResourceType, name::DomainName};
use crate::dnssec::key_tag::calculate_key_tag;

/// DNSKEY flag: the key is a zone key (RFC 4034 §2.1.1)
pub const DNSKEY_FLAG_ZONE: u16 = 0x0100;
/// DNSKEY flag: secure entry point (RFC 4034 §2.1.1)
pub const DNSKEY_FLAG_SEP: u16 = 0x0001;
/// Flags value of a key-signing key
pub const DNSKEY_FLAGS_KSK: u16 = DNSKEY_FLAG_ZONE | DNSKEY_FLAG_SEP;

/// Typed RDATA. Types the probe does not interpret are kept as raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(DomainName),
    NS(DomainName),
    PTR(DomainName),
    MX { preference: u16, exchange: DomainName },
    SOA(Soa),
    TXT(Vec<Vec<u8>>),
    SPF(Vec<Vec<u8>>),
    SRV(Srv),
    DS(Ds),
    DNSKEY(Dnskey),
    RRSIG(Rrsig),
    Unknown { rtype: u16, data: Vec<u8> },
}

impl Default for RData {
    fn default() -> Self {
        RData::Unknown {
            rtype: 0,
            data: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Soa {
    pub mname: DomainName,
    pub rname: DomainName,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Srv {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: DomainName,
}

/// Delegation signer (RFC 4034 §5)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ds {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

/// DNS public key (RFC 4034 §2)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl Dnskey {
    pub fn is_zone_key(&self) -> bool {
        self.flags & DNSKEY_FLAG_ZONE != 0
    }

    pub fn is_ksk(&self) -> bool {
        self.flags == DNSKEY_FLAGS_KSK
    }

    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.public_key.len());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.push(self.protocol);
        out.push(self.algorithm);
        out.extend_from_slice(&self.public_key);
        out
    }

    pub fn key_tag(&self) -> u16 {
        calculate_key_tag(self.algorithm, &self.to_wire())
    }
}

/// Resource record signature (RFC 4034 §3)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rrsig {
    pub type_covered: DNSResourceType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer_name: DomainName,
    pub signature: Vec<u8>,
}

impl Rrsig {
    /// RDATA up to and excluding the signature, signer name in canonical form.
    pub fn signed_prefix(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18 + self.signer_name.wire_len());
        out.extend_from_slice(&u16::from(self.type_covered).to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.expiration.to_be_bytes());
        out.extend_from_slice(&self.inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        self.signer_name.write_canonical(&mut out);
        out
    }
}

fn read_character_strings(
    reader: &mut WireReader<'_>,
    end: usize,
) -> Result<Vec<Vec<u8>>, ParseError> {
    let mut strings = Vec::new();
    while reader.position() < end {
        let len = reader.read_u8()? as usize;
        strings.push(reader.read_bytes(len)?.to_vec());
    }
    Ok(strings)
}

fn rest(reader: &mut WireReader<'_>, end: usize, rtype: DNSResourceType) -> Result<Vec<u8>, ParseError> {
    let len = end
        .checked_sub(reader.position())
        .ok_or(ParseError::InvalidRdata(rtype))?;
    Ok(reader.read_bytes(len)?.to_vec())
}

impl RData {
    /// Decode `len` bytes of RDATA for `rtype`. Embedded names may be
    /// compressed against the rest of the message.
    pub fn parse(
        rtype: DNSResourceType,
        reader: &mut WireReader<'_>,
        len: usize,
    ) -> Result<Self, ParseError> {
        if reader.remaining() < len {
            return Err(ParseError::Truncated {
                offset: reader.position(),
                need: len,
            });
        }
        let end = reader.position() + len;

        let rdata = match rtype {
            DNSResourceType::A => {
                let b = reader.read_bytes(4)?;
                RData::A(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
            }
            DNSResourceType::AAAA => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(reader.read_bytes(16)?);
                RData::AAAA(Ipv6Addr::from(octets))
            }
            DNSResourceType::CNAME => RData::CNAME(reader.read_name()?),
            DNSResourceType::NS => RData::NS(reader.read_name()?),
            DNSResourceType::PTR => RData::PTR(reader.read_name()?),
            DNSResourceType::MX => RData::MX {
                preference: reader.read_u16()?,
                exchange: reader.read_name()?,
            },
            DNSResourceType::SOA => RData::SOA(Soa {
                mname: reader.read_name()?,
                rname: reader.read_name()?,
                serial: reader.read_u32()?,
                refresh: reader.read_u32()?,
                retry: reader.read_u32()?,
                expire: reader.read_u32()?,
                minimum: reader.read_u32()?,
            }),
            DNSResourceType::TXT => RData::TXT(read_character_strings(reader, end)?),
            DNSResourceType::SPF => RData::SPF(read_character_strings(reader, end)?),
            DNSResourceType::SRV => RData::SRV(Srv {
                priority: reader.read_u16()?,
                weight: reader.read_u16()?,
                port: reader.read_u16()?,
                target: reader.read_name()?,
            }),
            DNSResourceType::DS => RData::DS(Ds {
                key_tag: reader.read_u16()?,
                algorithm: reader.read_u8()?,
                digest_type: reader.read_u8()?,
                digest: rest(reader, end, rtype)?,
            }),
            DNSResourceType::DNSKEY => RData::DNSKEY(Dnskey {
                flags: reader.read_u16()?,
                protocol: reader.read_u8()?,
                algorithm: reader.read_u8()?,
                public_key: rest(reader, end, rtype)?,
            }),
            DNSResourceType::RRSIG => RData::RRSIG(Rrsig {
                type_covered: reader.read_u16()?.into(),
                algorithm: reader.read_u8()?,
                labels: reader.read_u8()?,
                original_ttl: reader.read_u32()?,
                expiration: reader.read_u32()?,
                inception: reader.read_u32()?,
                key_tag: reader.read_u16()?,
                signer_name: reader.read_name()?,
                signature: rest(reader, end, rtype)?,
            }),
            other => RData::Unknown {
                rtype: other.into(),
                data: reader.read_bytes(len)?.to_vec(),
            },
        };

        if reader.position() != end {
            return Err(ParseError::InvalidRdata(rtype));
        }
        Ok(rdata)
    }

    pub fn rtype(&self) -> DNSResourceType {
        match self {
            RData::A(_) => DNSResourceType::A,
            RData::AAAA(_) => DNSResourceType::AAAA,
            RData::CNAME(_) => DNSResourceType::CNAME,
            RData::NS(_) => DNSResourceType::NS,
            RData::PTR(_) => DNSResourceType::PTR,
            RData::MX { .. } => DNSResourceType::MX,
            RData::SOA(_) => DNSResourceType::SOA,
            RData::TXT(_) => DNSResourceType::TXT,
            RData::SPF(_) => DNSResourceType::SPF,
            RData::SRV(_) => DNSResourceType::SRV,
            RData::DS(_) => DNSResourceType::DS,
            RData::DNSKEY(_) => DNSResourceType::DNSKEY,
            RData::RRSIG(_) => DNSResourceType::RRSIG,
            RData::Unknown { rtype, .. } => DNSResourceType::from(*rtype),
        }
    }

    /// Uncompressed wire form
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out, false);
        out
    }

    /// Canonical wire form: embedded names lower-cased (RFC 4034 §6.2)
    pub fn canonical_wire(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write(&mut out, true);
        out
    }

    fn write(&self, out: &mut Vec<u8>, canonical: bool) {
        let name = |out: &mut Vec<u8>, name: &DomainName| {
            if canonical {
                name.write_canonical(out)
            } else {
                name.write_wire(out)
            }
        };

        match self {
            RData::A(addr) => out.extend_from_slice(&addr.octets()),
            RData::AAAA(addr) => out.extend_from_slice(&addr.octets()),
            RData::CNAME(target) | RData::NS(target) | RData::PTR(target) => name(out, target),
            RData::MX {
                preference,
                exchange,
            } => {
                out.extend_from_slice(&preference.to_be_bytes());
                name(out, exchange);
            }
            RData::SOA(soa) => {
                name(out, &soa.mname);
                name(out, &soa.rname);
                for value in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
            RData::TXT(strings) | RData::SPF(strings) => {
                for s in strings {
                    out.push(s.len() as u8);
                    out.extend_from_slice(s);
                }
            }
            RData::SRV(srv) => {
                out.extend_from_slice(&srv.priority.to_be_bytes());
                out.extend_from_slice(&srv.weight.to_be_bytes());
                out.extend_from_slice(&srv.port.to_be_bytes());
                name(out, &srv.target);
            }
            RData::DS(ds) => {
                out.extend_from_slice(&ds.key_tag.to_be_bytes());
                out.push(ds.algorithm);
                out.push(ds.digest_type);
                out.extend_from_slice(&ds.digest);
            }
            RData::DNSKEY(key) => out.extend_from_slice(&key.to_wire()),
            RData::RRSIG(sig) => {
                let mut prefix = sig.signed_prefix();
                if !canonical {
                    prefix.truncate(18);
                    sig.signer_name.write_wire(&mut prefix);
                }
                out.extend_from_slice(&prefix);
                out.extend_from_slice(&sig.signature);
            }
            RData::Unknown { data, .. } => out.extend_from_slice(data),
        }
    }
}

/// Quoted character-string with zone-file escaping
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &[u8]) -> fmt::Result {
    f.write_str("\"")?;
    for &b in s {
        match b {
            b'"' | b'\\' => write!(f, "\\{}", b as char)?,
            0x20..=0x7e => write!(f, "{}", b as char)?,
            _ => write!(f, "\\{:03}", b)?,
        }
    }
    f.write_str("\"")
}

fn write_timestamp(f: &mut fmt::Formatter<'_>, secs: u32) -> fmt::Result {
    match DateTime::from_timestamp(secs as i64, 0) {
        Some(ts) => write!(f, "{}", ts.format("%Y%m%d%H%M%S")),
        None => write!(f, "{}", secs),
    }
}

/// Zone-file presentation of the RDATA, i.e. what follows the record header.
impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::AAAA(addr) => write!(f, "{}", addr),
            RData::CNAME(target) | RData::NS(target) | RData::PTR(target) => {
                write!(f, "{}", target)
            }
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::SOA(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            RData::TXT(strings) | RData::SPF(strings) => {
                for (i, s) in strings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_quoted(f, s)?;
                }
                Ok(())
            }
            RData::SRV(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),
            RData::DS(ds) => write!(
                f,
                "{} {} {} {}",
                ds.key_tag,
                ds.algorithm,
                ds.digest_type,
                hex::encode_upper(&ds.digest)
            ),
            RData::DNSKEY(key) => write!(
                f,
                "{} {} {} {}",
                key.flags,
                key.protocol,
                key.algorithm,
                BASE64.encode(&key.public_key)
            ),
            RData::RRSIG(sig) => {
                write!(
                    f,
                    "{} {} {} {} ",
                    sig.type_covered, sig.algorithm, sig.labels, sig.original_ttl
                )?;
                write_timestamp(f, sig.expiration)?;
                f.write_str(" ")?;
                write_timestamp(f, sig.inception)?;
                write!(
                    f,
                    " {} {} {}",
                    sig.key_tag,
                    sig.signer_name,
                    BASE64.encode(&sig.signature)
                )
            }
            RData::Unknown { data, .. } => write!(f, "\\# {} {}", data.len(), hex::encode(data)),
        }
    }
}
