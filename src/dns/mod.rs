pub mod common;
pub mod constants;
pub mod edns;
pub mod enums;
pub mod header;
pub mod name;
pub mod question;
pub mod rdata;
pub mod resource;

use bitstream_io::{BigEndian, BitWrite, BitWriter};
use common::{PacketComponent, WireReader};
use constants::{DNSRcode, EDNS_UDP_PAYLOAD_SIZE};
use edns::EdnsOpt;
use enums::{DNSResourceClass, DNSResourceType};
use header::DNSHeader;
use name::DomainName;
use question::DNSQuestion;
use rdata::RData;
use resource::DNSResource;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSPacket {
    pub header: DNSHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
    pub resources: Vec<DNSResource>,
    /// EDNS0 OPT record if present (extracted from additional records)
    pub edns: Option<EdnsOpt>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid DNS header")]
    InvalidHeader,
    #[error("Invalid DNS label")]
    InvalidLabel,
    #[error("Domain name exceeds 255 octets")]
    NameTooLong,
    #[error("Truncated message at offset {offset}, need {need} more bytes")]
    Truncated { offset: usize, need: usize },
    #[error("Bad compression pointer at offset {0}")]
    BadPointer(usize),
    #[error("Invalid RDATA for {0}")]
    InvalidRdata(DNSResourceType),
    #[error("Invalid EDNS OPT record")]
    InvalidEdns,
    #[error("Invalid bit stream: {0}")]
    InvalidBitStream(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::InvalidBitStream(e.to_string())
    }
}

impl DNSPacket {
    /// Build a recursive query for `name`/`rtype` carrying EDNS0 with the DO bit.
    pub fn query(name: &DomainName, rtype: DNSResourceType, id: u16) -> Self {
        let mut packet = DNSPacket {
            header: DNSHeader {
                id,
                rd: true,
                qdcount: 1,
                ..DNSHeader::default()
            },
            questions: vec![DNSQuestion {
                name: name.clone(),
                qtype: rtype,
                qclass: DNSResourceClass::IN,
            }],
            ..DNSPacket::default()
        };
        packet.add_edns(EDNS_UDP_PAYLOAD_SIZE, true);
        packet
    }

    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        trace!("Parsing DNS packet, size: {} bytes", buf.len());
        let mut reader = WireReader::new(buf);
        let mut packet = DNSPacket::default();
        packet.header.read(&mut reader)?;
        debug!(
            "Parsed DNS header: id={}, qr={}, rcode={}, answers={}",
            packet.header.id, packet.header.qr, packet.header.rcode, packet.header.ancount
        );

        for _ in 0..packet.header.qdcount {
            let mut question = DNSQuestion::default();
            question.read(&mut reader)?;
            packet.questions.push(question);
        }

        for _ in 0..packet.header.ancount {
            let mut answer = DNSResource::default();
            answer.read(&mut reader)?;
            packet.answers.push(answer);
        }

        for _ in 0..packet.header.nscount {
            let mut authority = DNSResource::default();
            authority.read(&mut reader)?;
            packet.authorities.push(authority);
        }

        for _ in 0..packet.header.arcount {
            let mut resource = DNSResource::default();
            resource.read(&mut reader)?;

            if resource.rtype == DNSResourceType::OPT && resource.name.is_root() {
                if let RData::Unknown { data, .. } = &resource.rdata {
                    let edns =
                        EdnsOpt::parse_from_resource(resource.rclass.into(), resource.ttl, data)?;
                    packet.edns = Some(edns);
                    continue;
                }
            }

            packet.resources.push(resource);
        }

        Ok(packet)
    }

    /// Serialize without name compression. Section counts are taken from the
    /// section lengths, not from the header.
    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);

        let mut header = self.header.clone();
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;
        header.nscount = self.authorities.len() as u16;
        header.arcount = self.resources.len() as u16 + self.edns.is_some() as u16;
        header.write(&mut writer)?;

        for question in &self.questions {
            question.write(&mut writer)?;
        }
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.resources)
        {
            record.write(&mut writer)?;
        }

        if let Some(edns) = &self.edns {
            let (udp_payload_size, ttl, rdata) = edns.to_resource_format();
            // Root owner name
            writer.write_var::<u8>(8, 0)?;
            writer.write_var::<u16>(16, DNSResourceType::OPT.into())?;
            writer.write_var::<u16>(16, udp_payload_size)?;
            writer.write_var::<u32>(32, ttl)?;
            writer.write_var::<u16>(16, rdata.len() as u16)?;
            writer.write_bytes(&rdata)?;
        }

        Ok(buf)
    }

    /// Add or replace the EDNS0 OPT record
    pub fn add_edns(&mut self, payload_size: u16, do_flag: bool) {
        let mut edns = EdnsOpt::with_payload_size(payload_size);
        edns.set_do_flag(do_flag);
        self.edns = Some(edns);
    }

    /// Full response code, including the EDNS extended bits.
    pub fn rcode(&self) -> u16 {
        let extended = self
            .edns
            .as_ref()
            .map(|edns| edns.extended_rcode as u16)
            .unwrap_or(0);
        (extended << 4) | self.header.rcode as u16
    }

    pub fn rcode_name(&self) -> String {
        DNSRcode::name(self.rcode())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_query_wire_format() {
        let name = DomainName::parse("example.com").unwrap();
        let packet = DNSPacket::query(&name, DNSResourceType::A, 0x1234);
        let wire = packet.serialize().unwrap();

        // id, flags (RD), qd=1, an=0, ns=0, ar=1
        assert_eq!(
            &wire[..12],
            &[0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(&wire[12..25], b"\x07example\x03com\x00");
        assert_eq!(&wire[25..29], &[0, 1, 0, 1]);
        // OPT: root, type 41, class 2048, ttl with DO, rdlength 0
        assert_eq!(&wire[29..], &[0, 0, 41, 0x08, 0x00, 0, 0, 0x80, 0, 0, 0]);

        let parsed = DNSPacket::parse(&wire).unwrap();
        assert_eq!(parsed.questions, packet.questions);
        let edns = parsed.edns.unwrap();
        assert!(edns.do_flag());
        assert_eq!(edns.udp_payload_size, 2048);
    }

    #[test]
    fn test_parse_compressed_response() {
        let mut wire = vec![
            0xab, 0xcd, 0x81, 0x80, 0, 1, 0, 1, 0, 0, 0, 0, // header
        ];
        wire.extend_from_slice(b"\x07example\x03com\x00\x00\x01\x00\x01");
        // answer: pointer to the question name, A IN, ttl 300, 93.184.216.34
        wire.extend_from_slice(&[0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0x01, 0x2c, 0, 4]);
        wire.extend_from_slice(&[93, 184, 216, 34]);

        let packet = DNSPacket::parse(&wire).unwrap();
        assert!(packet.header.qr);
        assert_eq!(packet.rcode_name(), "NOERROR");
        assert_eq!(packet.answers.len(), 1);
        let answer = &packet.answers[0];
        assert_eq!(answer.name.to_fqdn(), "example.com.");
        assert_eq!(answer.ttl, 300);
        assert_eq!(answer.rdata, RData::A(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn test_extended_rcode() {
        let mut packet = DNSPacket::default();
        packet.header.rcode = 3;
        assert_eq!(packet.rcode_name(), "NXDOMAIN");
        packet.add_edns(1232, false);
        if let Some(edns) = packet.edns.as_mut() {
            edns.extended_rcode = 1;
        }
        assert_eq!(packet.rcode(), 19);
        assert_eq!(packet.rcode_name(), "RCODE19");
    }

    #[test]
    fn test_truncated_packet_is_rejected() {
        assert_eq!(DNSPacket::parse(&[0x00, 0x01]), Err(ParseError::InvalidHeader));
        let wire = [0, 1, 0x81, 0x80, 0, 1, 0, 0, 0, 0, 0, 0, 3, b'c'];
        assert!(DNSPacket::parse(&wire).is_err());
    }
}
