use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::{PacketComponent, WireReader},
    enums::{DNSResourceClass, DNSResourceType},
    name::DomainName,
    rdata::RData,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSResource {
    pub name: DomainName,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdata: RData,
}

impl DNSResource {
    pub fn new(name: DomainName, ttl: u32, rdata: RData) -> Self {
        Self {
            name,
            rtype: rdata.rtype(),
            rclass: DNSResourceClass::IN,
            ttl,
            rdata,
        }
    }
}

impl PacketComponent for DNSResource {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        let rdata = self.rdata.to_wire();
        self.write_name(writer, &self.name)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, rdata.len() as u16)?;
        writer.write_bytes(&rdata)?;
        Ok(())
    }

    fn read(&mut self, reader: &mut WireReader<'_>) -> Result<(), ParseError> {
        self.name = reader.read_name()?;
        self.rtype = reader.read_u16()?.into();
        self.rclass = reader.read_u16()?.into();
        self.ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()? as usize;
        self.rdata = RData::parse(self.rtype, reader, rdlength)?;
        Ok(())
    }
}
