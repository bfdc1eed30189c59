use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::{
    ParseError,
    common::{PacketComponent, WireReader},
    enums::{DNSResourceClass, DNSResourceType},
    name::DomainName,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSQuestion {
    pub name: DomainName,
    pub qtype: DNSResourceType,
    pub qclass: DNSResourceClass,
}

impl PacketComponent for DNSQuestion {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        self.write_name(writer, &self.name)?;
        writer.write_var::<u16>(16, self.qtype.into())?;
        writer.write_var::<u16>(16, self.qclass.into())?;
        Ok(())
    }

    fn read(&mut self, reader: &mut WireReader<'_>) -> Result<(), ParseError> {
        let name = reader.read_name()?;
        let qtype = reader.read_u16()?.into();
        let qclass = reader.read_u16()?.into();
        *self = DNSQuestion {
            name,
            qtype,
            qclass,
        };
        Ok(())
    }
}
