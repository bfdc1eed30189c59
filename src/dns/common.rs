use bitstream_io::{BitWrite, BitWriter, Endianness};

use super::ParseError;
use super::name::{DomainName, MAX_NAME_LEN};

pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;
    fn read(&mut self, reader: &mut WireReader<'_>) -> Result<(), ParseError>;

    fn write_name<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
        name: &DomainName,
    ) -> Result<(), ParseError> {
        let mut wire = Vec::with_capacity(name.wire_len());
        name.write_wire(&mut wire);
        writer.write_bytes(&wire)?;
        Ok(())
    }
}

/// Cursor over a whole DNS message. Names are decoded against the full
/// buffer so compression pointers can be followed from any section.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        if self.remaining() < len {
            return Err(ParseError::Truncated {
                offset: self.pos,
                need: len,
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ParseError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a possibly compressed name. The cursor ends up after the first
    /// pointer, or after the root label when the name is uncompressed.
    pub fn read_name(&mut self) -> Result<DomainName, ParseError> {
        let mut labels = Vec::new();
        let mut wire_len = 1;
        let mut offset = self.pos;
        let mut resume_at = None;
        // Pointers must point strictly backwards, which bounds the walk.
        let mut limit = self.pos;

        loop {
            let len = *self.buf.get(offset).ok_or(ParseError::Truncated { offset, need: 1 })?;
            match len & 0xC0 {
                0x00 => {
                    if len == 0 {
                        offset += 1;
                        break;
                    }
                    let start = offset + 1;
                    let end = start + len as usize;
                    let bytes = self.buf.get(start..end).ok_or(ParseError::Truncated {
                        offset: start,
                        need: len as usize,
                    })?;
                    wire_len += bytes.len() + 1;
                    if wire_len > MAX_NAME_LEN {
                        return Err(ParseError::NameTooLong);
                    }
                    let label =
                        String::from_utf8(bytes.to_vec()).map_err(|_| ParseError::InvalidLabel)?;
                    labels.push(label);
                    offset = end;
                }
                0xC0 => {
                    let low = *self
                        .buf
                        .get(offset + 1)
                        .ok_or(ParseError::Truncated { offset, need: 2 })?;
                    let target = (((len & 0x3F) as usize) << 8) | low as usize;
                    if target >= limit {
                        return Err(ParseError::BadPointer(offset));
                    }
                    if resume_at.is_none() {
                        resume_at = Some(offset + 2);
                    }
                    limit = target;
                    offset = target;
                }
                _ => return Err(ParseError::InvalidLabel),
            }
        }

        self.pos = resume_at.unwrap_or(offset);
        DomainName::from_labels(labels)
    }
}
