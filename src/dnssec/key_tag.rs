/// Calculate the key tag over DNSKEY RDATA (RFC 4034 Appendix B)
pub fn calculate_key_tag(algorithm: u8, rdata: &[u8]) -> u16 {
    // RSAMD5 uses bits 16-31 of the modulus tail (Appendix B.1)
    if algorithm == 1 {
        return match rdata.len() {
            len if len >= 7 => u16::from_be_bytes([rdata[len - 3], rdata[len - 2]]),
            _ => 0,
        };
    }

    let mut accumulator: u32 = 0;
    for (i, &byte) in rdata.iter().enumerate() {
        if i % 2 == 0 {
            accumulator += u32::from(byte) << 8;
        } else {
            accumulator += u32::from(byte);
        }
    }

    accumulator += accumulator >> 16;
    (accumulator & 0xFFFF) as u16
}
