/// DNS Response Code constants from RFC 1035 and subsequent RFCs
pub struct DNSRcode;

impl DNSRcode {
    pub const NOERROR: u16 = 0; // No error
    pub const FORMERR: u16 = 1; // Format error
    pub const SERVFAIL: u16 = 2; // Server failure
    pub const NXDOMAIN: u16 = 3; // Name error
    pub const NOTIMP: u16 = 4; // Not implemented
    pub const REFUSED: u16 = 5; // Query refused
    pub const YXDOMAIN: u16 = 6; // Name exists when it should not
    pub const YXRRSET: u16 = 7; // RR Set exists when it should not
    pub const NXRRSET: u16 = 8; // RR Set that should exist does not
    pub const NOTAUTH: u16 = 9; // Not authorized
    pub const NOTZONE: u16 = 10; // Name not contained in zone
    pub const BADVERS: u16 = 16; // Bad OPT version
    pub const BADCOOKIE: u16 = 23; // Bad/missing server cookie

    /// Mnemonic for a (possibly extended) response code
    pub fn name(rcode: u16) -> String {
        let name = match rcode {
            Self::NOERROR => "NOERROR",
            Self::FORMERR => "FORMERR",
            Self::SERVFAIL => "SERVFAIL",
            Self::NXDOMAIN => "NXDOMAIN",
            Self::NOTIMP => "NOTIMP",
            Self::REFUSED => "REFUSED",
            Self::YXDOMAIN => "YXDOMAIN",
            Self::YXRRSET => "YXRRSET",
            Self::NXRRSET => "NXRRSET",
            Self::NOTAUTH => "NOTAUTH",
            Self::NOTZONE => "NOTZONE",
            Self::BADVERS => "BADVERS",
            Self::BADCOOKIE => "BADCOOKIE",
            other => return format!("RCODE{}", other),
        };
        name.to_string()
    }
}

/// UDP payload size advertised in probe queries
pub const EDNS_UDP_PAYLOAD_SIZE: u16 = 2048;

/// Receive buffer for UDP responses
pub const MAX_UDP_RESPONSE: usize = 4096;
