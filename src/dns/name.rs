use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::ParseError;

/// Maximum length of a domain name in wire format (RFC 1035 §2.3.4)
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of a single label (RFC 1035 §2.3.4)
pub const MAX_LABEL_LEN: usize = 63;

/// An absolute domain name held as its labels, root label excluded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DomainName {
    labels: Vec<String>,
}

impl DomainName {
    /// The root name `.`
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Build a name from labels, checking label and total lengths.
    pub fn from_labels(labels: Vec<String>) -> Result<Self, ParseError> {
        let mut wire_len = 1;
        for label in &labels {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(ParseError::InvalidLabel);
            }
            wire_len += label.len() + 1;
        }
        if wire_len > MAX_NAME_LEN {
            return Err(ParseError::NameTooLong);
        }
        Ok(Self { labels })
    }

    /// Parse a textual name. A trailing dot is optional; `.` is the root.
    pub fn parse(name: &str) -> Result<Self, ParseError> {
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        if trimmed.is_empty() {
            return if name == "." {
                Ok(Self::root())
            } else {
                Err(ParseError::InvalidLabel)
            };
        }
        Self::from_labels(trimmed.split('.').map(str::to_string).collect())
    }

    /// Name used for reverse lookups of an address (`in-addr.arpa` / `ip6.arpa`).
    pub fn reverse_pointer(ip: IpAddr) -> Self {
        let mut labels: Vec<String> = match ip {
            IpAddr::V4(v4) => v4.octets().iter().rev().map(u8::to_string).collect(),
            IpAddr::V6(v6) => v6
                .octets()
                .iter()
                .rev()
                .flat_map(|b| [format!("{:x}", b & 0x0f), format!("{:x}", b >> 4)])
                .collect(),
        };
        match ip {
            IpAddr::V4(_) => labels.extend(["in-addr".to_string(), "arpa".to_string()]),
            IpAddr::V6(_) => labels.extend(["ip6".to_string(), "arpa".to_string()]),
        }
        Self { labels }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label count as used by the RRSIG labels field: root and a leading
    /// wildcard label are not counted (RFC 4034 §3.1.3).
    pub fn label_count(&self) -> usize {
        match self.labels.first() {
            Some(first) if first == "*" => self.labels.len() - 1,
            _ => self.labels.len(),
        }
    }

    /// The rightmost `count` labels prefixed with a wildcard label.
    pub fn wildcard_suffix(&self, count: usize) -> Self {
        let start = self.labels.len().saturating_sub(count);
        let mut labels = Vec::with_capacity(count + 1);
        labels.push("*".to_string());
        labels.extend_from_slice(&self.labels[start..]);
        Self { labels }
    }

    /// Case-insensitive comparison (RFC 4343).
    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Length in uncompressed wire format, root label included.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1
    }

    /// Append the uncompressed wire form.
    pub fn write_wire(&self, out: &mut Vec<u8>) {
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
        out.push(0);
    }

    /// Append the canonical wire form: uncompressed, ASCII lower-cased (RFC 4034 §6.2).
    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        for label in &self.labels {
            out.push(label.len() as u8);
            out.extend(label.bytes().map(|b| b.to_ascii_lowercase()));
        }
        out.push(0);
    }

    /// Fully-qualified presentation form with the trailing dot.
    pub fn to_fqdn(&self) -> String {
        if self.labels.is_empty() {
            return ".".to_string();
        }
        let mut name = self.labels.join(".");
        name.push('.');
        name
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fqdn())
    }
}

impl FromStr for DomainName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
