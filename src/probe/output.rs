use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Overall classification of one probe invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeResult {
    #[default]
    Unset,
    Timeout,
    ConnectionFailed,
    PartialFailure,
    Success,
}

impl ProbeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeResult::Unset => "unset",
            ProbeResult::Timeout => "timeout",
            ProbeResult::ConnectionFailed => "connection_failed",
            ProbeResult::PartialFailure => "partial_failure",
            ProbeResult::Success => "success",
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mapped answer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub rcode: String,
    pub rtype: String,
    pub ttl: u32,
    /// RTT of the exchange that returned the record, e.g. `12.345ms`
    pub response_time: String,
    pub rdata: String,
    pub dnssec_verified: bool,
}

impl AnswerRecord {
    pub fn to_value(&self) -> Value {
        json!({
            "rcode": self.rcode,
            "rtype": self.rtype,
            "ttl": self.ttl,
            "response_time": self.response_time,
            "rdata": self.rdata,
            "dnssec_verified": self.dnssec_verified,
        })
    }
}

/// Result of one invocation, handed to the metrics sink as fields and tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProbeOutput {
    pub domain: String,
    pub result: ProbeResult,
    pub resolver_name: String,
    pub resolver_ip: String,
    pub resolver_port: String,
    pub resolver_protocol: String,
    /// Sum of whole-millisecond RTTs of the successful sweep exchanges
    pub response_time: String,
    pub records: Vec<AnswerRecord>,
    pub zsk_verified: bool,
    pub ksk_verified: bool,
}

impl ProbeOutput {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Self::default()
        }
    }

    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("result".into(), json!(self.result.as_str()));
        fields.insert("resolver_name".into(), json!(self.resolver_name));
        fields.insert("resolver_ip".into(), json!(self.resolver_ip));
        fields.insert("resolver_port".into(), json!(self.resolver_port));
        fields.insert("resolver_protocol".into(), json!(self.resolver_protocol));
        fields.insert("response_time".into(), json!(self.response_time));
        fields.insert(
            "records".into(),
            Value::Array(self.records.iter().map(AnswerRecord::to_value).collect()),
        );
        fields.insert("zsk_verified".into(), json!(self.zsk_verified));
        fields.insert("ksk_verified".into(), json!(self.ksk_verified));
        fields
    }

    pub fn tags(&self) -> BTreeMap<String, String> {
        BTreeMap::from([("domain".to_string(), self.domain.clone())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_and_tags() {
        let mut output = ProbeOutput::new("example.com");
        output.result = ProbeResult::PartialFailure;
        output.response_time = "42".to_string();
        output.records.push(AnswerRecord {
            rcode: "NOERROR".to_string(),
            rtype: "A".to_string(),
            ttl: 300,
            response_time: "12.5ms".to_string(),
            rdata: "192.0.2.1".to_string(),
            dnssec_verified: true,
        });

        let fields = output.fields();
        assert_eq!(fields["result"], "partial_failure");
        assert_eq!(fields["response_time"], "42");
        assert_eq!(fields["records"][0]["rdata"], "192.0.2.1");
        assert_eq!(fields["records"][0]["ttl"], 300);
        assert_eq!(fields["zsk_verified"], false);
        assert_eq!(fields.len(), 9);
        assert_eq!(output.tags()["domain"], "example.com");
    }

    #[test]
    fn test_result_names() {
        assert_eq!(ProbeResult::default(), ProbeResult::Unset);
        assert_eq!(ProbeResult::ConnectionFailed.to_string(), "connection_failed");
        assert_eq!(
            serde_json::to_value(ProbeResult::Timeout).unwrap(),
            json!("timeout")
        );
    }
}
