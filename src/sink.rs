//! Metrics sinks receiving one flat field/tag map per probe invocation

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Receiver of probe measurements
pub trait MetricsSink {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: Map<String, Value>,
        tags: BTreeMap<String, String>,
    );
}

/// One emitted measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn new(
        measurement: &str,
        fields: Map<String, Value>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            measurement: measurement.to_string(),
            tags,
            fields,
            timestamp: Utc::now(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Keeps every metric in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub metrics: Vec<Metric>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&Metric> {
        self.metrics.last()
    }
}

impl MetricsSink for MemorySink {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: Map<String, Value>,
        tags: BTreeMap<String, String>,
    ) {
        self.metrics.push(Metric::new(measurement, fields, tags));
    }
}

/// Writes each metric as one JSON line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for JsonLinesSink<W> {
    fn add_fields(
        &mut self,
        measurement: &str,
        fields: Map<String, Value>,
        tags: BTreeMap<String, String>,
    ) {
        let metric = Metric::new(measurement, fields, tags);
        let written = serde_json::to_writer(&mut self.writer, &metric)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = written {
            warn!("Failed to write {} metric: {}", measurement, e);
        }
    }
}
