#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable summaries
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. One destination record per unique destination, in first-appearance order
//! 2. One status record with the totals

use crate::engine::DispatchReport;
use serde::Serialize;
use std::io::{self, Write};

/// JSONL output formatter
///
/// Formats dispatch reports as JSON Lines (one JSON object per line).
pub struct JsonlFormatter;

impl JsonlFormatter {
    /// Creates a new JsonlFormatter
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format the dispatch report as JSONL
    pub fn format(&self, report: &DispatchReport) -> String {
        let mut output = String::new();

        for destination in &report.destinations {
            let record = DestinationRecord {
                record_type: "destination",
                destination: &destination.destination,
                slots: destination.slots as u64,
                lines: destination.lines,
                bytes: destination.bytes,
            };
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        let status = StatusRecord {
            record_type: "status",
            destinations: report.destinations.len() as u64,
            slots: report.destinations.iter().map(|d| d.slots as u64).sum(),
            lines: report.lines,
            bytes: report.bytes,
        };
        if let Ok(json) = serde_json::to_string(&status) {
            output.push_str(&json);
            output.push('\n');
        }

        output
    }

    /// Write the JSONL summary to stderr
    pub fn write_to_stderr(&self, report: &DispatchReport) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(self.format(report).as_bytes())?;
        stderr.flush()
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination record for JSONL output
#[derive(Debug, Serialize)]
struct DestinationRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    destination: &'a str,
    slots: u64,
    lines: u64,
    bytes: u64,
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    destinations: u64,
    slots: u64,
    lines: u64,
    bytes: u64,
}
