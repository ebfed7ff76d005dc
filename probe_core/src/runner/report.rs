//! Aggregated failures of one run

use crate::{Outcome, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub probe: String,
    pub kind: String,
    pub timeout_ms: u64,
    pub outcome: Outcome,
}

impl ReportEntry {
    pub fn paragraph(&self) -> String {
        match &self.outcome {
            Outcome::Success => String::new(),
            Outcome::Failed(reasons) => reasons.join("\n"),
            Outcome::Crashed(error) => {
                format!("Probe {} crashed on {}:\n{}", self.kind, self.probe, error)
            }
            Outcome::TimedOut => format!(
                "Timed out after {:?} waiting on {}",
                Duration::from_millis(self.timeout_ms),
                self.probe
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Successful outcomes are not recorded.
    pub fn record(&mut self, probe: &str, kind: &str, timeout: Duration, outcome: Outcome) {
        if outcome.is_success() {
            return;
        }

        self.entries.push(ReportEntry {
            probe: probe.to_string(),
            kind: kind.to_string(),
            timeout_ms: timeout.as_millis() as u64,
            outcome,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// One paragraph per entry, separated by a blank line.
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(ReportEntry::paragraph)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}
