//! Report generation
//!
//! Projects the outcome entries of a run log into a CSV table: the original
//! input columns followed by a fixed set of `migration_*` status columns.
//! Lines that are not outcome entries (run framing, blank or unparseable
//! lines) are skipped, so a report can be regenerated from any log at any
//! time.

use crate::core::batch::OutcomeRecord;
use crate::core::recorder::LogEntry;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

/// Derived columns appended after the input columns
pub const STATUS_COLUMNS: [&str; 5] = [
    "migration_row",
    "migration_status",
    "migration_outcome",
    "migration_error_code",
    "migration_error",
];

const OUTCOME_TYPE: &str = "outcome";

/// Just the entry tag, read before committing to a full parse
#[derive(Deserialize)]
struct Tagged {
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub rows: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Log lines that were not outcome entries
    pub skipped: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportGenerator;

impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Write the report for `log` to `output`, replacing any previous report
    pub fn generate(&self, log: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ReportSummary> {
        let log = log.as_ref();
        let output = output.as_ref();
        info!("Generating report from {:?} to {:?}", log, output);

        // First pass: collect input columns in first-seen order
        let mut columns: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for_each_outcome(log, |outcome| {
            for (name, _) in outcome.record.fields() {
                if seen.insert(name.to_string()) {
                    columns.push(name.to_string());
                }
            }
        })?;
        debug!(columns = columns.len(), "Collected input columns");

        // Second pass: write rows
        let mut writer = csv::Writer::from_path(output)?;
        writer.write_record(columns.iter().map(String::as_str).chain(STATUS_COLUMNS))?;

        let mut summary = ReportSummary::default();
        let mut write_error = None;
        let skipped = for_each_outcome(log, |outcome| {
            if write_error.is_some() {
                return;
            }
            if let Err(e) = writer.write_record(project(&columns, outcome)) {
                write_error = Some(e);
                return;
            }
            summary.rows += 1;
            if outcome.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        })?;
        if let Some(e) = write_error {
            return Err(e.into());
        }
        summary.skipped = skipped;
        writer.flush()?;

        info!(
            rows = summary.rows,
            skipped = summary.skipped,
            "Report written"
        );
        Ok(summary)
    }
}

fn project(columns: &[String], outcome: &OutcomeRecord) -> Vec<String> {
    let mut row: Vec<String> = columns
        .iter()
        .map(|name| outcome.record.get(name).unwrap_or_default().to_string())
        .collect();

    row.push(outcome.record.row().to_string());
    row.push(outcome.status.to_string());
    row.push(
        outcome
            .remote_outcome
            .map(|o| o.as_str().to_string())
            .unwrap_or_default(),
    );
    match &outcome.error {
        Some(error) => {
            row.push(error.code.clone());
            row.push(error.render());
        }
        None => {
            row.push(String::new());
            row.push(String::new());
        }
    }
    row
}

/// Call `f` for every outcome entry; returns the number of skipped lines
fn for_each_outcome<F>(log: &Path, mut f: F) -> Result<u64>
where
    F: FnMut(&OutcomeRecord),
{
    let reader = BufReader::new(File::open(log)?);
    let mut skipped = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }

        let tagged: Tagged = match serde_json::from_str(&line) {
            Ok(tagged) => tagged,
            Err(e) => {
                warn!(line = index + 1, "Skipping unparseable log line: {}", e);
                skipped += 1;
                continue;
            }
        };
        if tagged.kind.as_deref() != Some(OUTCOME_TYPE) {
            skipped += 1;
            continue;
        }

        // Parsed from the text itself so input columns keep their order
        match serde_json::from_str::<LogEntry>(&line) {
            Ok(LogEntry::Outcome(outcome)) => f(&outcome),
            Ok(_) => skipped += 1,
            Err(e) => {
                warn!(line = index + 1, "Skipping malformed outcome entry: {}", e);
                skipped += 1;
            }
        }
    }

    Ok(skipped)
}
