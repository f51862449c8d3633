use std::fmt;

use crate::extract::SkippedEntry;
use crate::failures::{FailedRecord, FailureCollector};
use crate::record::CertificateRecord;
use crate::submission::RecordOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub record: CertificateRecord,
    pub outcome: RecordOutcome,
}

/// Read-only summary of one batch, rendered for the operator via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    entries: Vec<ReportEntry>,
    failures: FailureCollector,
    skipped: Vec<SkippedEntry>,
}

impl BatchReport {
    pub fn new(
        entries: Vec<ReportEntry>,
        failures: FailureCollector,
        skipped: Vec<SkippedEntry>,
    ) -> Self {
        Self {
            entries,
            failures,
            skipped,
        }
    }

    /// Attempted records with their outcomes, in submission order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.failed_names()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FailedRecord> {
        self.failures.iter()
    }

    /// Listing entries the extractor dropped before submission.
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn summary_line(&self) -> String {
        if self.failures.is_empty() {
            return format!(
                "All {} attempted certificate(s) were added.",
                self.entries.len()
            );
        }
        format!(
            "Failed to add {} of {} certificate(s): {}. Add these manually.",
            self.failures.len(),
            self.entries.len(),
            self.failed_names().join(", ")
        )
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Batch report: {} attempted, {} succeeded, {} failed, {} skipped",
            self.entries.len(),
            self.success_count(),
            self.failure_count(),
            self.skipped.len()
        )?;
        for entry in &self.entries {
            writeln!(f, "  {} {}", entry.outcome, entry.record)?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped listing entries:")?;
            for skip in &self.skipped {
                writeln!(f, "  #{} {:?}: {}", skip.index, skip.title, skip.reason)?;
            }
        }
        writeln!(f, "{}", self.summary_line())?;
        write!(
            f,
            "Dates were entered with day 01; correct the day of month manually."
        )
    }
}
