use std::fmt;

use crate::record::CertificateRecord;

/// Why a record did not make it into the target system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The target catalog has no certificate matching the record's name.
    NoMatchInCatalog,
    /// The form was submitted but the banner did not confirm it.
    SubmissionRejected { banner: String },
    /// A bounded UI wait ran out.
    Timeout { step: String },
    /// Any other UI Surface error while driving the form.
    Ui { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NoMatchInCatalog => write!(f, "no match in target catalog"),
            FailureReason::SubmissionRejected { banner } => {
                write!(f, "submission rejected: {banner}")
            }
            FailureReason::Timeout { step } => write!(f, "timed out waiting for {step}"),
            FailureReason::Ui { message } => write!(f, "ui error: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRecord {
    pub record: CertificateRecord,
    pub reason: FailureReason,
}

/// Failed records of a batch, in the order they were encountered.
///
/// Owned by the caller and lent to the replicator; reporting only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailureCollector {
    failures: Vec<FailedRecord>,
}

impl FailureCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: CertificateRecord, reason: FailureReason) {
        self.failures.push(FailedRecord { record, reason });
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.record.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailedRecord> {
        self.failures.iter()
    }
}
