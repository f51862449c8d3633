//! Certsync core: pure normalization, extraction and submission state machine.
mod extract;
mod failures;
mod normalize;
mod record;
mod report;
mod submission;

pub use extract::{extract_records, Extraction, RawEntry, SkipReason, SkippedEntry};
pub use failures::{FailedRecord, FailureCollector, FailureReason};
pub use normalize::{
    normalize_date_range, normalize_name, normalize_url, DateRange, NormalizeError,
    DATE_DELIMITER, NAME_REMOVALS, TRACKING_PATH_TOKEN,
};
pub use record::{CertificateRecord, RecordError};
pub use report::{BatchReport, ReportEntry};
pub use submission::{
    banner_confirms, FormAction, Observation, RecordOutcome, SubmissionMachine, SubmissionState,
    TransitionError, DEFAULT_SUCCESS_MARKERS,
};
