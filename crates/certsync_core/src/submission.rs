//! Per-record claim form state machine.
//!
//! The machine never touches a UI. It tells the driver which [`FormAction`]s
//! belong to the current state and is advanced with the [`Observation`] the
//! driver made while performing them. A fresh machine is built for every
//! record; only the first record of a batch skips the form reset.

use std::fmt;

use engine_logging::engine_debug;
use thiserror::Error;

use crate::failures::FailureReason;
use crate::record::CertificateRecord;

/// Banner text that marks a claim as accepted unless configured otherwise.
pub const DEFAULT_SUCCESS_MARKERS: &[&str] = &["has been added"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    SelectingCertificate,
    SearchingCatalog,
    MatchFound,
    EnteringDates,
    SettingExpiry,
    EnteringUrl,
    Submitting,
    ReadingResult,
    Success,
    Rejected { message: String },
    SkippedAsFailure,
    Aborted { failure: FailureReason },
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Success
                | SubmissionState::Rejected { .. }
                | SubmissionState::SkippedAsFailure
                | SubmissionState::Aborted { .. }
        )
    }
}

/// A single interaction with the claim form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    /// Navigate back to a blank claim form.
    ResetForm,
    OpenCertificatePicker,
    TypeCertificateName(String),
    /// Check whether the catalog offered a match for the typed name.
    ProbeCatalog,
    ConfirmCertificate,
    FillIssueDate(String),
    FillExpiryDate(String),
    MarkNoExpiry,
    FillUrl(String),
    Submit,
    ReadBanner,
}

impl FormAction {
    /// Short label used in logs and timeout reports.
    pub fn label(&self) -> &'static str {
        match self {
            FormAction::ResetForm => "claim form reset",
            FormAction::OpenCertificatePicker => "certificate picker",
            FormAction::TypeCertificateName(_) => "certificate search field",
            FormAction::ProbeCatalog => "catalog results",
            FormAction::ConfirmCertificate => "certificate selection",
            FormAction::FillIssueDate(_) => "issue date field",
            FormAction::FillExpiryDate(_) => "expiry date field",
            FormAction::MarkNoExpiry => "no-expiry checkbox",
            FormAction::FillUrl(_) => "url field",
            FormAction::Submit => "form submission",
            FormAction::ReadBanner => "result banner",
        }
    }
}

/// What the driver saw after performing the actions of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Completed,
    CatalogMatch(bool),
    Banner(String),
    StepFailed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("observation {observation:?} does not apply in state {state:?}")]
    Unexpected {
        state: SubmissionState,
        observation: Observation,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Succeeded,
    Failed(FailureReason),
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RecordOutcome::Succeeded)
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOutcome::Succeeded => write!(f, "OK"),
            RecordOutcome::Failed(reason) => write!(f, "FAILED ({reason})"),
        }
    }
}

/// True when the banner contains any of the success markers.
pub fn banner_confirms<S: AsRef<str>>(banner: &str, markers: &[S]) -> bool {
    let banner = banner.trim();
    markers
        .iter()
        .any(|marker| !marker.as_ref().is_empty() && banner.contains(marker.as_ref()))
}

#[derive(Debug, Clone)]
pub struct SubmissionMachine<'a> {
    record: &'a CertificateRecord,
    state: SubmissionState,
    reset_form: bool,
    success_markers: Vec<String>,
}

impl<'a> SubmissionMachine<'a> {
    pub fn new(record: &'a CertificateRecord, reset_form: bool) -> Self {
        Self {
            record,
            state: SubmissionState::SelectingCertificate,
            reset_form,
            success_markers: DEFAULT_SUCCESS_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    pub fn with_success_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.success_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn record(&self) -> &'a CertificateRecord {
        self.record
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Actions the driver must perform in the current state, in order.
    pub fn actions(&self) -> Vec<FormAction> {
        let record = self.record;
        match &self.state {
            SubmissionState::SelectingCertificate => {
                let mut actions = Vec::with_capacity(3);
                if self.reset_form {
                    actions.push(FormAction::ResetForm);
                }
                actions.push(FormAction::OpenCertificatePicker);
                actions.push(FormAction::TypeCertificateName(record.name().to_string()));
                actions
            }
            SubmissionState::SearchingCatalog => vec![FormAction::ProbeCatalog],
            SubmissionState::MatchFound => vec![FormAction::ConfirmCertificate],
            SubmissionState::EnteringDates => {
                vec![FormAction::FillIssueDate(record.issue_date().to_string())]
            }
            SubmissionState::SettingExpiry => match record.expiry_date() {
                Some(expiry) => vec![FormAction::FillExpiryDate(expiry.to_string())],
                None => vec![FormAction::MarkNoExpiry],
            },
            SubmissionState::EnteringUrl => vec![FormAction::FillUrl(record.url().to_string())],
            SubmissionState::Submitting => vec![FormAction::Submit],
            SubmissionState::ReadingResult => vec![FormAction::ReadBanner],
            SubmissionState::Success
            | SubmissionState::Rejected { .. }
            | SubmissionState::SkippedAsFailure
            | SubmissionState::Aborted { .. } => Vec::new(),
        }
    }

    /// Applies an observation and returns the actions of the new state.
    pub fn advance(
        &mut self,
        observation: Observation,
    ) -> Result<Vec<FormAction>, TransitionError> {
        use SubmissionState as S;

        let next = match (&self.state, &observation) {
            (S::SelectingCertificate, Observation::Completed) => Some(S::SearchingCatalog),
            (S::SearchingCatalog, Observation::CatalogMatch(true)) => Some(S::MatchFound),
            (S::SearchingCatalog, Observation::CatalogMatch(false)) => Some(S::SkippedAsFailure),
            (S::MatchFound, Observation::Completed) => Some(S::EnteringDates),
            (S::EnteringDates, Observation::Completed) => Some(S::SettingExpiry),
            (S::SettingExpiry, Observation::Completed) => Some(S::EnteringUrl),
            (S::EnteringUrl, Observation::Completed) => Some(S::Submitting),
            (S::Submitting, Observation::Completed) => Some(S::ReadingResult),
            (S::ReadingResult, Observation::Banner(text)) => {
                if banner_confirms(text, self.success_markers.as_slice()) {
                    Some(S::Success)
                } else {
                    Some(S::Rejected {
                        message: text.trim().to_string(),
                    })
                }
            }
            (state, Observation::StepFailed(failure)) if !state.is_terminal() => {
                Some(S::Aborted {
                    failure: failure.clone(),
                })
            }
            _ => None,
        };

        let Some(next) = next else {
            return Err(TransitionError::Unexpected {
                state: self.state.clone(),
                observation,
            });
        };

        engine_debug!(
            "{:?}: {:?} -> {:?}",
            self.record.name(),
            self.state,
            next
        );
        self.state = next;
        Ok(self.actions())
    }

    /// The record's outcome once a terminal state is reached.
    pub fn outcome(&self) -> Option<RecordOutcome> {
        match &self.state {
            SubmissionState::Success => Some(RecordOutcome::Succeeded),
            SubmissionState::Rejected { message } => {
                Some(RecordOutcome::Failed(FailureReason::SubmissionRejected {
                    banner: message.clone(),
                }))
            }
            SubmissionState::SkippedAsFailure => {
                Some(RecordOutcome::Failed(FailureReason::NoMatchInCatalog))
            }
            SubmissionState::Aborted { failure } => Some(RecordOutcome::Failed(failure.clone())),
            _ => None,
        }
    }
}
