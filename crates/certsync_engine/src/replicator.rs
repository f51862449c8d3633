//! Drives the claim form once per record.
//!
//! The replicator owns no state between records: every record gets a fresh
//! [`SubmissionMachine`], the UI Surface session is the only thing shared.

use certsync_core::{
    BatchReport, CertificateRecord, Extraction, FailureCollector, FailureReason, FormAction,
    Observation, RecordOutcome, ReportEntry, SubmissionMachine,
};
use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use thiserror::Error;

use crate::settings::{ClaimFormSettings, MigrationSettings, WaitSettings};
use crate::wait::poll_until;
use crate::{TypingMode, UiError, UiSurface};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("claim form could not be opened: {0}")]
    FormUnavailable(#[source] UiError),
    #[error("ui surface went away while adding '{record}' after {attempted} record(s): {source}")]
    SurfaceUnavailable {
        record: String,
        attempted: usize,
        #[source]
        source: UiError,
    },
}

pub struct Replicator<'a, S: UiSurface + ?Sized> {
    surface: &'a S,
    form: &'a ClaimFormSettings,
    waits: &'a WaitSettings,
    success_markers: &'a [String],
}

impl<'a, S: UiSurface + ?Sized> Replicator<'a, S> {
    pub fn new(surface: &'a S, settings: &'a MigrationSettings) -> Self {
        Self {
            surface,
            form: &settings.form,
            waits: &settings.waits,
            success_markers: &settings.success_markers,
        }
    }

    /// Makes sure the session shows a usable claim form.
    ///
    /// Only navigates if the session is elsewhere, so a login that already
    /// landed on the form is reused for the first record.
    pub async fn open_form(&self) -> Result<(), BatchError> {
        let current = self
            .surface
            .current_url()
            .await
            .map_err(BatchError::FormUnavailable)?;
        if !current.starts_with(&self.form.form_url) {
            engine_debug!("Session at {}; opening claim form", current);
            self.surface
                .navigate(&self.form.form_url)
                .await
                .map_err(BatchError::FormUnavailable)?;
        }
        self.surface
            .wait_for_page_ready(self.waits.page_ready())
            .await
            .map_err(BatchError::FormUnavailable)?;
        self.surface
            .wait_for_element(&self.form.certificate_picker, self.waits.element())
            .await
            .map_err(BatchError::FormUnavailable)?;
        Ok(())
    }

    /// Submits every record in order, collecting failures as it goes.
    ///
    /// Per-record problems never stop the batch. A form that cannot be
    /// opened before the first record, or a surface that becomes unavailable
    /// later, ends it with an error.
    pub async fn run(
        &self,
        records: &[CertificateRecord],
        failures: &mut FailureCollector,
    ) -> Result<Vec<ReportEntry>, BatchError> {
        if records.is_empty() {
            engine_info!("No certificates to submit");
            return Ok(Vec::new());
        }
        self.open_form().await?;

        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            engine_info!(
                "Entering '{}' cert into claims system ({}/{})...",
                record.name(),
                index + 1,
                records.len()
            );
            let outcome = match self.submit(record, index > 0).await {
                Ok(outcome) => outcome,
                Err(source) => {
                    engine_error!("UI surface lost while adding '{}': {}", record.name(), source);
                    return Err(BatchError::SurfaceUnavailable {
                        record: record.name().to_string(),
                        attempted: index,
                        source,
                    });
                }
            };
            match &outcome {
                RecordOutcome::Succeeded => engine_info!("Added '{}'", record.name()),
                RecordOutcome::Failed(reason) => {
                    engine_warn!("Could not add '{}': {}", record.name(), reason);
                    failures.record(record.clone(), reason.clone());
                }
            }
            entries.push(ReportEntry {
                record: record.clone(),
                outcome,
            });
        }
        Ok(entries)
    }

    /// Drives one record to its outcome; `Err` only when the surface is gone.
    async fn submit(
        &self,
        record: &CertificateRecord,
        reset_form: bool,
    ) -> Result<RecordOutcome, UiError> {
        let mut machine = SubmissionMachine::new(record, reset_form)
            .with_success_markers(self.success_markers.iter().cloned());
        let mut actions = machine.actions();

        while !machine.state().is_terminal() {
            let observation = self.perform_all(&actions).await?;
            actions = match machine.advance(observation) {
                Ok(next) => next,
                Err(err) => {
                    engine_error!("Claim form driver out of step: {}", err);
                    return Ok(RecordOutcome::Failed(FailureReason::Ui {
                        message: err.to_string(),
                    }));
                }
            };
        }

        Ok(machine.outcome().unwrap_or_else(|| {
            RecordOutcome::Failed(FailureReason::Ui {
                message: "submission ended without an outcome".to_string(),
            })
        }))
    }

    async fn perform_all(&self, actions: &[FormAction]) -> Result<Observation, UiError> {
        let mut observation = Observation::Completed;
        for action in actions {
            engine_debug!("Performing {:?}", action);
            match self.perform(action).await {
                Ok(Some(seen)) => observation = seen,
                Ok(None) => {}
                Err(err @ UiError::Unavailable(_)) => return Err(err),
                Err(err) => {
                    engine_debug!("{} failed: {}", action.label(), err);
                    return Ok(Observation::StepFailed(err.into_failure()));
                }
            }
        }
        Ok(observation)
    }

    async fn perform(&self, action: &FormAction) -> Result<Option<Observation>, UiError> {
        let surface = self.surface;
        let form = self.form;
        let element_wait = self.waits.element();

        match action {
            FormAction::ResetForm => {
                surface.navigate(&form.form_url).await?;
                surface.wait_for_page_ready(self.waits.page_ready()).await?;
            }
            FormAction::OpenCertificatePicker => {
                let picker = surface
                    .wait_for_element(&form.certificate_picker, element_wait)
                    .await?;
                surface.click_element(&picker).await?;
            }
            FormAction::TypeCertificateName(name) => {
                let search = surface
                    .wait_for_element(&form.certificate_search, element_wait)
                    .await?;
                surface.fill_field(&search, name, form.search_typing).await?;
            }
            FormAction::ProbeCatalog => {
                let matched = poll_until(action.label(), element_wait, move || async move {
                    if surface.find_element(&form.no_match_alert).await?.is_some() {
                        return Ok::<_, UiError>(Some(false));
                    }
                    Ok(surface
                        .find_element(&form.catalog_option)
                        .await?
                        .map(|_| true))
                })
                .await?;
                return Ok(Some(Observation::CatalogMatch(matched)));
            }
            FormAction::ConfirmCertificate => {
                let search = surface
                    .wait_for_element(&form.certificate_search, element_wait)
                    .await?;
                surface.press_enter(&search).await?;
            }
            FormAction::FillIssueDate(date) => {
                let field = surface.wait_for_element(&form.issue_date, element_wait).await?;
                surface.clear_field(&field).await?;
                surface.fill_field(&field, date, TypingMode::Direct).await?;
            }
            FormAction::FillExpiryDate(date) => {
                let field = surface
                    .wait_for_element(&form.expiry_date, element_wait)
                    .await?;
                surface.fill_field(&field, date, TypingMode::Direct).await?;
            }
            FormAction::MarkNoExpiry => {
                let checkbox = surface
                    .wait_for_element(&form.no_expiry_checkbox, element_wait)
                    .await?;
                surface.click_element(&checkbox).await?;
            }
            FormAction::FillUrl(url) => {
                let field = surface.wait_for_element(&form.url_field, element_wait).await?;
                surface.fill_field(&field, url, TypingMode::Direct).await?;
            }
            FormAction::Submit => {
                let field = surface.wait_for_element(&form.url_field, element_wait).await?;
                surface.press_enter(&field).await?;
            }
            FormAction::ReadBanner => {
                let banner = surface
                    .wait_for_element(&form.result_banner, element_wait)
                    .await?;
                let text = surface.read_text(&banner).await?;
                return Ok(Some(Observation::Banner(text.trim().to_string())));
            }
        }
        Ok(None)
    }
}

/// Submits an extraction's records and folds everything into a report.
pub async fn replicate_batch<S>(
    surface: &S,
    settings: &MigrationSettings,
    extraction: Extraction,
) -> Result<BatchReport, BatchError>
where
    S: UiSurface + ?Sized,
{
    let mut failures = FailureCollector::new();
    let entries = Replicator::new(surface, settings)
        .run(&extraction.records, &mut failures)
        .await?;
    Ok(BatchReport::new(entries, failures, extraction.skipped))
}
