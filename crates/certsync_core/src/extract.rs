use std::fmt;

use engine_logging::{engine_debug, engine_info};

use crate::normalize::{normalize_date_range, normalize_name, normalize_url, NormalizeError};
use crate::record::{CertificateRecord, RecordError};

/// One listing item as scraped, before any normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawEntry {
    pub title: String,
    pub date_text: String,
    pub link: Option<String>,
}

impl RawEntry {
    pub fn new(
        title: impl Into<String>,
        date_text: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            date_text: date_text.into(),
            link,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingLink,
    Normalize(NormalizeError),
    Record(RecordError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingLink => write!(f, "no credential link"),
            SkipReason::Normalize(err) => write!(f, "{err}"),
            SkipReason::Record(err) => write!(f, "{err}"),
        }
    }
}

/// An entry the extractor dropped, kept so the report can list it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position of the entry in the scraped listing.
    pub index: usize,
    pub title: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub records: Vec<CertificateRecord>,
    pub skipped: Vec<SkippedEntry>,
}

/// Normalizes raw listing entries into records, preserving input order.
///
/// Entries without a usable link, or whose text cannot be normalized, are
/// dropped with an info log and listed in [`Extraction::skipped`].
pub fn extract_records<I>(entries: I) -> Extraction
where
    I: IntoIterator<Item = RawEntry>,
{
    let mut extraction = Extraction::default();

    for (index, entry) in entries.into_iter().enumerate() {
        match build_record(&entry) {
            Ok(record) => {
                engine_debug!("Extracted certificate {}", record);
                extraction.records.push(record);
            }
            Err(reason) => {
                engine_info!(
                    "Skipping listing entry {} ({:?}): {}",
                    index,
                    entry.title,
                    reason
                );
                extraction.skipped.push(SkippedEntry {
                    index,
                    title: entry.title,
                    reason,
                });
            }
        }
    }

    engine_info!(
        "Extracted {} certificate(s), skipped {}",
        extraction.records.len(),
        extraction.skipped.len()
    );
    extraction
}

fn build_record(entry: &RawEntry) -> Result<CertificateRecord, SkipReason> {
    let name = normalize_name(&entry.title);
    let dates = normalize_date_range(&entry.date_text).map_err(SkipReason::Normalize)?;

    let link = entry
        .link
        .as_deref()
        .map(str::trim)
        .filter(|link| !link.is_empty())
        .ok_or(SkipReason::MissingLink)?;
    let url = normalize_url(link).map_err(SkipReason::Normalize)?;

    CertificateRecord::new(name, dates, url).map_err(SkipReason::Record)
}
