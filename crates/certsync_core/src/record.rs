use std::fmt;

use thiserror::Error;

use crate::normalize::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("certificate name is empty after normalization")]
    EmptyName,
    #[error("certificate url is empty")]
    EmptyUrl,
}

/// A normalized certificate ready for submission.
///
/// Fields are private: a record is only built through [`CertificateRecord::new`]
/// and never changes afterwards. Expiry presence is carried by a single
/// `Option`, so `has_expiry` and `expiry_date` cannot disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    name: String,
    issue_date: String,
    expiry_date: Option<String>,
    url: String,
}

impl CertificateRecord {
    pub fn new(
        name: impl Into<String>,
        dates: DateRange,
        url: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let name = name.into();
        let url = url.into();
        if name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if url.trim().is_empty() {
            return Err(RecordError::EmptyUrl);
        }
        let (issue_date, expiry_date) = dates.into_parts();
        Ok(Self {
            name,
            issue_date,
            expiry_date,
            url,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_expiry(&self) -> bool {
        self.expiry_date.is_some()
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    pub fn expiry_date(&self) -> Option<&str> {
        self.expiry_date.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [issued {}", self.name, self.issue_date)?;
        if let Some(expiry) = &self.expiry_date {
            write!(f, ", expires {expiry}")?;
        }
        write!(f, "] {}", self.url)
    }
}
