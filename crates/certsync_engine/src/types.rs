use std::fmt;
use std::time::Duration;

use certsync_core::FailureReason;

/// How an element is located on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(String),
    Css(String),
}

impl Locator {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::XPath(expr) => write!(f, "xpath:{expr}"),
            Locator::Css(selector) => write!(f, "css:{selector}"),
        }
    }
}

/// Opaque handle to an element found by a [`crate::UiSurface`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element {
    id: String,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypingMode {
    /// Set the whole value in one call.
    #[default]
    Direct,
    /// Type one character at a time with a randomized pause between keys.
    Humanlike,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    #[error("timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },
    #[error("ui surface unavailable: {0}")]
    Unavailable(String),
    #[error("ui protocol error: {0}")]
    Protocol(String),
    #[error("element is no longer attached to the page")]
    StaleElement,
}

impl UiError {
    /// Per-record failure reason for the report.
    pub fn into_failure(self) -> FailureReason {
        match self {
            UiError::Timeout { what, .. } => FailureReason::Timeout { step: what },
            other => FailureReason::Ui {
                message: other.to_string(),
            },
        }
    }
}
