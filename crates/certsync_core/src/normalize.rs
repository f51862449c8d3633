//! Pure normalizers turning scraped listing text into canonical record fields.

use std::fmt;

use thiserror::Error;
use url::Url;

/// Substrings removed from certificate titles, applied in this order.
///
/// Matching is case-sensitive: `"cert"` only hits the lowercase form, so
/// `"Certification"` survives until its own entry.
pub const NAME_REMOVALS: &[&str] = &[
    ":",
    "AWS",
    "Google Cloud",
    "Google",
    "Microsoft",
    "Certified",
    "HashiCorp",
    "KCNA",
    "CKA",
    "cert",
    "Certification",
];

/// Dash look-alikes mapped to an ASCII hyphen.
const DASH_VARIANTS: &[char] = &[
    '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2212}',
];

/// Separates the issue clause from the expiry clause in the listing's date line.
pub const DATE_DELIMITER: char = '\u{00B7}';

const ISSUED_PREFIX: &str = "Issued";
const EXPIRY_PREFIXES: &[&str] = &["Expires", "Expired"];

const MONTHS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

/// Path token the source profile appends to outbound credential links.
pub const TRACKING_PATH_TOKEN: &str = "linked_in_profile";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unrecognized month `{0}`")]
    UnrecognizedMonth(String),
    #[error("malformed date clause `{0}`")]
    MalformedDate(String),
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Issue and optional expiry date, both in `MMDDYYYY` form with the day fixed to `01`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    issue_date: String,
    expiry_date: Option<String>,
}

impl DateRange {
    pub fn new(issue_date: impl Into<String>, expiry_date: Option<String>) -> Self {
        Self {
            issue_date: issue_date.into(),
            expiry_date,
        }
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

    pub(crate) fn into_parts(self) -> (String, Option<String>) {
        (self.issue_date, self.expiry_date)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expiry_date {
            Some(expiry) => write!(f, "{} .. {}", self.issue_date, expiry),
            None => write!(f, "{} (no expiry)", self.issue_date),
        }
    }
}

/// Strips vendor boilerplate from a certificate title and tidies whitespace.
///
/// The cleanup pass is repeated until it stops changing the text, so a
/// removal that splices together a new keyword (or a doubled space) is
/// handled too and the function is idempotent.
pub fn normalize_name(raw: &str) -> String {
    let mut current = name_pass(raw);
    loop {
        let next = name_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn name_pass(input: &str) -> String {
    let mut text = input.to_string();
    for needle in NAME_REMOVALS {
        text = text.replace(needle, "");
    }
    let text: String = text
        .chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses `"Issued Jan 2022 · Expires Mar 2024"` style text.
///
/// Only the presence of [`DATE_DELIMITER`] decides whether an expiry date
/// exists; `Expires` and `Expired` prefixes are treated alike.
pub fn normalize_date_range(raw: &str) -> Result<DateRange, NormalizeError> {
    let (issue_clause, expiry_clause) = match raw.split_once(DATE_DELIMITER) {
        Some((issue, expiry)) => (issue, Some(expiry)),
        None => (raw, None),
    };

    let issue_clause = strip_prefix_any(issue_clause.trim(), &[ISSUED_PREFIX]);
    let issue_date = month_year_to_date(issue_clause)?;

    let expiry_date = expiry_clause
        .map(|clause| month_year_to_date(strip_prefix_any(clause.trim(), EXPIRY_PREFIXES)))
        .transpose()?;

    Ok(DateRange::new(issue_date, expiry_date))
}

fn strip_prefix_any<'a>(clause: &'a str, prefixes: &[&str]) -> &'a str {
    prefixes
        .iter()
        .find_map(|prefix| clause.strip_prefix(prefix))
        .unwrap_or(clause)
        .trim()
}

fn month_year_to_date(clause: &str) -> Result<String, NormalizeError> {
    let mut tokens = clause.split_whitespace();
    let (Some(month), Some(year)) = (tokens.next(), tokens.next()) else {
        return Err(NormalizeError::MalformedDate(clause.to_string()));
    };

    let month = MONTHS
        .iter()
        .find(|(abbrev, _)| *abbrev == month)
        .map(|(_, numeric)| *numeric)
        .ok_or_else(|| NormalizeError::UnrecognizedMonth(month.to_string()))?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NormalizeError::MalformedDate(clause.to_string()));
    }

    Ok(format!("{month}01{year}"))
}

/// Reduces a credential link to scheme, host and path.
///
/// Query, fragment, userinfo and the [`TRACKING_PATH_TOKEN`] are dropped.
pub fn normalize_url(raw: &str) -> Result<String, NormalizeError> {
    let invalid = |reason: String| NormalizeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("not an absolute url with a host".to_string()));
    }

    url.set_query(None);
    url.set_fragment(None);
    // Both only fail for urls without a host, excluded above.
    let _ = url.set_username("");
    let _ = url.set_password(None);

    let mut path = url.path().to_string();
    while path.contains(TRACKING_PATH_TOKEN) {
        path = path.replace(TRACKING_PATH_TOKEN, "");
    }
    url.set_path(&path);

    let mut canonical: String = url.into();
    // A bare origin is written without the root slash the parser adds.
    if path == "/" {
        canonical.pop();
    }
    Ok(canonical)
}
