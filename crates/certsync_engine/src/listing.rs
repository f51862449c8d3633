use certsync_core::RawEntry;
use engine_logging::{engine_debug, engine_info};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::settings::{ListingSelectors, WaitSettings};
use crate::{UiError, UiSurface};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("invalid listing selector `{selector}`: {message}")]
    InvalidSelector { selector: String, message: String },
    #[error(transparent)]
    Ui(#[from] UiError),
}

fn selector(raw: &str) -> Result<Selector, ListingError> {
    Selector::parse(raw).map_err(|err| ListingError::InvalidSelector {
        selector: raw.to_string(),
        message: err.to_string(),
    })
}

/// Pulls raw certification entries out of a rendered listing page.
///
/// - title: text of the first title match inside the item
/// - date text: first text node starting with the date prefix
/// - link: `href` of the first link match, resolved against `base_url`
///
/// Items without a title are not certifications and are ignored.
pub fn parse_listing(
    html: &str,
    selectors: &ListingSelectors,
    base_url: Option<&str>,
) -> Result<Vec<RawEntry>, ListingError> {
    let item_sel = selector(&selectors.item)?;
    let title_sel = selector(&selectors.title)?;
    let link_sel = selector(&selectors.link)?;
    let base_url = base_url.and_then(|b| Url::parse(b).ok());

    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for (position, item) in document.select(&item_sel).enumerate() {
        let title = item
            .select(&title_sel)
            .next()
            .map(|node| node.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty());
        let Some(title) = title else {
            engine_debug!("Listing item {} has no title; ignoring", position);
            continue;
        };

        let date_text = item
            .text()
            .map(str::trim)
            .find(|text| text.starts_with(selectors.date_prefix.as_str()))
            .unwrap_or_default()
            .to_string();

        let link = item
            .select(&link_sel)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .and_then(|href| resolve_href(href, base_url.as_ref()));

        entries.push(RawEntry {
            title,
            date_text,
            link,
        });
    }

    Ok(entries)
}

fn resolve_href(reference: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = reference.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url.into());
    }
    base.and_then(|base| base.join(trimmed).ok()).map(Into::into)
}

/// Opens the listing, scrolls it fully loaded and scrapes its entries.
pub async fn collect_listing<S>(
    surface: &S,
    listing_url: &str,
    selectors: &ListingSelectors,
    waits: &WaitSettings,
) -> Result<Vec<RawEntry>, ListingError>
where
    S: UiSurface + ?Sized,
{
    engine_info!("Reading certifications from {}", listing_url);
    surface.navigate(listing_url).await?;
    surface.wait_for_page_ready(waits.page_ready()).await?;
    let height = surface
        .scroll_to_end_of_content(waits.scroll_settle, waits.max_scroll_rounds)
        .await?;
    engine_debug!("Listing fully loaded at height {}", height);
    surface
        .wait_for_element(&selectors.container, waits.element())
        .await?;

    let html = surface.page_html().await?;
    let entries = parse_listing(&html, selectors, Some(listing_url))?;
    engine_info!("Certs found on listing: {}", entries.len());
    Ok(entries)
}
