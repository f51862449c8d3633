//! The browser capability the pipeline drives.
//!
//! Implementors provide the primitive operations; the waiting helpers are
//! provided on top of [`poll_until`] so every long wait is bounded the same
//! way regardless of the backend.

use std::time::Duration;

use engine_logging::engine_debug;

use crate::wait::{poll_until, PollSettings};
use crate::{Element, Locator, TypingMode, UiError};

#[async_trait::async_trait]
pub trait UiSurface: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), UiError>;

    async fn current_url(&self) -> Result<String, UiError>;

    /// Looks the element up once; `Ok(None)` when it is not on the page.
    async fn find_element(&self, locator: &Locator) -> Result<Option<Element>, UiError>;

    async fn click_element(&self, element: &Element) -> Result<(), UiError>;

    async fn clear_field(&self, element: &Element) -> Result<(), UiError>;

    async fn fill_field(
        &self,
        element: &Element,
        text: &str,
        mode: TypingMode,
    ) -> Result<(), UiError>;

    async fn press_enter(&self, element: &Element) -> Result<(), UiError>;

    async fn read_text(&self, element: &Element) -> Result<String, UiError>;

    /// True once the document has finished loading.
    async fn document_ready(&self) -> Result<bool, UiError>;

    async fn content_height(&self) -> Result<u64, UiError>;

    async fn scroll_to_bottom(&self) -> Result<(), UiError>;

    async fn page_html(&self) -> Result<String, UiError>;

    async fn wait_for_element(
        &self,
        locator: &Locator,
        poll: PollSettings,
    ) -> Result<Element, UiError> {
        let what = locator.to_string();
        poll_until(&what, poll, move || self.find_element(locator)).await
    }

    async fn wait_for_page_ready(&self, poll: PollSettings) -> Result<(), UiError> {
        poll_until("page ready", poll, move || async move {
            Ok::<_, UiError>(self.document_ready().await?.then_some(()))
        })
        .await
    }

    /// Waits until the current url starts with `prefix` and returns it.
    async fn wait_for_url_prefix(
        &self,
        prefix: &str,
        poll: PollSettings,
    ) -> Result<String, UiError> {
        let what = format!("url starting with {prefix}");
        poll_until(&what, poll, move || async move {
            let url = self.current_url().await?;
            Ok::<_, UiError>(url.starts_with(prefix).then_some(url))
        })
        .await
    }

    /// Scrolls until two consecutive height measurements agree.
    ///
    /// Lazily loaded listings grow as they are scrolled; `settle` is the
    /// pause for new content after each scroll. Fails with a timeout after
    /// `max_rounds` scrolls without the height settling.
    async fn scroll_to_end_of_content(
        &self,
        settle: Duration,
        max_rounds: u32,
    ) -> Result<u64, UiError> {
        let mut last_height = self.content_height().await?;
        for round in 1..=max_rounds {
            self.scroll_to_bottom().await?;
            tokio::time::sleep(settle).await;
            let height = self.content_height().await?;
            engine_debug!("Scroll round {}: height {} -> {}", round, last_height, height);
            if height == last_height {
                return Ok(height);
            }
            last_height = height;
        }
        Err(UiError::Timeout {
            what: "listing height to settle".to_string(),
            after: settle * max_rounds,
        })
    }
}
