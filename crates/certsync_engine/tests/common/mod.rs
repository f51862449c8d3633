#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use certsync_engine::{
    ClaimFormSettings, Element, Locator, MigrationSettings, TypingMode, UiError, UiSurface,
    WaitSettings,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

/// Short bounds so timeout paths finish quickly.
pub fn fast_waits() -> WaitSettings {
    WaitSettings {
        element_timeout: Duration::from_millis(60),
        page_ready_timeout: Duration::from_millis(60),
        poll_interval: Duration::from_millis(5),
        scroll_settle: Duration::from_millis(1),
        max_scroll_rounds: 5,
        one_time_code_timeout: Duration::from_millis(30),
        login_landing_timeout: Duration::from_millis(60),
    }
}

pub fn fast_settings() -> MigrationSettings {
    MigrationSettings {
        waits: fast_waits(),
        ..MigrationSettings::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    Click(String),
    Clear(String),
    Fill(String, String),
    Enter(String),
    Read(String),
    Scroll,
}

#[derive(Default)]
struct Script {
    calls: Vec<Call>,
    url: String,
    absent: HashSet<Locator>,
    texts: HashMap<Locator, String>,
    banners: VecDeque<String>,
    heights: VecDeque<u64>,
    last_height: u64,
    html: String,
    not_in_catalog: HashSet<String>,
    last_search: Option<String>,
    url_after_enter: Option<String>,
    unavailable: bool,
    lost_on_navigate: bool,
    searching_lookups: u32,
}

/// In-memory page that answers like the claim form and records every call.
///
/// Elements are present unless marked absent; an element's id is its
/// locator's text, so calls can be asserted by locator.
#[derive(Clone)]
pub struct ScriptedSurface {
    form: ClaimFormSettings,
    script: Arc<Mutex<Script>>,
}

impl ScriptedSurface {
    pub fn new(form: &ClaimFormSettings) -> Self {
        Self {
            form: form.clone(),
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    pub fn at_url(self, url: &str) -> Self {
        self.script.lock().unwrap().url = url.to_string();
        self
    }

    pub fn without(self, locator: &Locator) -> Self {
        self.script.lock().unwrap().absent.insert(locator.clone());
        self
    }

    pub fn with_text(self, locator: &Locator, text: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .texts
            .insert(locator.clone(), text.to_string());
        self
    }

    pub fn missing_from_catalog(self, name: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .not_in_catalog
            .insert(name.to_string());
        self
    }

    pub fn with_banners(self, banners: &[&str]) -> Self {
        self.script
            .lock()
            .unwrap()
            .banners
            .extend(banners.iter().map(|b| b.to_string()));
        self
    }

    pub fn with_heights(self, heights: &[u64]) -> Self {
        self.script.lock().unwrap().heights.extend(heights);
        self
    }

    pub fn with_html(self, html: &str) -> Self {
        self.script.lock().unwrap().html = html.to_string();
        self
    }

    pub fn landing_after_enter(self, url: &str) -> Self {
        self.script.lock().unwrap().url_after_enter = Some(url.to_string());
        self
    }

    pub fn unavailable(self) -> Self {
        self.script.lock().unwrap().unavailable = true;
        self
    }

    /// The browser goes away on the next navigation and stays gone.
    pub fn lost_on_navigate(self) -> Self {
        self.script.lock().unwrap().lost_on_navigate = true;
        self
    }

    /// The catalog shows only its loading message for the next `lookups`
    /// verdict lookups after a search.
    pub fn still_searching(self, lookups: u32) -> Self {
        self.script.lock().unwrap().searching_lookups = lookups;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    fn push(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }

    fn check_available(&self) -> Result<(), UiError> {
        if self.script.lock().unwrap().unavailable {
            return Err(UiError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UiSurface for ScriptedSurface {
    async fn navigate(&self, url: &str) -> Result<(), UiError> {
        self.check_available()?;
        self.push(Call::Navigate(url.to_string()));
        let mut script = self.script.lock().unwrap();
        if script.lost_on_navigate {
            script.unavailable = true;
            return Err(UiError::Unavailable("connection refused".into()));
        }
        script.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, UiError> {
        self.check_available()?;
        Ok(self.script.lock().unwrap().url.clone())
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<Element>, UiError> {
        self.check_available()?;
        let mut script = self.script.lock().unwrap();
        if script.absent.contains(locator) {
            return Ok(None);
        }
        let verdict = *locator == self.form.no_match_alert || *locator == self.form.catalog_option;
        if verdict && script.last_search.is_some() && script.searching_lookups > 0 {
            script.searching_lookups -= 1;
            return Ok(None);
        }
        let missing = script
            .last_search
            .as_ref()
            .map(|name| script.not_in_catalog.contains(name));
        let present = if *locator == self.form.no_match_alert {
            missing == Some(true)
        } else if *locator == self.form.catalog_option {
            missing == Some(false)
        } else {
            true
        };
        Ok(present.then(|| Element::new(locator.to_string())))
    }

    async fn click_element(&self, element: &Element) -> Result<(), UiError> {
        self.push(Call::Click(element.id().to_string()));
        Ok(())
    }

    async fn clear_field(&self, element: &Element) -> Result<(), UiError> {
        self.push(Call::Clear(element.id().to_string()));
        Ok(())
    }

    async fn fill_field(
        &self,
        element: &Element,
        text: &str,
        _mode: TypingMode,
    ) -> Result<(), UiError> {
        self.push(Call::Fill(element.id().to_string(), text.to_string()));
        if element.id() == self.form.certificate_search.to_string() {
            self.script.lock().unwrap().last_search = Some(text.to_string());
        }
        Ok(())
    }

    async fn press_enter(&self, element: &Element) -> Result<(), UiError> {
        self.push(Call::Enter(element.id().to_string()));
        let mut script = self.script.lock().unwrap();
        if let Some(url) = script.url_after_enter.clone() {
            script.url = url;
        }
        Ok(())
    }

    async fn read_text(&self, element: &Element) -> Result<String, UiError> {
        self.push(Call::Read(element.id().to_string()));
        let mut script = self.script.lock().unwrap();
        if element.id() == self.form.result_banner.to_string() {
            return Ok(script
                .banners
                .pop_front()
                .unwrap_or_else(|| "Certificate claim has been added.".to_string()));
        }
        Ok(script
            .texts
            .iter()
            .find(|(locator, _)| locator.to_string() == element.id())
            .map(|(_, text)| text.clone())
            .unwrap_or_default())
    }

    async fn document_ready(&self) -> Result<bool, UiError> {
        self.check_available()?;
        Ok(true)
    }

    async fn content_height(&self) -> Result<u64, UiError> {
        let mut script = self.script.lock().unwrap();
        if let Some(height) = script.heights.pop_front() {
            script.last_height = height;
        }
        Ok(script.last_height)
    }

    async fn scroll_to_bottom(&self) -> Result<(), UiError> {
        self.push(Call::Scroll);
        Ok(())
    }

    async fn page_html(&self) -> Result<String, UiError> {
        Ok(self.script.lock().unwrap().html.clone())
    }
}
