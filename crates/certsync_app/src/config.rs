//! Optional RON settings file.
//!
//! Every field may be omitted; omitted fields keep the engine defaults.
//! Durations are whole milliseconds.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use certsync_engine::{LoginFlow, MigrationSettings, TypingMode};
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub webdriver_endpoint: String,
    pub browser_name: String,
    pub browser_args: Vec<String>,
    pub request_timeout_ms: u64,
    pub element_timeout_ms: u64,
    pub page_ready_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub scroll_settle_ms: u64,
    pub max_scroll_rounds: u32,
    pub one_time_code_timeout_ms: u64,
    pub login_landing_timeout_ms: u64,
    pub form_url: String,
    pub listing_url_template: String,
    pub success_markers: Vec<String>,
    /// Type catalog searches one key at a time.
    pub humanlike_search: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let defaults = MigrationSettings::default();
        let waits = defaults.waits;
        Self {
            webdriver_endpoint: defaults.webdriver.endpoint,
            browser_name: defaults.webdriver.browser_name,
            browser_args: defaults.webdriver.browser_args,
            request_timeout_ms: millis(defaults.webdriver.request_timeout),
            element_timeout_ms: millis(waits.element_timeout),
            page_ready_timeout_ms: millis(waits.page_ready_timeout),
            poll_interval_ms: millis(waits.poll_interval),
            scroll_settle_ms: millis(waits.scroll_settle),
            max_scroll_rounds: waits.max_scroll_rounds,
            one_time_code_timeout_ms: millis(waits.one_time_code_timeout),
            login_landing_timeout_ms: millis(waits.login_landing_timeout),
            form_url: defaults.form.form_url,
            listing_url_template: defaults.listing.url_template,
            success_markers: defaults.success_markers,
            humanlike_search: defaults.form.search_typing == TypingMode::Humanlike,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl AppConfig {
    pub fn into_settings(self) -> MigrationSettings {
        let mut settings = MigrationSettings::default();

        settings.webdriver.endpoint = self.webdriver_endpoint;
        settings.webdriver.browser_name = self.browser_name;
        settings.webdriver.browser_args = self.browser_args;
        settings.webdriver.request_timeout = Duration::from_millis(self.request_timeout_ms);

        let waits = &mut settings.waits;
        waits.element_timeout = Duration::from_millis(self.element_timeout_ms);
        waits.page_ready_timeout = Duration::from_millis(self.page_ready_timeout_ms);
        waits.poll_interval = Duration::from_millis(self.poll_interval_ms);
        waits.scroll_settle = Duration::from_millis(self.scroll_settle_ms);
        waits.max_scroll_rounds = self.max_scroll_rounds;
        waits.one_time_code_timeout = Duration::from_millis(self.one_time_code_timeout_ms);
        waits.login_landing_timeout = Duration::from_millis(self.login_landing_timeout_ms);

        // The portal login is reached through the form, so both move together.
        settings.target_login = LoginFlow::claims_portal(&self.form_url);
        settings.form.form_url = self.form_url;
        settings.form.search_typing = if self.humanlike_search {
            TypingMode::Humanlike
        } else {
            TypingMode::Direct
        };
        settings.listing.url_template = self.listing_url_template;
        settings.success_markers = self.success_markers;
        settings
    }
}

/// Reads settings from `path`, or returns the defaults when no path is given
/// or the file does not exist.
pub fn load_settings(path: Option<&Path>) -> Result<MigrationSettings> {
    let Some(path) = path else {
        return Ok(MigrationSettings::default());
    };

    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            engine_info!("No settings file at {:?}; using defaults", path);
            return Ok(MigrationSettings::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("reading settings from {}", path.display()))
        }
    };

    let config: AppConfig = ron::from_str(&content)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    engine_info!("Loaded settings from {:?}", path);
    Ok(config.into_settings())
}
