use std::time::Duration;

use certsync_core::DEFAULT_SUCCESS_MARKERS;

use crate::auth::LoginFlow;
use crate::wait::PollSettings;
use crate::{Locator, TypingMode};

/// Bounds for every blocking wait the engine performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSettings {
    pub element_timeout: Duration,
    pub page_ready_timeout: Duration,
    pub poll_interval: Duration,
    pub scroll_settle: Duration,
    pub max_scroll_rounds: u32,
    pub one_time_code_timeout: Duration,
    pub login_landing_timeout: Duration,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_secs(7),
            page_ready_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(250),
            scroll_settle: Duration::from_secs(2),
            max_scroll_rounds: 50,
            one_time_code_timeout: Duration::from_secs(7),
            login_landing_timeout: Duration::from_secs(60),
        }
    }
}

impl WaitSettings {
    pub fn element(&self) -> PollSettings {
        PollSettings::new(self.element_timeout, self.poll_interval)
    }

    pub fn page_ready(&self) -> PollSettings {
        PollSettings::new(self.page_ready_timeout, self.poll_interval)
    }

    pub fn one_time_code(&self) -> PollSettings {
        PollSettings::new(self.one_time_code_timeout, self.poll_interval)
    }

    pub fn login_landing(&self) -> PollSettings {
        PollSettings::new(self.login_landing_timeout, self.poll_interval)
    }
}

/// Where the claim form lives and how its controls are found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimFormSettings {
    pub form_url: String,
    pub certificate_picker: Locator,
    pub certificate_search: Locator,
    pub search_typing: TypingMode,
    pub no_match_alert: Locator,
    pub catalog_option: Locator,
    pub issue_date: Locator,
    pub expiry_date: Locator,
    pub no_expiry_checkbox: Locator,
    pub url_field: Locator,
    pub result_banner: Locator,
}

impl Default for ClaimFormSettings {
    fn default() -> Self {
        Self {
            form_url: "https://www.bscemployee.com/certificates/add-certificate-claim/"
                .to_string(),
            certificate_picker: Locator::xpath(
                r#"//span[@id="select2-certificate-id-container"]"#,
            ),
            certificate_search: Locator::xpath("//input[@class='select2-search__field'][1]"),
            search_typing: TypingMode::Direct,
            // The "Searching…" placeholder of an AJAX catalog is neither a
            // verdict nor an option.
            no_match_alert: Locator::xpath(concat!(
                "//span[@class='select2-results']//li[@role='alert'",
                " and contains(@class, 'select2-results__message')",
                " and not(contains(@class, 'loading-results'))",
                " and not(contains(@class, 'select2-results__option--loading'))]",
            )),
            catalog_option: Locator::xpath(concat!(
                "//span[@class='select2-results']",
                "//li[contains(@class, 'select2-results__option--highlighted')",
                " and not(contains(@class, 'loading-results'))",
                " and not(contains(@class, 'select2-results__option--loading'))]",
            )),
            issue_date: Locator::xpath("//input[@name='issue_date']"),
            expiry_date: Locator::xpath("//input[@type='date' and @name='expiry_date']"),
            no_expiry_checkbox: Locator::xpath(r#"//input[@type="checkbox"][1]"#),
            url_field: Locator::xpath(r#"//input[@type="url"][1]"#),
            result_banner: Locator::xpath("//div[@role='alert'][1]"),
        }
    }
}

/// CSS selectors for scraping the certification listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSelectors {
    /// Waited for before the page html is read.
    pub container: Locator,
    pub item: String,
    pub title: String,
    pub link: String,
    /// Text the issue/expiry line starts with.
    pub date_prefix: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: Locator::xpath(
                "//div[contains(@class, 'scaffold-finite-scroll__content')]",
            ),
            item: "div.scaffold-finite-scroll__content > ul > li".to_string(),
            title: "span".to_string(),
            link: ".pv-action__padding a".to_string(),
            date_prefix: "Issued".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSettings {
    /// Listing page url; `{handle}` is replaced by the profile handle.
    pub url_template: String,
    pub selectors: ListingSelectors,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            url_template: "https://www.linkedin.com/in/{handle}/details/certifications/"
                .to_string(),
            selectors: ListingSelectors::default(),
        }
    }
}

impl ListingSettings {
    pub fn url_for(&self, handle: &str) -> String {
        self.url_template.replace("{handle}", handle.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDriverSettings {
    pub endpoint: String,
    pub browser_name: String,
    pub browser_args: Vec<String>,
    pub request_timeout: Duration,
}

impl Default for WebDriverSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9515".to_string(),
            browser_name: "chrome".to_string(),
            browser_args: [
                "--start-maximized",
                "--incognito",
                "--disable-webrtc",
                "--disable-logging",
                "--disable-dev-shm-usage",
                "--disable-extensions",
            ]
            .iter()
            .map(|arg| arg.to_string())
            .collect(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Everything a migration run needs apart from credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationSettings {
    pub waits: WaitSettings,
    pub form: ClaimFormSettings,
    pub listing: ListingSettings,
    pub webdriver: WebDriverSettings,
    pub source_login: LoginFlow,
    pub target_login: LoginFlow,
    pub success_markers: Vec<String>,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        let form = ClaimFormSettings::default();
        let target_login = LoginFlow::claims_portal(&form.form_url);
        Self {
            waits: WaitSettings::default(),
            form,
            listing: ListingSettings::default(),
            webdriver: WebDriverSettings::default(),
            source_login: LoginFlow::source_profile(),
            target_login,
            success_markers: DEFAULT_SUCCESS_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}
