//! [`UiSurface`] over the W3C WebDriver HTTP protocol (chromedriver,
//! geckodriver, a Selenium grid).

use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use rand::Rng;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::settings::WebDriverSettings;
use crate::{Element, Locator, TypingMode, UiError, UiSurface};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const ENTER_KEY: &str = "\u{E007}";
const NO_SUCH_ELEMENT: &str = "no such element";
const STALE_ELEMENT: &str = "stale element reference";

/// Pause range between keystrokes in [`TypingMode::Humanlike`].
const KEYSTROKE_DELAY_MS: std::ops::RangeInclusive<u64> = 100..=300;

enum CommandError {
    Wire { code: String, message: String },
    Ui(UiError),
}

impl From<CommandError> for UiError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Wire { code, .. } if code == STALE_ELEMENT => UiError::StaleElement,
            CommandError::Wire { code, message } => {
                UiError::Protocol(format!("{code}: {message}"))
            }
            CommandError::Ui(err) => err,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebDriverSurface {
    client: reqwest::Client,
    endpoint: Url,
    session_id: String,
}

impl WebDriverSurface {
    /// Opens a new browser session on the WebDriver endpoint.
    pub async fn start(settings: &WebDriverSettings) -> Result<Self, UiError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| UiError::Unavailable(err.to_string()))?;
        let endpoint = endpoint_url(&settings.endpoint)?;

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": settings.browser_name,
                    "goog:chromeOptions": {
                        "args": settings.browser_args,
                        "excludeSwitches": ["enable-logging", "enable-devtools"],
                        "prefs": {
                            "webrtc.ip_handling_policy": "disable_non_proxied_udp"
                        }
                    }
                }
            }
        });

        let session_url = join(&endpoint, "session")?;
        let value = send(&client, Method::POST, session_url, Some(capabilities))
            .await
            .map_err(UiError::from)?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| UiError::Protocol("new session response has no sessionId".into()))?
            .to_string();

        engine_info!("Started WebDriver session {} at {}", session_id, endpoint);
        Ok(Self {
            client,
            endpoint,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Ends the browser session.
    pub async fn close(self) -> Result<(), UiError> {
        self.command(Method::DELETE, "", None).await?;
        engine_info!("Closed WebDriver session {}", self.session_id);
        Ok(())
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, CommandError> {
        let path = if path.is_empty() {
            format!("session/{}", self.session_id)
        } else {
            format!("session/{}/{}", self.session_id, path)
        };
        let url = join(&self.endpoint, &path).map_err(CommandError::Ui)?;
        send(&self.client, method, url, body).await
    }

    async fn element_command(
        &self,
        method: Method,
        element: &Element,
        action: &str,
        body: Option<Value>,
    ) -> Result<Value, UiError> {
        let path = format!("element/{}/{}", element.id(), action);
        Ok(self.command(method, &path, body).await?)
    }

    async fn execute(&self, script: &str) -> Result<Value, UiError> {
        let body = json!({ "script": script, "args": [] });
        Ok(self
            .command(Method::POST, "execute/sync", Some(body))
            .await?)
    }

    async fn send_keys(&self, element: &Element, text: &str) -> Result<(), UiError> {
        self.element_command(Method::POST, element, "value", Some(json!({ "text": text })))
            .await?;
        Ok(())
    }
}

fn endpoint_url(raw: &str) -> Result<Url, UiError> {
    let mut url = Url::parse(raw)
        .map_err(|err| UiError::Unavailable(format!("invalid endpoint {raw}: {err}")))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, UiError> {
    base.join(path)
        .map_err(|err| UiError::Protocol(format!("bad command path {path}: {err}")))
}

async fn send(
    client: &reqwest::Client,
    method: Method,
    url: Url,
    body: Option<Value>,
) -> Result<Value, CommandError> {
    engine_debug!("WebDriver {} {}", method, url);
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
    }

    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let text = response.text().await.map_err(map_reqwest_error)?;
    let payload: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|err| {
            CommandError::Ui(UiError::Protocol(format!("invalid response body: {err}")))
        })?
    };
    let value = payload.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }
    let code = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_else(|| status.as_str())
        .to_string();
    Err(CommandError::Wire { code, message })
}

fn map_reqwest_error(err: reqwest::Error) -> CommandError {
    CommandError::Ui(UiError::Unavailable(err.to_string()))
}

fn locator_body(locator: &Locator) -> Value {
    match locator {
        Locator::XPath(expr) => json!({ "using": "xpath", "value": expr }),
        Locator::Css(selector) => json!({ "using": "css selector", "value": selector }),
    }
}

fn keystroke_delay() -> Duration {
    Duration::from_millis(rand::rng().random_range(KEYSTROKE_DELAY_MS))
}

fn value_as_string(value: Value, what: &str) -> Result<String, UiError> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(UiError::Protocol(format!("expected {what} string, got {other}"))),
    }
}

#[async_trait::async_trait]
impl UiSurface for WebDriverSurface {
    async fn navigate(&self, url: &str) -> Result<(), UiError> {
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, UiError> {
        let value = self.command(Method::GET, "url", None).await?;
        value_as_string(value, "url")
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<Element>, UiError> {
        match self
            .command(Method::POST, "element", Some(locator_body(locator)))
            .await
        {
            Ok(value) => value
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| Some(Element::new(id)))
                .ok_or_else(|| UiError::Protocol(format!("no element reference in {value}"))),
            Err(CommandError::Wire { code, .. }) if code == NO_SUCH_ELEMENT => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn click_element(&self, element: &Element) -> Result<(), UiError> {
        self.element_command(Method::POST, element, "click", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn clear_field(&self, element: &Element) -> Result<(), UiError> {
        self.element_command(Method::POST, element, "clear", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn fill_field(
        &self,
        element: &Element,
        text: &str,
        mode: TypingMode,
    ) -> Result<(), UiError> {
        match mode {
            TypingMode::Direct => self.send_keys(element, text).await,
            TypingMode::Humanlike => {
                let mut buf = [0u8; 4];
                for ch in text.chars() {
                    self.send_keys(element, ch.encode_utf8(&mut buf)).await?;
                    tokio::time::sleep(keystroke_delay()).await;
                }
                Ok(())
            }
        }
    }

    async fn press_enter(&self, element: &Element) -> Result<(), UiError> {
        self.send_keys(element, ENTER_KEY).await
    }

    async fn read_text(&self, element: &Element) -> Result<String, UiError> {
        let value = self
            .element_command(Method::GET, element, "text", None)
            .await?;
        value_as_string(value, "element text")
    }

    async fn document_ready(&self) -> Result<bool, UiError> {
        let state = self.execute("return document.readyState").await?;
        Ok(state.as_str() == Some("complete"))
    }

    async fn content_height(&self) -> Result<u64, UiError> {
        let height = self.execute("return document.body.scrollHeight").await?;
        height
            .as_u64()
            .or_else(|| height.as_f64().map(|h| h.max(0.0) as u64))
            .ok_or_else(|| UiError::Protocol(format!("scroll height is not a number: {height}")))
    }

    async fn scroll_to_bottom(&self) -> Result<(), UiError> {
        self.execute("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    async fn page_html(&self) -> Result<String, UiError> {
        let value = self.command(Method::GET, "source", None).await?;
        value_as_string(value, "page source")
    }
}
