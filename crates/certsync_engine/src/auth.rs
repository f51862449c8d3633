use std::fmt;

use engine_logging::{engine_debug, engine_info, redact};
use thiserror::Error;

use crate::settings::WaitSettings;
use crate::wait::PollSettings;
use crate::{Element, Locator, TypingMode, UiError, UiSurface};

/// Credentials for one login. `Debug` never prints the secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub password: String,
    pub one_time_code: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("password", &redact(&self.password))
            .field(
                "one_time_code",
                &self.one_time_code.as_deref().map(redact),
            )
            .finish()
    }
}

/// The pages and fields of a credential login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginFlow {
    pub login_url: String,
    /// Fields that each receive the identity followed by Enter, in order.
    pub identity_fields: Vec<Locator>,
    pub password_field: Locator,
    /// Only shown by some sessions; a missing field is not an error.
    pub one_time_code_field: Option<Locator>,
    /// Login is complete once the browser lands on a url with this prefix.
    pub landing_url_prefix: Option<String>,
    pub typing: TypingMode,
}

impl LoginFlow {
    /// Login for the profile the certifications are read from.
    pub fn source_profile() -> Self {
        Self {
            login_url: "https://www.linkedin.com/login/".to_string(),
            identity_fields: vec![Locator::xpath("//*[@id='username'][1]")],
            password_field: Locator::xpath("//*[@id='password'][1]"),
            one_time_code_field: None,
            landing_url_prefix: Some("https://www.linkedin.com/feed/".to_string()),
            typing: TypingMode::Direct,
        }
    }

    /// Single sign-on in front of the claims portal, reached via the form url.
    pub fn claims_portal(form_url: &str) -> Self {
        Self {
            login_url: form_url.to_string(),
            identity_fields: vec![
                Locator::xpath("//input[@type='email'][1]"),
                Locator::xpath("//*[@id='username'][1]"),
            ],
            password_field: Locator::xpath("//*[@id='password'][1]"),
            one_time_code_field: Some(Locator::xpath("//*[@id='security-code'][1]")),
            landing_url_prefix: None,
            typing: TypingMode::Direct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authentication failed at {stage}: {source}")]
    AuthenticationFailed {
        stage: &'static str,
        #[source]
        source: UiError,
    },
    #[error("authentication failed at one-time code: the page asked for a code and none was given")]
    OneTimeCodeRequired,
}

/// Asked for a one-time code once the login page shows the code field.
///
/// Codes expire quickly, so they are requested only at that point unless
/// [`Credentials::one_time_code`] already carries one.
pub trait CodePrompt: Send + Sync {
    fn one_time_code(&self) -> Option<String>;
}

/// A prompt that never has a code.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCodePrompt;

impl CodePrompt for NoCodePrompt {
    fn one_time_code(&self) -> Option<String> {
        None
    }
}

impl<F> CodePrompt for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn one_time_code(&self) -> Option<String> {
        self()
    }
}

fn failed(stage: &'static str) -> impl FnOnce(UiError) -> AuthError {
    move |source| AuthError::AuthenticationFailed { stage, source }
}

/// Runs the login flow on `surface`, leaving it on the post-login page.
///
/// When the one-time code field shows up and `credentials` has no code,
/// `prompt` is asked for one; without a code the login fails.
pub async fn authenticate<S>(
    surface: &S,
    flow: &LoginFlow,
    credentials: &Credentials,
    prompt: &dyn CodePrompt,
    waits: &WaitSettings,
) -> Result<(), AuthError>
where
    S: UiSurface + ?Sized,
{
    engine_info!(
        "Logging in as {} at {}",
        credentials.identity,
        flow.login_url
    );
    surface
        .navigate(&flow.login_url)
        .await
        .map_err(failed("login page"))?;
    surface
        .wait_for_page_ready(waits.page_ready())
        .await
        .map_err(failed("login page"))?;

    for locator in &flow.identity_fields {
        engine_debug!("Entering identity into {}", locator);
        submit_field(surface, locator, &credentials.identity, flow.typing, waits.element())
            .await
            .map_err(failed("identity"))?;
    }

    engine_debug!(
        "Entering password {} into {}",
        redact(&credentials.password),
        flow.password_field
    );
    submit_field(
        surface,
        &flow.password_field,
        &credentials.password,
        flow.typing,
        waits.element(),
    )
    .await
    .map_err(failed("password"))?;

    if let Some(locator) = &flow.one_time_code_field {
        match surface.wait_for_element(locator, waits.one_time_code()).await {
            Ok(field) => {
                let code = non_blank(credentials.one_time_code.clone())
                    .or_else(|| non_blank(prompt.one_time_code()))
                    .ok_or(AuthError::OneTimeCodeRequired)?;
                engine_debug!("Entering one-time code {} into {}", redact(&code), locator);
                enter_text(surface, &field, &code, flow.typing)
                    .await
                    .map_err(failed("one-time code"))?;
            }
            Err(UiError::Timeout { .. }) => {
                engine_info!("One-time code field did not appear; skipping that step");
            }
            Err(err) => return Err(failed("one-time code")(err)),
        }
    }

    if let Some(prefix) = &flow.landing_url_prefix {
        let landed = surface
            .wait_for_url_prefix(prefix, waits.login_landing())
            .await
            .map_err(failed("landing page"))?;
        engine_info!("Login reached {}", landed);
    }
    surface
        .wait_for_page_ready(waits.page_ready())
        .await
        .map_err(failed("landing page"))?;

    Ok(())
}

async fn submit_field<S>(
    surface: &S,
    locator: &Locator,
    text: &str,
    typing: TypingMode,
    poll: PollSettings,
) -> Result<(), UiError>
where
    S: UiSurface + ?Sized,
{
    let element = surface.wait_for_element(locator, poll).await?;
    enter_text(surface, &element, text, typing).await
}

async fn enter_text<S>(
    surface: &S,
    element: &Element,
    text: &str,
    typing: TypingMode,
) -> Result<(), UiError>
where
    S: UiSurface + ?Sized,
{
    surface.fill_field(element, text, typing).await?;
    surface.press_enter(element).await
}

fn non_blank(code: Option<String>) -> Option<String> {
    code.map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty())
}
