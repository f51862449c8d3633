//! Certsync engine: UI Surface driving for listing extraction, login and claim replication.
mod auth;
mod listing;
mod replicator;
mod settings;
mod surface;
mod types;
mod wait;
mod webdriver;

pub use auth::{authenticate, AuthError, CodePrompt, Credentials, LoginFlow, NoCodePrompt};
pub use listing::{collect_listing, parse_listing, ListingError};
pub use replicator::{replicate_batch, BatchError, Replicator};
pub use settings::{
    ClaimFormSettings, ListingSelectors, ListingSettings, MigrationSettings, WaitSettings,
    WebDriverSettings,
};
pub use surface::UiSurface;
pub use types::{Element, Locator, TypingMode, UiError};
pub use wait::{poll_until, PollSettings};
pub use webdriver::WebDriverSurface;
