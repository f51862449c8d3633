use std::future::Future;
use std::time::Duration;

use engine_logging::engine_debug;
use tokio::time::{sleep, Instant};

use crate::UiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollSettings {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Calls `probe` until it yields a value or `settings.timeout` elapses.
///
/// The probe always runs at least once and once more at the deadline.
/// Probe errors are returned immediately; running out of time is
/// [`UiError::Timeout`] naming `what`.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    settings: PollSettings,
    mut probe: F,
) -> Result<T, UiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, UiError>>,
{
    let started = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            return Ok(value);
        }

        let elapsed = started.elapsed();
        if elapsed >= settings.timeout {
            engine_debug!(
                "Gave up waiting for {} after {} attempt(s) in {:?}",
                what,
                attempts,
                elapsed
            );
            return Err(UiError::Timeout {
                what: what.to_string(),
                after: settings.timeout,
            });
        }
        sleep(settings.interval.min(settings.timeout - elapsed)).await;
    }
}
