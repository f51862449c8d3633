use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use certsync_engine::{poll_until, PollSettings, UiError};
use pretty_assertions::assert_eq;

fn settings(timeout_ms: u64) -> PollSettings {
    PollSettings::new(Duration::from_millis(timeout_ms), Duration::from_millis(5))
}

#[tokio::test]
async fn returns_as_soon_as_the_probe_yields() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let value = poll_until("third call", settings(1_000), move || async move {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok::<_, UiError>((n == 3).then_some(n))
    })
    .await
    .unwrap();
    assert_eq!(value, 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn zero_timeout_still_probes_once() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let err = poll_until("nothing", settings(0), move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<Option<()>, UiError>(None)
    })
    .await
    .unwrap_err();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        err,
        UiError::Timeout {
            what: "nothing".to_string(),
            after: Duration::ZERO
        }
    );
}

#[tokio::test]
async fn probe_errors_end_the_wait_immediately() {
    let calls = AtomicU32::new(0);
    let counter = &calls;
    let err = poll_until("broken", settings(1_000), move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<Option<()>, _>(UiError::StaleElement)
    })
    .await
    .unwrap_err();
    assert_eq!(err, UiError::StaleElement);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
