use std::{
    env,
    future::Future,
    sync::OnceLock,
    time::{Duration, Instant},
};

use tracing::Instrument;

const DEBUG_DELAY_ENV: &str = "DYNAFORM_DEBUG_HTTP_DELAY_MS";

/// Runs a request inside `span`, logging how long it took.
///
/// Setting `DYNAFORM_DEBUG_HTTP_DELAY_MS` delays every request, which makes the
/// in-flight states of the UI observable against a fast local server.
pub async fn send_http_request<F, Fut, T, E>(span: tracing::Span, send: F) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    async move {
        debug_http_delay().await;
        let started = Instant::now();
        let result = send().await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => tracing::debug!(elapsed_ms, "Request finished"),
            Err(err) => tracing::debug!(elapsed_ms, error = %err, "Request failed"),
        }
        result
    }
    .instrument(span)
    .await
}

async fn debug_http_delay() {
    if let Some(delay) = debug_http_delay_duration() {
        tracing::trace!(delay_ms = delay.as_millis(), "Applying debug HTTP delay");
        tokio::time::sleep(delay).await;
    }
}

fn debug_http_delay_duration() -> Option<Duration> {
    static DELAY: OnceLock<Option<Duration>> = OnceLock::new();
    *DELAY.get_or_init(|| {
        let Ok(raw) = env::var(DEBUG_DELAY_ENV) else {
            return None;
        };
        parse_delay(&raw)
    })
}

fn parse_delay(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(0) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(env = DEBUG_DELAY_ENV, value = %raw, "Invalid HTTP debug delay");
            None
        }
    }
}
