//! HTTP retry helpers for the remote record source.
//!
//! Page fetches go through [`send_json`] rather than calling
//! `reqwest::RequestBuilder::send()` directly, so every request gets
//! exponential backoff on connection failures, timeouts, rate limiting
//! and server errors.
//!
//! ```ignore
//! let page = retry::send_json(|| client.get(&url).query(&params)).await?;
//! ```

use std::time::Duration;

use crate::RecordsError;

/// Maximum number of retries for transient HTTP failures.
///
/// Backoff doubles from one second (1s, 2s, 4s, 8s), so a request gives up
/// after roughly 15 seconds of waiting.
const MAX_RETRIES: u32 = 4;

/// Maximum number of full re-fetches when the body cannot be decoded.
const MAX_BODY_RETRIES: u32 = 2;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// What to do with a response, based on its status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    /// 2xx/3xx: hand the response to the caller.
    Accept,
    /// 429 or 5xx: try again after a backoff.
    Retry,
    /// Any other 4xx: permanent failure.
    Fail,
}

fn classify_status(status: reqwest::StatusCode) -> StatusAction {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusAction::Retry
    } else if status.is_client_error() {
        StatusAction::Fail
    } else {
        StatusAction::Accept
    }
}

const fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.saturating_sub(1))
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// `build_request` is called once per attempt because request builders
/// are consumed by `send()`.
///
/// # Errors
///
/// Returns [`RecordsError`] if the request still fails after all retries,
/// the server answers with a non-retryable status, or the body is not valid
/// JSON after all body retries.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, RecordsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;

    loop {
        let response = send_inner(&build_request, MAX_RETRIES).await?;
        let url = response.url().to_string();
        let status = response.status();

        let outcome = match response.text().await {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
                log::warn!(
                    "JSON parse failed for {url} (status {status}, {} bytes): {e}\n  \
                     body preview: {preview}",
                    text.len()
                );
                RecordsError::Json(e)
            }),
            Err(e) => {
                log::warn!("Reading response body from {url} failed: {e}");
                Err(RecordsError::Http(e))
            }
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if body_attempt < MAX_BODY_RETRIES => {
                body_attempt += 1;
                let delay = backoff(body_attempt);
                log::warn!(
                    "Body retry {body_attempt}/{MAX_BODY_RETRIES} for {url} in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Sends the request, retrying transient failures with exponential backoff.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, RecordsError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) if is_transient(&e) && attempt < max_retries => {
                log::warn!("  transient error: {e}");
            }
            Err(e) => return Err(RecordsError::Http(e)),
            Ok(response) => {
                let status = response.status();
                match classify_status(status) {
                    StatusAction::Accept => return Ok(response),
                    StatusAction::Retry if attempt < max_retries => {
                        log::warn!("  HTTP {status}");
                    }
                    StatusAction::Retry => {
                        return Err(RecordsError::Source {
                            message: format!("HTTP {status} after {max_retries} retries"),
                        });
                    }
                    StatusAction::Fail => {
                        let body = response.text().await.unwrap_or_default();
                        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
                        return Err(RecordsError::Source {
                            message: format!("HTTP {status}: {preview}"),
                        });
                    }
                }
            }
        }

        attempt += 1;
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
