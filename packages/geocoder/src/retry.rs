//! Bounded retry for transient HTTP failures.
//!
//! A single logical geocoding call sends at most `1 + max_retries`
//! requests. Only failures that are likely to go away on their own are
//! retried: timeouts, connection errors, HTTP 429, and HTTP 5xx. Anything
//! else (4xx, undecodable body) fails immediately.
//!
//! With `max_retries = 0` this is a plain send-and-decode; queries that
//! fail are retried by the next batch run instead.

use std::time::Duration;

use crate::GeocodeError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends the request built by `build_request` and parses the body as JSON.
///
/// The closure is called once per attempt since a
/// [`reqwest::RequestBuilder`] is consumed by `.send()`. Attempt `n`
/// (1-based) waits `backoff * 2^(n-1)` before it is sent.
///
/// # Errors
///
/// Returns [`GeocodeError`] if every attempt fails, the server returns a
/// non-retryable status, or the body is not valid JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    build_request: F,
    max_retries: u32,
    backoff: Duration,
) -> Result<serde_json::Value, GeocodeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries, backoff).await?;
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        let preview = if text.len() > BODY_PREVIEW_LEN {
            let mut end = BODY_PREVIEW_LEN;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &text[..end])
        } else {
            text.clone()
        };
        log::debug!(
            "JSON parse failed\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             body preview: {preview}",
            text.len(),
        );
        GeocodeError::Parse {
            message: format!("invalid JSON (status={status}): {e}"),
        }
    })
}

#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
    backoff: Duration,
) -> Result<reqwest::Response, GeocodeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff * 2u32.saturating_pow(attempt - 1);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let retries_left = attempt < max_retries;
        attempt += 1;

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && retries_left {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(GeocodeError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    if retries_left {
                        log::warn!("  HTTP 429 (rate limited)");
                        continue;
                    }
                    return Err(GeocodeError::RateLimited);
                }

                if status.is_server_error() {
                    if retries_left {
                        log::warn!("  HTTP {status} (server error)");
                        continue;
                    }
                    return Err(GeocodeError::Status {
                        status: status.to_string(),
                        message: format!("server error after {max_retries} retries"),
                    });
                }

                if status.is_client_error() {
                    return Err(GeocodeError::Status {
                        status: status.to_string(),
                        message: "client error".to_string(),
                    });
                }

                return Ok(response);
            }
        }
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
