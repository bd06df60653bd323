//! HTTP client wrapper for the catalogue and thesaurus downloads.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::HTTP_TIMEOUT_SECS;
use crate::error::{MetadataError, Result};

/// User agent string identifying this tool.
const USER_AGENT: &str = concat!("metadata-tool/", env!("CARGO_PKG_VERSION"));

/// Number of requests made before a download is given up.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the second attempt; doubled for each later one.
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Create a configured HTTP client.
///
/// The timeout applies per request, so a download that keeps timing out
/// can take `MAX_ATTEMPTS * HTTP_TIMEOUT_SECS` plus the backoff (about 61.5 s).
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Delay before attempt `attempt` (zero-based); the first attempt is immediate.
fn backoff(attempt: u32) -> Duration {
    match attempt {
        0 => Duration::ZERO,
        n => RETRY_BASE_DELAY * (1 << (n - 1)),
    }
}

/// Why one request failed, and whether asking again could help.
enum Failure {
    Transient(String),
    Fatal(MetadataError),
}

fn attempt_once(client: &Client, url: &str) -> std::result::Result<Vec<u8>, Failure> {
    let response = client.get(url).send().map_err(|e| {
        if e.is_connect() || e.is_timeout() {
            Failure::Transient(e.to_string())
        } else {
            Failure::Fatal(MetadataError::Http(e))
        }
    })?;

    let status = response.status();
    if status.is_server_error() {
        return Err(Failure::Transient(format!("server error: {status}")));
    }
    // Catalogues answer 4xx for bad constraints; repeating the query won't change that.
    let response = response
        .error_for_status()
        .map_err(|e| Failure::Fatal(MetadataError::Http(e)))?;
    let bytes = response
        .bytes()
        .map_err(|e| Failure::Fatal(MetadataError::Http(e)))?;
    Ok(bytes.to_vec())
}

/// Fetch `url`, retrying connect errors, timeouts and 5xx responses.
///
/// Gives up with `RetriesExhausted` after `MAX_ATTEMPTS` transient failures.
/// Any other failure is returned at once.
pub fn download_bytes(client: &Client, url: &str) -> Result<Vec<u8>> {
    let mut last_failure = String::new();

    for attempt in 0..MAX_ATTEMPTS {
        let delay = backoff(attempt);
        if !delay.is_zero() {
            tracing::debug!(url, attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "Backing off");
            thread::sleep(delay);
        }

        match attempt_once(client, url) {
            Ok(bytes) => return Ok(bytes),
            Err(Failure::Fatal(e)) => return Err(e),
            Err(Failure::Transient(reason)) => {
                tracing::warn!(url, attempt = attempt + 1, max_attempts = MAX_ATTEMPTS, %reason, "Request failed");
                last_failure = reason;
            }
        }
    }

    Err(MetadataError::RetriesExhausted {
        attempts: MAX_ATTEMPTS,
        message: last_failure,
    })
}

/// Download a URL and decode the body as UTF-8 text.
pub fn download_text(client: &Client, url: &str) -> Result<String> {
    let bytes = download_bytes(client, url)?;
    Ok(bytes_to_string(&bytes, url))
}

/// Convert a response body to a string, replacing invalid UTF-8.
///
/// Logs a warning naming `context` when replacement was necessary.
pub fn bytes_to_string(bytes: &[u8], context: &str) -> String {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text,
        Err(_) => {
            tracing::warn!(context, "Response is not valid UTF-8, replacing invalid bytes");
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
