//! Small helpers shared by the stages: HTTP client setup, log truncation and
//! secret redaction.

use crate::config::Settings;
use std::time::Duration;
use tracing::{debug, instrument};

/// Build the shared HTTP client from settings.
///
/// Every request carries the configured User-Agent and timeout.
#[instrument(level = "debug", skip_all)]
pub fn http_client(settings: &Settings) -> Result<reqwest::Client, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()?;
    debug!(
        user_agent = %settings.user_agent,
        timeout_secs = settings.http_timeout_secs,
        "HTTP client ready"
    );
    Ok(client)
}

/// Truncate a string for logging purposes.
///
/// Keeps at most `max` characters and appends `"…(+N bytes)"` with the
/// number of bytes dropped.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Stand-in for a secret in `Debug` output.
pub fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<empty>" } else { "<redacted>" }
}
