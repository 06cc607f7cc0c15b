//! trends24.in trend scraper.
//!
//! The page renders one "trend card" per hour, newest first, each holding an
//! ordered list of trend links. Selecting `ol.trend-card__list li a` across
//! the document therefore yields the most recent hour first.

use crate::error::FetchError;
use crate::models::TrendList;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

static TREND_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ol.trend-card__list li a").expect("trend selector is valid CSS")
});

/// Extract up to `limit` trend labels from a trends24 page.
///
/// Labels are trimmed and lose a leading `#`. Entries left empty are
/// dropped. Document order is kept.
pub fn parse_trends(html: &str, limit: usize) -> TrendList {
    let document = Html::parse_document(html);
    document
        .select(&TREND_SELECTOR)
        .filter_map(|element| clean_label(&element.text().collect::<String>()))
        .take(limit)
        .collect()
}

fn clean_label(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let label = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// GET the trends page and parse it.
///
/// # Errors
///
/// - [`FetchError::Transport`] when the request itself fails
/// - [`FetchError::Status`] for a non-success response
/// - [`FetchError::NoTrends`] when nothing matched the selector
#[instrument(level = "info", skip(client))]
pub async fn fetch_trends(client: &Client, url: &str, limit: usize) -> Result<TrendList, FetchError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!(%status, "Trends page returned an error status");
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let html = response.text().await?;
    debug!(bytes = html.len(), "Downloaded trends page");

    let trends = parse_trends(&html, limit);
    if trends.is_empty() {
        warn!("No trends matched; the page structure may have changed");
        return Err(FetchError::NoTrends);
    }

    info!(count = trends.len(), ?trends, "Fetched trends");
    Ok(trends)
}
