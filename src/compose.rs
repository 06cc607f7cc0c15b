//! Post composition: generated text + hashtags + image URL.
//!
//! Pure functions only. Given the same inputs the output is byte-identical.

use crate::models::ComposedPost;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// `#` plus the label with all whitespace removed.
pub fn hashtag(label: &str) -> String {
    format!("#{}", WHITESPACE.replace_all(label, ""))
}

/// One hashtag per trend, space separated, in trend order.
pub fn hashtags(trends: &[String]) -> String {
    trends.iter().map(|t| hashtag(t)).join(" ")
}

/// Image search URL for `trend`: the percent-encoded label as the `q` parameter.
pub fn image_url(endpoint: &str, trend: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}q={}", urlencoding::encode(trend))
}

/// Build the final post.
///
/// Hashtags come from every trend in `trends`. The image is for `selected`
/// only. The length is not checked here; see
/// [`ComposedPost::exceeds_char_limit`].
pub fn compose(generated: &str, trends: &[String], selected: &str, image_endpoint: &str) -> ComposedPost {
    let hashtags = hashtags(trends);
    ComposedPost {
        text: format!("{generated}\n\n{hashtags}"),
        hashtags,
        selected_trend: selected.to_string(),
        image_url: Some(image_url(image_endpoint, selected)),
    }
}
