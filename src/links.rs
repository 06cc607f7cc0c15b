//! Referral link selection.
//!
//! Links live in a plain text file, one URL per line. Blank lines are
//! ignored and one remaining line is picked uniformly at random.

use crate::error::LinkError;
use crate::models::Link;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Split file contents into links, trimming each line and dropping blanks.
pub fn parse_links(contents: &str) -> Vec<Link> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read every usable link from `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_links(path: &Path) -> Result<Vec<Link>, LinkError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LinkError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let links = parse_links(&contents);
    debug!(count = links.len(), "Loaded links");
    Ok(links)
}

/// Pick one link uniformly at random.
pub fn choose_link<'a, R: Rng + ?Sized>(links: &'a [Link], rng: &mut R) -> Option<&'a Link> {
    links.choose(rng)
}

/// Load `path` and pick one link.
///
/// # Errors
///
/// [`LinkError::Read`] if the file cannot be read, [`LinkError::Empty`] if it
/// has no non-blank lines.
pub async fn select_link<R: Rng + ?Sized>(path: &Path, rng: &mut R) -> Result<Link, LinkError> {
    let links = load_links(path).await?;
    let link = choose_link(&links, rng)
        .cloned()
        .ok_or_else(|| LinkError::Empty {
            path: path.to_path_buf(),
        })?;
    info!(%link, candidates = links.len(), "Selected referral link");
    Ok(link)
}
