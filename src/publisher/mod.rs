//! Publishing a composed post, optionally with an image.
//!
//! # Flow
//!
//! 1. If the post has an image URL, stream the image into a temporary file.
//!    The file is removed when the handle drops, whichever way the call ends.
//! 2. Upload the file through [`SocialPlatform::upload_media`].
//! 3. Create the post, attaching the media id when step 2 produced one.
//!
//! A failure in steps 1 or 2 is logged and recorded as
//! [`MediaOutcome::Skipped`]; the text still goes out. Only a failure in
//! step 3 is returned as an error.

pub mod oauth;
pub mod x;

use crate::error::PublishError;
use crate::models::{ComposedPost, MediaId, MediaOutcome, PostId, PublishReport};
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

pub use x::XClient;

/// A platform that accepts media uploads and text posts.
pub trait SocialPlatform {
    /// Upload the file at `path` and return its media id.
    async fn upload_media(&self, path: &Path) -> Result<MediaId, PublishError>;

    /// Create a post with `text`, attaching `media_ids` if not empty.
    async fn create_post(&self, text: &str, media_ids: &[MediaId]) -> Result<PostId, PublishError>;
}

/// Downloads images and drives a [`SocialPlatform`].
#[derive(Debug)]
pub struct Publisher<P> {
    http: Client,
    platform: P,
}

impl<P: SocialPlatform> Publisher<P> {
    pub fn new(http: Client, platform: P) -> Self {
        Self { http, platform }
    }

    /// Publish `post`. See the module docs for how image failures degrade.
    #[instrument(level = "info", skip_all, fields(trend = %post.selected_trend))]
    pub async fn publish(&self, post: &ComposedPost) -> Result<PublishReport, PublishError> {
        let media = match post.image_url.as_deref() {
            None => MediaOutcome::NotRequested,
            Some(url) => match self.attach_image(url).await {
                Ok(id) => MediaOutcome::Attached(id),
                Err(e) => {
                    warn!(error = %e, image_url = %url, "Image step failed; posting text only");
                    MediaOutcome::Skipped(e.to_string())
                }
            },
        };

        let media_ids: Vec<MediaId> = media.media_id().cloned().into_iter().collect();
        let post_id = self.platform.create_post(&post.text, &media_ids).await?;
        info!(%post_id, with_media = !media_ids.is_empty(), "Post published");

        Ok(PublishReport { post_id, media })
    }

    #[cfg(test)]
    pub(crate) fn platform(&self) -> &P {
        &self.platform
    }

    async fn attach_image(&self, url: &str) -> Result<MediaId, PublishError> {
        let image = download_image(&self.http, url).await?;
        self.platform.upload_media(image.path()).await
    }
}

/// Stream `url` into a new temporary file.
///
/// The returned handle deletes the file on drop. A non-success status gives
/// [`PublishError::ImageStatus`] and no file is created.
#[instrument(level = "info", skip(http))]
pub async fn download_image(http: &Client, url: &str) -> Result<NamedTempFile, PublishError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(PublishError::ImageStatus(status));
    }

    let temp = tempfile::Builder::new()
        .prefix("trend_autopost-")
        .suffix(".jpg")
        .tempfile()?;
    let mut file = tokio::fs::File::from_std(temp.reopen()?);

    let mut written = 0usize;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len();
    }
    file.flush().await?;

    debug!(bytes = written, path = %temp.path().display(), "Image downloaded");
    Ok(temp)
}
