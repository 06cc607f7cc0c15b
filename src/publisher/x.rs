//! X (Twitter) API client.
//!
//! Media goes through the v1.1 upload endpoint and posts through the v2
//! `tweets` endpoint. Both calls are signed for the user account with
//! [`OAuth1Signer`].

use super::SocialPlatform;
use super::oauth::OAuth1Signer;
use crate::config::XCredentials;
use crate::error::PublishError;
use crate::models::{MediaId, PostId};
use crate::utils::{redact, truncate_for_log};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, error, info, instrument};

const MEDIA_UPLOAD: &str = "media/upload";
const CREATE_POST: &str = "tweets";

#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

#[derive(Debug, Serialize)]
struct CreatePostRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<MediaAttachment<'a>>,
}

#[derive(Debug, Serialize)]
struct MediaAttachment<'a> {
    media_ids: &'a [MediaId],
}

#[derive(Debug, Deserialize)]
struct CreatePostResponse {
    data: CreatedPost,
}

#[derive(Debug, Deserialize)]
struct CreatedPost {
    id: String,
}

/// Authenticated client for one X account.
pub struct XClient {
    http: Client,
    signer: OAuth1Signer,
    bearer_token: String,
    api_base: String,
    upload_base: String,
}

impl fmt::Debug for XClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XClient")
            .field("signer", &self.signer)
            .field("bearer_token", &redact(&self.bearer_token))
            .field("api_base", &self.api_base)
            .field("upload_base", &self.upload_base)
            .finish()
    }
}

impl XClient {
    pub const DEFAULT_API_BASE: &'static str = "https://api.twitter.com";
    pub const DEFAULT_UPLOAD_BASE: &'static str = "https://upload.twitter.com";

    pub fn new(http: Client, creds: &XCredentials) -> Self {
        Self {
            http,
            signer: OAuth1Signer::from_credentials(creds),
            bearer_token: creds.bearer_token.clone(),
            api_base: Self::DEFAULT_API_BASE.to_string(),
            upload_base: Self::DEFAULT_UPLOAD_BASE.to_string(),
        }
    }

    pub fn with_endpoints(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self
    }

    fn media_upload_url(&self) -> String {
        format!("{}/1.1/media/upload.json", self.upload_base)
    }

    fn create_post_url(&self) -> String {
        format!("{}/2/tweets", self.api_base)
    }

    fn sign(&self, url: &str) -> Result<String, PublishError> {
        Ok(self.signer.authorization("POST", url, &[])?)
    }
}

/// Return the body of a successful response, or [`PublishError::Api`].
async fn success_body(response: Response, endpoint: &'static str) -> Result<String, PublishError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        error!(endpoint, %status, body = %truncate_for_log(&body, 300), "X API request failed");
        return Err(PublishError::Api {
            endpoint,
            status,
            body,
        });
    }
    Ok(body)
}

impl SocialPlatform for XClient {
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    async fn upload_media(&self, path: &Path) -> Result<MediaId, PublishError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.jpg".to_string());
        debug!(bytes = bytes.len(), %file_name, "Uploading media");

        let form = Form::new().part("media", Part::bytes(bytes).file_name(file_name));
        let url = self.media_upload_url();
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.sign(&url)?)
            .multipart(form)
            .send()
            .await?;

        let body = success_body(response, MEDIA_UPLOAD).await?;
        let parsed: MediaUploadResponse = serde_json::from_str(&body).map_err(|source| PublishError::Malformed {
            endpoint: MEDIA_UPLOAD,
            source,
        })?;
        info!(media_id = %parsed.media_id_string, "Media uploaded");
        Ok(parsed.media_id_string)
    }

    #[instrument(level = "info", skip_all, fields(media = media_ids.len()))]
    async fn create_post(&self, text: &str, media_ids: &[MediaId]) -> Result<PostId, PublishError> {
        let request = CreatePostRequest {
            text,
            media: (!media_ids.is_empty()).then_some(MediaAttachment { media_ids }),
        };
        let url = self.create_post_url();
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.sign(&url)?)
            .json(&request)
            .send()
            .await?;

        let body = success_body(response, CREATE_POST).await?;
        let parsed: CreatePostResponse = serde_json::from_str(&body).map_err(|source| PublishError::Malformed {
            endpoint: CREATE_POST,
            source,
        })?;
        info!(post_id = %parsed.data.id, "Post created");
        Ok(parsed.data.id)
    }
}
