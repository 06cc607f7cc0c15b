//! Typed errors for each pipeline stage.
//!
//! Every stage returns its own error enum so the caller can tell a missing
//! credential from a dead network link from an API refusal. [`PipelineError`]
//! wraps the stage errors and records which stage stopped the run; the
//! binary turns that into an exit code (see [`crate::pipeline::RunOutcome`]).

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Problems found while assembling [`crate::config::Config`] at startup.
///
/// These are raised before any network call is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid URL for `{field}`: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("failed to read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Trend page retrieval failures.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to trends page failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("trends page {url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("no trends found on the page (structure may have changed)")]
    NoTrends,
}

/// Referral link file failures.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to read links file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("links file {} contains no links", .path.display())]
    Empty { path: PathBuf },
}

/// Text generation failures. None of these are retried.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to generation API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation API answered with status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("generation API returned malformed JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("generation API returned no text ({0})")]
    NoContent(String),
}

/// Image transfer and post submission failures.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image download answered with status {0}")]
    ImageStatus(StatusCode),

    #[error("temporary image file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to sign request: {0}")]
    Signing(#[from] url::ParseError),

    #[error("{endpoint} answered with status {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint} returned an unexpected body: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The stage that stopped a run, with its cause.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("trend fetch failed: {0}")]
    Trends(#[from] FetchError),

    #[error("link selection failed: {0}")]
    Link(#[from] LinkError),

    #[error("content generation failed: {0}")]
    Generate(#[from] GenerateError),

    #[error("publishing failed: {0}")]
    Publish(#[from] PublishError),
}

impl PipelineError {
    /// Short stage name used as a structured log field.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Trends(_) => "trends",
            PipelineError::Link(_) => "link",
            PipelineError::Generate(_) => "generate",
            PipelineError::Publish(_) => "publish",
        }
    }
}
