//! Run configuration, validated once at startup.
//!
//! Two sources feed [`Config`]:
//! - [`Settings`]: non-secret tunables (endpoints, model, limits), read from
//!   an optional YAML file. Every field has a default.
//! - Credentials from [`Cli`], which clap fills from flags or the
//!   environment.
//!
//! [`Config::load`] reports every missing credential at once, so a misconfigured
//! run fails before it touches the network.

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::utils::redact;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use url::Url;

/// Non-secret tunables. Unknown keys in the YAML file are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Page listing trending topics.
    pub trends_url: String,
    /// Newline-delimited referral links.
    pub links_file: PathBuf,
    /// How many trends to keep from the page.
    pub trend_limit: usize,
    /// Gemini model name.
    pub gemini_model: String,
    /// Gemini REST base, up to and including the API version.
    pub gemini_base_url: String,
    /// Image search endpoint; the trend is appended as `q`.
    pub image_endpoint: String,
    /// Base URL for post creation.
    pub x_api_base: String,
    /// Base URL for media upload.
    pub x_upload_base: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub http_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trends_url: "https://trends24.in/united-states/".to_string(),
            links_file: PathBuf::from("links.txt"),
            trend_limit: 4,
            gemini_model: "gemini-1.5-flash-latest".to_string(),
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            image_endpoint: "https://tse1.mm.bing.net/th".to_string(),
            x_api_base: "https://api.twitter.com".to_string(),
            x_upload_base: "https://upload.twitter.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Read settings from a YAML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a map.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("trends_url", &self.trends_url),
            ("gemini_base_url", &self.gemini_base_url),
            ("image_endpoint", &self.image_endpoint),
            ("x_api_base", &self.x_api_base),
            ("x_upload_base", &self.x_upload_base),
        ] {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl { field, source })?;
        }
        if self.trend_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "trend_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "http_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.gemini_model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "gemini_model",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// The four OAuth 1.0a user-context components plus the app bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct XCredentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub bearer_token: String,
}

impl fmt::Debug for XCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XCredentials")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("access_token", &redact(&self.access_token))
            .field("access_token_secret", &redact(&self.access_token_secret))
            .field("bearer_token", &redact(&self.bearer_token))
            .finish()
    }
}

/// Everything a run needs, checked once.
#[derive(Clone)]
pub struct Config {
    pub settings: Settings,
    pub gemini_api_key: String,
    /// `None` only in dry-run mode.
    pub x: Option<XCredentials>,
    pub dry_run: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("settings", &self.settings)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("x", &self.x)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Config {
    /// Load the settings file named on the command line (if any) and
    /// validate it together with the credentials.
    #[instrument(level = "info", skip_all)]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let settings = match &cli.config {
            Some(path) => {
                info!(path = %path.display(), "Loading settings file");
                Settings::from_file(path)?
            }
            None => Settings::default(),
        };
        Self::from_parts(cli, settings)
    }

    /// Validate `settings` and the credentials in `cli`.
    ///
    /// All missing credentials are collected into a single
    /// [`ConfigError::Missing`]. X credentials are only required when
    /// publishing.
    pub fn from_parts(cli: &Cli, mut settings: Settings) -> Result<Self, ConfigError> {
        if let Some(path) = &cli.links_file {
            settings.links_file = path.clone();
        }
        settings.validate()?;

        let mut missing = Vec::new();
        let gemini_api_key = required(&cli.gemini_api_key, "GEMINI_API_KEY", &mut missing);

        let x = if cli.dry_run {
            None
        } else {
            Some(XCredentials {
                api_key: required(&cli.x_api_key, "X_API_KEY", &mut missing),
                api_secret: required(&cli.x_api_secret, "X_API_SECRET", &mut missing),
                access_token: required(&cli.x_access_token, "X_ACCESS_TOKEN", &mut missing),
                access_token_secret: required(
                    &cli.x_access_token_secret,
                    "X_ACCESS_TOKEN_SECRET",
                    &mut missing,
                ),
                bearer_token: required(&cli.x_bearer_token, "X_BEARER_TOKEN", &mut missing),
            })
        };

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let config = Self {
            settings,
            gemini_api_key,
            x,
            dry_run: cli.dry_run,
        };
        debug!(?config, "Configuration validated");
        Ok(config)
    }
}

/// Blank values count as missing.
fn required(value: &Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(name);
            String::new()
        }
    }
}
