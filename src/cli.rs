//! Command-line interface definitions for trend_autopost.
//!
//! Credentials may come from flags or environment variables (a `.env` file in
//! the working directory is loaded first). Non-secret tunables live in an
//! optional YAML settings file passed with `--config`.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for trend_autopost.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment, default settings
/// trend_autopost
///
/// # Custom settings and links file, compose only
/// trend_autopost --config settings.yaml --links-file promo.txt --dry-run
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Referral links file, one URL per line (overrides the settings file)
    #[arg(short, long)]
    pub links_file: Option<PathBuf>,

    /// Compose the post and log it, but do not publish
    #[arg(long)]
    pub dry_run: bool,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// X API key (consumer key)
    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    pub x_api_key: Option<String>,

    /// X API secret (consumer secret)
    #[arg(long, env = "X_API_SECRET", hide_env_values = true)]
    pub x_api_secret: Option<String>,

    /// X user access token
    #[arg(long, env = "X_ACCESS_TOKEN", hide_env_values = true)]
    pub x_access_token: Option<String>,

    /// X user access token secret
    #[arg(long, env = "X_ACCESS_TOKEN_SECRET", hide_env_values = true)]
    pub x_access_token_secret: Option<String>,

    /// X app bearer token
    #[arg(long, env = "X_BEARER_TOKEN", hide_env_values = true)]
    pub x_bearer_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "trend_autopost",
            "--config",
            "./settings.yaml",
            "--links-file",
            "./links.txt",
            "--dry-run",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("./settings.yaml")));
        assert_eq!(cli.links_file, Some(PathBuf::from("./links.txt")));
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["trend_autopost", "-c", "/tmp/s.yaml", "-l", "/tmp/l.txt"]);

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/s.yaml")));
        assert_eq!(cli.links_file, Some(PathBuf::from("/tmp/l.txt")));
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_credential_flags() {
        let cli = Cli::parse_from([
            "trend_autopost",
            "--gemini-api-key",
            "g-key",
            "--x-api-key",
            "ck",
            "--x-bearer-token",
            "bt",
        ]);

        assert_eq!(cli.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(cli.x_api_key.as_deref(), Some("ck"));
        assert_eq!(cli.x_bearer_token.as_deref(), Some("bt"));
    }
}
