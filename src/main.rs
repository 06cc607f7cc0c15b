//! # trend_autopost
//!
//! Posts one AI-written promotional message about a currently trending topic
//! to X, with a related image and hashtags for the top trends.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... X_API_KEY=... X_API_SECRET=... \
//! X_ACCESS_TOKEN=... X_ACCESS_TOKEN_SECRET=... X_BEARER_TOKEN=... \
//! trend_autopost --links-file links.txt
//! ```
//!
//! ## Architecture
//!
//! A single sequential run:
//! 1. **Trends**: scrape the top trends from trends24.in
//! 2. **Link**: pick a random referral link from the links file
//! 3. **Text**: ask Gemini for a short post with a call to action
//! 4. **Compose**: append hashtags for every trend, derive an image URL
//! 5. **Publish**: upload the image (best effort) and create the post
//!
//! The process exit code tells full success, partial success (posted
//! without image), a halted run and a configuration error apart.

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod compose;
mod config;
mod error;
mod links;
mod models;
mod pipeline;
mod publisher;
mod scrapers;
#[cfg(test)]
mod test_support;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::Config;
use error::ConfigError;
use models::MediaOutcome;
use pipeline::{EXIT_CONFIG_ERROR, Pipeline, RunOutcome};
use publisher::{Publisher, XClient};

#[tokio::main]
#[instrument]
async fn main() -> ExitCode {
    // Credentials may live in .env; load it before clap reads the environment.
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("trend_autopost starting up");
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file"),
        Err(e) => warn!(error = %e, "Failed to load .env"),
    }

    let args = Cli::parse();
    debug!(config = ?args.config, links_file = ?args.links_file, dry_run = args.dry_run, "Parsed CLI arguments");

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration error; nothing was sent");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "Configuration error; nothing was sent");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut rng = StdRng::from_os_rng();
    let outcome = pipeline.run(&mut rng).await;
    let exit_code = outcome.exit_code();
    report(&outcome);

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        exit_code,
        "Execution complete"
    );
    ExitCode::from(exit_code)
}

/// Wire the concrete Gemini and X clients into a pipeline.
fn build_pipeline(config: &Config) -> Result<Pipeline<GeminiClient, XClient>, ConfigError> {
    let settings = &config.settings;
    let http = utils::http_client(settings).map_err(ConfigError::HttpClient)?;

    let generator = GeminiClient::new(http.clone(), &config.gemini_api_key, &settings.gemini_model)
        .with_base_url(&settings.gemini_base_url);

    let publisher = config.x.as_ref().map(|creds| {
        let x = XClient::new(http.clone(), creds).with_endpoints(&settings.x_api_base, &settings.x_upload_base);
        Publisher::new(http.clone(), x)
    });
    if publisher.is_none() {
        info!("Dry run: X credentials not required, nothing will be posted");
    }

    Ok(Pipeline::new(settings.clone(), http, generator, publisher))
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Posted(report) => match &report.media {
            MediaOutcome::Attached(media_id) => {
                info!(post_id = %report.post_id, %media_id, "Posted with image")
            }
            MediaOutcome::NotRequested => info!(post_id = %report.post_id, "Posted"),
            MediaOutcome::Skipped(reason) => {
                warn!(post_id = %report.post_id, %reason, "Posted without image (partial success)")
            }
        },
        RunOutcome::DryRun(post) => {
            info!(chars = post.char_count(), trend = %post.selected_trend, "Dry run complete")
        }
        RunOutcome::Halted(e) => error!(stage = e.stage(), error = %e, "Run stopped before posting"),
    }
}
