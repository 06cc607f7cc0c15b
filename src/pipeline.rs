//! The five-stage run: trends → link → text → compose → publish.
//!
//! Stages run strictly in order. The first failing stage stops the run and
//! becomes [`RunOutcome::Halted`]; [`RunOutcome::exit_code`] maps every
//! outcome to a distinct process status.

use crate::api::{GenerateText, build_prompt};
use crate::compose::compose;
use crate::config::Settings;
use crate::error::{FetchError, PipelineError};
use crate::links::select_link;
use crate::models::{ComposedPost, POST_CHAR_LIMIT, PublishReport};
use crate::publisher::{Publisher, SocialPlatform};
use crate::scrapers::trends24::fetch_trends;
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::Client;
use tracing::{info, instrument, warn};

/// Exit status for a configuration error, raised before the pipeline starts.
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Post created. The report says whether the image made it.
    Posted(PublishReport),
    /// Composed but not published (`--dry-run`).
    DryRun(ComposedPost),
    /// A stage failed; later stages did not run.
    Halted(PipelineError),
}

impl RunOutcome {
    /// | Outcome | Code |
    /// |---|---|
    /// | posted with image, or no image requested; dry run | 0 |
    /// | halted before publishing | 1 |
    /// | posted text-only because the image step failed | 3 |
    /// | post creation failed | 4 |
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Posted(report) if report.media.is_skipped() => 3,
            RunOutcome::Posted(_) | RunOutcome::DryRun(_) => 0,
            RunOutcome::Halted(PipelineError::Publish(_)) => 4,
            RunOutcome::Halted(_) => 1,
        }
    }
}

/// One configured run.
///
/// `publisher` is `None` in dry-run mode.
pub struct Pipeline<G, P> {
    settings: Settings,
    http: Client,
    generator: G,
    publisher: Option<Publisher<P>>,
}

impl<G: GenerateText, P: SocialPlatform> Pipeline<G, P> {
    pub fn new(settings: Settings, http: Client, generator: G, publisher: Option<Publisher<P>>) -> Self {
        Self {
            settings,
            http,
            generator,
            publisher,
        }
    }

    /// Run every stage once. `rng` picks the trend and the link.
    #[instrument(level = "info", skip_all)]
    pub async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> RunOutcome {
        match self.execute(rng).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(stage = e.stage(), error = %e, "Pipeline halted");
                RunOutcome::Halted(e)
            }
        }
    }

    async fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<RunOutcome, PipelineError> {
        let settings = &self.settings;

        let trends = fetch_trends(&self.http, &settings.trends_url, settings.trend_limit).await?;
        let selected = trends.choose(rng).cloned().ok_or(FetchError::NoTrends)?;
        info!(%selected, "Selected trend for content");

        let link = select_link(&settings.links_file, rng).await?;

        let generated = self.generator.generate(&build_prompt(&selected, &link)).await?;
        info!(text = %generated, "Generated post text");

        let post = compose(&generated, &trends, &selected, &settings.image_endpoint);
        info!(hashtags = %post.hashtags, trends = trends.len(), "Built hashtags");
        if let Some(url) = &post.image_url {
            info!(image_url = %url, "Image URL");
        }
        if post.exceeds_char_limit() {
            warn!(
                chars = post.char_count(),
                limit = POST_CHAR_LIMIT,
                "Post exceeds the platform character limit; sending unchanged"
            );
        }
        info!("--- FINAL POST ---\n{}\n------------------", post.text);

        let Some(publisher) = &self.publisher else {
            info!("Dry run: not publishing");
            return Ok(RunOutcome::DryRun(post));
        };
        let report = publisher.publish(&post).await?;
        Ok(RunOutcome::Posted(report))
    }
}
