//! Values passed between pipeline stages.
//!
//! Everything here lives for a single run. Nothing is persisted and nothing
//! is mutated after it is built; a failed stage produces an error instead.

/// Trend labels in source ranking order, at most the configured limit.
pub type TrendList = Vec<String>;

/// A referral URL taken verbatim from the links file.
pub type Link = String;

/// Text returned by the generation API, trimmed and never empty.
pub type GeneratedText = String;

/// Opaque identifier returned by the platform's media upload endpoint.
pub type MediaId = String;

/// Identifier of a created post.
pub type PostId = String;

/// Maximum post length on the target platform. Only used for a warning.
pub const POST_CHAR_LIMIT: usize = 280;

/// The unit handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPost {
    /// Generated text, a blank line, then the hashtag string.
    pub text: String,
    /// One `#` token per trend, space separated.
    pub hashtags: String,
    /// The trend the text and image are about.
    pub selected_trend: String,
    /// Image search URL for the selected trend.
    pub image_url: Option<String>,
}

impl ComposedPost {
    /// Character count of the final text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the text is longer than the platform allows.
    ///
    /// The post is sent as is; callers only log this.
    pub fn exceeds_char_limit(&self) -> bool {
        self.char_count() > POST_CHAR_LIMIT
    }
}

/// What happened to the image while publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// No image URL was supplied.
    NotRequested,
    /// Image uploaded and attached to the post.
    Attached(MediaId),
    /// Image step failed; the post went out text-only.
    Skipped(String),
}

impl MediaOutcome {
    pub fn media_id(&self) -> Option<&MediaId> {
        match self {
            MediaOutcome::Attached(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, MediaOutcome::Skipped(_))
    }
}

/// Result of a successful publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub post_id: PostId,
    pub media: MediaOutcome,
}
