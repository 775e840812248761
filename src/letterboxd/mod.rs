pub mod feed;
pub mod sync;

use std::path::PathBuf;
use std::sync::LazyLock;

use reqwest::Url;
use thiserror::Error;

static LETTERBOXD_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("https://letterboxd.com/").expect("valid letterboxd base url"));

/// A rated (or merely logged) film found in a reviewer's RSS feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    /// Slug as it appears in the link, original casing kept.
    pub slug: String,
    pub rating: Option<f64>,
}

/// Errors raised while syncing ratings from Letterboxd.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("feed request for {reviewer} failed: {source}")]
    Feed {
        reviewer: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("feed for {reviewer} answered HTTP {status}")]
    FeedStatus { reviewer: String, status: u16 },

    #[error("could not access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("film data error: {0}")]
    Load(#[from] crate::loader::LoadError),

    #[error("could not serialize film data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// `https://letterboxd.com/<segment>/.../` with every segment percent-encoded.
pub fn letterboxd_url(segments: &[&str]) -> String {
    let mut url = LETTERBOXD_BASE.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments.iter().copied()).push("");
    }
    url.into()
}

/// Lowercased, trimmed slug used as the match key.
pub fn normalize_slug(slug: &str) -> String {
    slug.trim().to_lowercase()
}
