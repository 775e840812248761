use std::collections::HashMap;
use std::path::Path;

use super::{FeedEntry, SyncError, feed, normalize_slug};
use crate::loader;
use crate::model::{FilmDocument, is_valid_rating};

/// Ratings keyed by normalized slug, then reviewer.
pub type FeedRatings = HashMap<String, HashMap<String, f64>>;

/// A rating that changed during a sync.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingChange {
    pub title: String,
    pub reviewer: String,
    pub old: Option<f64>,
    pub new: f64,
}

/// Fold one reviewer's feed entries into the lookup. Unrated and out-of-range entries are dropped.
pub fn collect_ratings(ratings: &mut FeedRatings, reviewer: &str, entries: &[FeedEntry]) {
    for entry in entries {
        let Some(rating) = entry.rating.filter(|r| *r > 0.0 && is_valid_rating(*r)) else {
            continue;
        };
        ratings
            .entry(normalize_slug(&entry.slug))
            .or_default()
            .insert(reviewer.to_string(), rating);
    }
}

/// Write feed ratings into every film that has a slug. Returns what changed.
pub fn apply_ratings(doc: &mut FilmDocument, ratings: &FeedRatings) -> Vec<RatingChange> {
    let mut changes = Vec::new();

    for film in doc.films_mut() {
        let Some(slug) = film.letterboxd_slug.as_deref() else {
            tracing::debug!(title = %film.title, "no letterboxd slug, skipping");
            continue;
        };
        let Some(found) = ratings.get(&normalize_slug(slug)) else {
            continue;
        };

        let mut reviewers: Vec<_> = found.iter().collect();
        reviewers.sort_by(|a, b| a.0.cmp(b.0));

        for (reviewer, &new) in reviewers {
            let entry = film.ratings.entry(reviewer.clone()).or_default();
            if entry.rating == Some(new) {
                continue;
            }
            changes.push(RatingChange {
                title: film.title.clone(),
                reviewer: reviewer.clone(),
                old: entry.rating,
                new,
            });
            entry.rating = Some(new);
        }
    }

    changes
}

/// Fetch every reviewer's feed and update the document on disk.
///
/// A feed that fails is logged and skipped; the others still apply. The file
/// is only rewritten when a rating changed and `dry_run` is off.
pub async fn sync_ratings(
    path: &Path,
    reviewers: &[String],
    dry_run: bool,
) -> Result<Vec<RatingChange>, SyncError> {
    let source = loader::Source::Path(path.to_path_buf());
    let mut doc = loader::load_document(&source).await?;

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SyncError::Client)?;

    let mut ratings = FeedRatings::new();
    for reviewer in reviewers {
        match feed::fetch_feed(&client, reviewer).await {
            Ok(entries) => {
                tracing::info!(%reviewer, entries = entries.len(), "feed parsed");
                collect_ratings(&mut ratings, reviewer, &entries);
            }
            Err(e) => tracing::warn!(%reviewer, error = %e, "skipping feed"),
        }
    }

    let changes = apply_ratings(&mut doc, &ratings);
    for change in &changes {
        tracing::info!(
            title = %change.title,
            reviewer = %change.reviewer,
            "{} → {}",
            change.old.map_or_else(|| "none".to_string(), |r| r.to_string()),
            change.new
        );
    }

    persist(path, &doc, &changes, dry_run).await?;
    Ok(changes)
}

/// Rewrite the document only when something changed and this is not a dry run.
/// Returns whether the file was written.
pub async fn persist(
    path: &Path,
    doc: &FilmDocument,
    changes: &[RatingChange],
    dry_run: bool,
) -> Result<bool, SyncError> {
    if changes.is_empty() {
        tracing::info!("no rating updates found");
        return Ok(false);
    }
    if dry_run {
        tracing::info!(changes = changes.len(), "dry run, leaving {} untouched", path.display());
        return Ok(false);
    }

    write_document(path, doc).await?;
    tracing::info!(changes = changes.len(), "ratings updated");
    Ok(true)
}

/// Two-space pretty JSON with a trailing newline; non-ASCII stays literal.
pub async fn write_document(path: &Path, doc: &FilmDocument) -> Result<(), SyncError> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    tokio::fs::write(path, json)
        .await
        .map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })
}
