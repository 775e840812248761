use std::path::PathBuf;

use thiserror::Error;

use crate::model::{FilmDocument, is_valid_rating};

/// Where the film document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// `http://` and `https://` locations are fetched, anything else is read from disk.
    pub fn parse(location: &str) -> Self {
        let is_http = location.split_once("://").is_some_and(|(scheme, _)| {
            scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
        });
        if is_http {
            Source::Url(location.to_string())
        } else {
            Source::Path(PathBuf::from(location))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Anything that stops the document from loading. Every variant aborts rendering.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed film data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rating {value} from {reviewer} for \"{title}\"")]
    InvalidRating {
        title: String,
        reviewer: String,
        value: f64,
    },
}

pub async fn load_document(source: &Source) -> Result<FilmDocument, LoadError> {
    let body = match source {
        Source::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?,
        Source::Url(url) => fetch_text(url).await?,
    };

    tracing::debug!(bytes = body.len(), %source, "film data received");
    parse_document(&body)
}

async fn fetch_text(url: &str) -> Result<String, LoadError> {
    let response = reqwest::get(url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

/// Parse and validate a document body.
pub fn parse_document(body: &str) -> Result<FilmDocument, LoadError> {
    let doc: FilmDocument = serde_json::from_str(body)?;
    validate(&doc)?;
    Ok(doc)
}

fn validate(doc: &FilmDocument) -> Result<(), LoadError> {
    for film in doc.films() {
        for (reviewer, entry) in &film.ratings {
            if let Some(value) = entry.rating {
                if !is_valid_rating(value) {
                    return Err(LoadError::InvalidRating {
                        title: film.title.clone(),
                        reviewer: reviewer.clone(),
                        value,
                    });
                }
            }
        }
    }
    Ok(())
}
