//! HTML rendering for film cards.
//!
//! Everything here is pure: a `FilmDocument` goes in, markup for the two page
//! containers comes out.

use crate::format::{StarCounts, format_club_date, html_escape};
use crate::letterboxd::letterboxd_url;
use crate::model::{FilmDocument, FilmRecord, RatingEntry};

pub const CURRENT_FILM_CONTAINER: &str = "current-film-container";
pub const PAST_FILMS_CONTAINER: &str = "past-films-container";

/// Whether a card shows the upcoming screening or a past one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Current,
    Past,
}

impl CardKind {
    pub fn date_label(self) -> &'static str {
        match self {
            Self::Current => "Anstehend am",
            Self::Past => "Gesehen am",
        }
    }
}

/// Rendered markup for both containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFilms {
    pub current: String,
    pub past: String,
}

impl RenderedFilms {
    /// The two containers as standalone `<div id=...>` blocks.
    pub fn fragments(&self) -> String {
        format!(
            "<div id=\"{CURRENT_FILM_CONTAINER}\">{}</div>\n<div id=\"{PAST_FILMS_CONTAINER}\">{}</div>\n",
            self.current, self.past
        )
    }

    /// A minimal page around the containers.
    pub fn page(&self, title: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="de">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="style.css">
</head>
<body>
    <section>
        <h2>Aktueller Film</h2>
        <div id="{CURRENT_FILM_CONTAINER}">{current}</div>
    </section>
    <section>
        <h2>Bisherige Filme</h2>
        <div id="{PAST_FILMS_CONTAINER}">{past}</div>
    </section>
</body>
</html>
"#,
            title = html_escape(title),
            current = self.current,
            past = self.past,
        )
    }
}

pub struct FilmCardRenderer {
    reviewers: Vec<String>,
}

impl FilmCardRenderer {
    /// Renders one rating block per reviewer, in the given order.
    pub fn new(reviewers: Vec<String>) -> Self {
        Self { reviewers }
    }

    /// Uses every reviewer that appears in the document.
    pub fn for_document(doc: &FilmDocument) -> Self {
        Self::new(doc.reviewers())
    }

    pub fn reviewers(&self) -> &[String] {
        &self.reviewers
    }

    pub fn render(&self, doc: &FilmDocument) -> RenderedFilms {
        RenderedFilms {
            current: self.render_current_film(&doc.current_film),
            past: self.render_past_films(&doc.past_films),
        }
    }

    pub fn render_current_film(&self, film: &FilmRecord) -> String {
        self.render_card(film, CardKind::Current)
    }

    pub fn render_past_films(&self, films: &[FilmRecord]) -> String {
        films
            .iter()
            .map(|film| self.render_card(film, CardKind::Past))
            .collect()
    }

    pub fn render_card(&self, film: &FilmRecord, kind: CardKind) -> String {
        let missing = RatingEntry::default();
        let ratings: String = self
            .reviewers
            .iter()
            .map(|name| {
                let entry = film.ratings.get(name).unwrap_or(&missing);
                render_rating_item(name, entry, film.letterboxd_slug.as_deref())
            })
            .collect();

        format!(
            r#"
        <div class="film-card">
            <div class="film-header">
                <span class="film-title">{title}</span>
                <span class="film-year">{year}</span>
            </div>
            <div class="club-date">{label}: {date}</div>
            <div class="ratings">{ratings}
            </div>
        </div>
    "#,
            title = html_escape(&film.title),
            year = film.year,
            label = kind.date_label(),
            date = format_club_date(film.club_date),
        )
    }
}

/// A single reviewer's block: placeholder when unrated, stars plus review link otherwise.
pub fn render_rating_item(name: &str, entry: &RatingEntry, film_slug: Option<&str>) -> String {
    let name_html = html_escape(name);

    let Some(rating) = entry.display_rating() else {
        return format!(
            r#"
                <div class="rating-item">
                    <div class="rating-name">{name_html}</div>
                    <div class="pending">Noch nicht bewertet</div>
                </div>"#
        );
    };

    let link = review_url(name, entry, film_slug)
        .map(|url| {
            format!(
                r#"<a href="{}" target="_blank" class="letterboxd-link">→ Letterboxd</a>"#,
                html_escape(&url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"
                <div class="rating-item">
                    <div class="rating-name">{name_html}</div>
                    <div class="stars">{stars}</div>
                    {link}
                </div>"#,
        stars = StarCounts::from_rating(rating).to_html(),
    )
}

/// Explicit URL wins; otherwise build one from the reviewer and the entry or film slug.
pub fn review_url(reviewer: &str, entry: &RatingEntry, film_slug: Option<&str>) -> Option<String> {
    if let Some(url) = entry.letterboxd_url.as_deref().filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    let slug = entry
        .letterboxd_slug
        .as_deref()
        .or(film_slug)
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    Some(letterboxd_url(&[reviewer, "film", slug]))
}
