use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// The whole `films.json` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmDocument {
    pub current_film: FilmRecord,
    #[serde(default)]
    pub past_films: Vec<FilmRecord>,
    /// Keys this crate does not interpret, kept so a rewrite loses nothing.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single club pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilmRecord {
    pub title: String,
    pub year: i32,
    pub club_date: NaiveDate,
    /// Per-film Letterboxd slug, shared by all reviewers unless an entry overrides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letterboxd_slug: Option<String>,
    #[serde(default)]
    pub ratings: BTreeMap<String, RatingEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One reviewer's verdict on a film.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letterboxd_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letterboxd_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RatingEntry {
    /// Rating to display, if any. Zero counts as "not yet rated".
    pub fn display_rating(&self) -> Option<f64> {
        self.rating.filter(|r| *r > 0.0)
    }
}

impl FilmDocument {
    /// Current film first, then past films in document order.
    pub fn films(&self) -> impl Iterator<Item = &FilmRecord> {
        std::iter::once(&self.current_film).chain(self.past_films.iter())
    }

    pub fn films_mut(&mut self) -> impl Iterator<Item = &mut FilmRecord> {
        std::iter::once(&mut self.current_film).chain(self.past_films.iter_mut())
    }

    /// Every reviewer named anywhere in the document, sorted.
    pub fn reviewers(&self) -> Vec<String> {
        self.films()
            .flat_map(|film| film.ratings.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A rating is valid when it lies in [0, 5] on a half-star step.
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=5.0).contains(&rating) && (rating * 2.0).fract() == 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "currentFilm": {
            "title": "Boiling Point",
            "year": 2021,
            "clubDate": "2024-01-15",
            "letterboxdSlug": "boiling-point-2021",
            "ratings": {
                "zebrastuhl": { "rating": null },
                "derschaki": { "rating": 4.5, "letterboxdSlug": "boiling-point-2021" }
            }
        },
        "pastFilms": [
            {
                "title": "Heat",
                "year": 1995,
                "clubDate": "2023-12-01",
                "ratings": {
                    "derschaki": { "rating": 5, "letterboxdUrl": "https://letterboxd.com/derschaki/film/heat-1995/" },
                    "gast": {}
                }
            }
        ]
    }"#;

    #[test]
    fn test_document_deserializes_camel_case() {
        let doc: FilmDocument = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(doc.current_film.title, "Boiling Point");
        assert_eq!(
            doc.current_film.club_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(doc.current_film.ratings["derschaki"].rating, Some(4.5));
        assert_eq!(doc.current_film.ratings["zebrastuhl"].rating, None);
        assert_eq!(doc.past_films.len(), 1);
        assert_eq!(doc.past_films[0].ratings["gast"], RatingEntry::default());
    }

    #[test]
    fn test_reviewers_are_collected_across_films() {
        let doc: FilmDocument = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(doc.reviewers(), vec!["derschaki", "gast", "zebrastuhl"]);
    }

    #[test]
    fn test_films_iterates_current_first() {
        let doc: FilmDocument = serde_json::from_str(SAMPLE).unwrap();
        let titles: Vec<_> = doc.films().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, vec!["Boiling Point", "Heat"]);
    }

    #[test]
    fn test_zero_rating_is_not_displayed() {
        let entry = RatingEntry {
            rating: Some(0.0),
            ..Default::default()
        };
        assert_eq!(entry.display_rating(), None);
    }

    #[test]
    fn test_rating_validity() {
        for ok in [0.0, 0.5, 1.0, 3.5, 5.0] {
            assert!(is_valid_rating(ok), "{ok} should be valid");
        }
        for bad in [-0.5, 5.5, 3.25, f64::NAN, f64::INFINITY] {
            assert!(!is_valid_rating(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let body = r#"{
            "clubName": "Filmclub Ost",
            "currentFilm": {
                "title": "Heat",
                "year": 1995,
                "clubDate": "2023-12-18",
                "poster": "heat.jpg",
                "ratings": { "derschaki": { "rating": 4.5, "comment": "Diner-Szene!" } }
            },
            "pastFilms": []
        }"#;
        let doc: FilmDocument = serde_json::from_str(body).unwrap();
        assert_eq!(doc.extra["clubName"], "Filmclub Ost");
        assert_eq!(doc.current_film.extra["poster"], "heat.jpg");
        assert_eq!(
            doc.current_film.ratings["derschaki"].extra["comment"],
            "Diner-Szene!"
        );

        let written: Value = serde_json::to_value(&doc).unwrap();
        assert_eq!(written["clubName"], "Filmclub Ost");
        assert_eq!(written["currentFilm"]["poster"], "heat.jpg");
        assert_eq!(
            written["currentFilm"]["ratings"]["derschaki"]["comment"],
            "Diner-Szene!"
        );
        assert!(written["currentFilm"].get("extra").is_none());
    }

    #[test]
    fn test_missing_rating_serializes_as_null() {
        let entry = RatingEntry::default();
        assert_eq!(serde_json::to_string(&entry).unwrap(), r#"{"rating":null}"#);
    }
}
