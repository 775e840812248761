use chrono::NaiveDate;

pub const STAR_SLOTS: u8 = 5;

/// Day-first, zero-padded, dot-separated (`15.01.2024`).
const CLUB_DATE_FORMAT: &str = "%d.%m.%Y";

/// Breakdown of a rating into star glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarCounts {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarCounts {
    pub fn from_rating(rating: f64) -> Self {
        let rating = rating.clamp(0.0, f64::from(STAR_SLOTS));
        let full = rating.floor() as u8;
        let half = u8::from(rating.fract() != 0.0);
        let empty = STAR_SLOTS - rating.ceil() as u8;
        Self { full, half, empty }
    }

    /// Glyph markup: filled, then half, then empty stars.
    pub fn to_html(self) -> String {
        let mut stars = String::new();
        for _ in 0..self.full {
            stars.push_str(r#"<span class="star filled">★</span>"#);
        }
        for _ in 0..self.half {
            stars.push_str(r#"<span class="star half">★</span>"#);
        }
        for _ in 0..self.empty {
            stars.push_str(r#"<span class="star">★</span>"#);
        }
        stars
    }
}

pub fn format_club_date(date: NaiveDate) -> String {
    date.format(CLUB_DATE_FORMAT).to_string()
}

pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
