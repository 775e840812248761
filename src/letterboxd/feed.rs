use std::sync::LazyLock;

use regex::Regex;

use super::{FeedEntry, SyncError, letterboxd_url};

static ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<item>(.*?)</item>").expect("valid item regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<link>\s*(.*?)\s*</link>").expect("valid link regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title>(.*?)</title>").expect("valid title regex"));
static MEMBER_RATING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<letterboxd:memberRating>\s*([^<]*?)\s*</letterboxd:memberRating>")
        .expect("valid memberRating regex")
});
static FILM_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/film/([^/]+)/").expect("valid slug regex"));
static TITLE_STARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"★+½?").expect("valid stars regex"));

pub fn feed_url(reviewer: &str) -> String {
    letterboxd_url(&[reviewer, "rss"])
}

/// Download a reviewer's RSS feed and pull out the film entries.
pub async fn fetch_feed(client: &reqwest::Client, reviewer: &str) -> Result<Vec<FeedEntry>, SyncError> {
    let url = feed_url(reviewer);
    tracing::info!(%reviewer, %url, "fetching feed");

    let response = client.get(&url).send().await.map_err(|source| SyncError::Feed {
        reviewer: reviewer.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SyncError::FeedStatus {
            reviewer: reviewer.to_string(),
            status: status.as_u16(),
        });
    }

    let xml = response.text().await.map_err(|source| SyncError::Feed {
        reviewer: reviewer.to_string(),
        source,
    })?;

    let entries = parse_feed(&xml);
    for entry in &entries {
        tracing::debug!(%reviewer, slug = %entry.slug, rating = ?entry.rating, "feed entry");
    }
    Ok(entries)
}

/// Items whose link has no `/film/<slug>/` segment (lists, reviews of other things) are skipped.
pub fn parse_feed(xml: &str) -> Vec<FeedEntry> {
    ITEM.captures_iter(xml)
        .filter_map(|item| parse_item(&item[1]))
        .collect()
}

fn parse_item(item: &str) -> Option<FeedEntry> {
    let link = LINK.captures(item)?.get(1)?.as_str();
    let slug = extract_slug(link)?;

    let rating = MEMBER_RATING
        .captures(item)
        .and_then(|c| c[1].parse::<f64>().ok())
        .or_else(|| {
            TITLE
                .captures(item)
                .and_then(|c| rating_from_title(&c[1]))
        });

    Some(FeedEntry { slug, rating })
}

pub fn extract_slug(url: &str) -> Option<String> {
    FILM_SLUG.captures(url).map(|c| c[1].to_string())
}

/// `★★★½` → 3.5
pub fn rating_from_title(title: &str) -> Option<f64> {
    let stars = TITLE_STARS.find(title)?.as_str();
    let full = stars.chars().filter(|c| *c == '★').count() as f64;
    let half = if stars.ends_with('½') { 0.5 } else { 0.0 };
    Some(full + half)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:letterboxd="https://letterboxd.com">
  <channel>
    <title>Letterboxd - derschaki</title>
    <item>
      <title>Boiling Point, 2021 - ★★★★½</title>
      <link>https://letterboxd.com/derschaki/film/Boiling-Point-2021/</link>
      <letterboxd:memberRating>4.5</letterboxd:memberRating>
    </item>
    <item>
      <title>Heat, 1995 - ★★★</title>
      <link>https://letterboxd.com/derschaki/film/heat-1995/</link>
    </item>
    <item>
      <title>Ronin, 1998</title>
      <link>https://letterboxd.com/derschaki/film/ronin/</link>
    </item>
    <item>
      <title>Best of 2023</title>
      <link>https://letterboxd.com/derschaki/list/best-of-2023/</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_feed_url() {
        assert_eq!(feed_url("zebrastuhl"), "https://letterboxd.com/zebrastuhl/rss/");
    }

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(FEED);
        assert_eq!(
            entries,
            vec![
                FeedEntry {
                    slug: "Boiling-Point-2021".to_string(),
                    rating: Some(4.5),
                },
                FeedEntry {
                    slug: "heat-1995".to_string(),
                    rating: Some(3.0),
                },
                FeedEntry {
                    slug: "ronin".to_string(),
                    rating: None,
                },
            ]
        );
    }

    #[test]
    fn test_member_rating_falls_back_to_title_when_unparsable() {
        let item = r#"<item><title>Heat - ★★½</title>
            <link>https://letterboxd.com/x/film/heat/</link>
            <letterboxd:memberRating>n/a</letterboxd:memberRating></item>"#;
        let entries = parse_feed(item);
        assert_eq!(entries[0].rating, Some(2.5));
    }

    #[test]
    fn test_extract_slug() {
        assert_eq!(
            extract_slug("https://letterboxd.com/derschaki/film/boiling-point-2021/").as_deref(),
            Some("boiling-point-2021")
        );
        assert_eq!(extract_slug("https://letterboxd.com/derschaki/"), None);
    }

    #[test]
    fn test_rating_from_title() {
        assert_eq!(rating_from_title("Film - ★★★½"), Some(3.5));
        assert_eq!(rating_from_title("Film - ★"), Some(1.0));
        assert_eq!(rating_from_title("Film - ½"), None);
        assert_eq!(rating_from_title("Film"), None);
    }
}
