//! CDC outbreak adapter: three independent retrieval strategies.
//!
//! CDC publishes outbreak investigations in several places, none of them
//! complete on its own, so this adapter runs three strategies concurrently
//! and unions the results:
//!
//! - **(a) media search API**: the `tools.cdc.gov` content syndication API,
//!   queried with several topic phrasings and filtered by date and a
//!   relevance regex over title and description.
//! - **(b) listing pages**: a small set of known outbreak listing URLs,
//!   scraped for outbreak-looking anchor text and tried in order until one
//!   yields results. These pages carry no dates, so their items are flagged
//!   `date_estimated` and dropped entirely for short (one day) windows.
//! - **(c) podcast/RSS feeds**: filtered by date like the news adapter.
//!
//! Each strategy fails independently; the adapter is empty only when all
//! three produced nothing.

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use url::Url;

use crate::http;
use crate::models::{Category, FetchOptions, MediaItem};
use crate::normalize::{
    extract_case_count, extract_pathogen, extract_states, infer_severity, strip_markup,
};
use crate::rss::{self, FeedItem, parse_feed_date};

pub const SOURCE_NAME: &str = "CDC";
const DEFAULT_DAYS: u32 = 7;

const MEDIA_SEARCH_URL: &str = "https://tools.cdc.gov/api/v2/resources/media";
const MEDIA_SEARCH_QUERIES: &[&str] = &[
    "foodborne outbreak",
    "food poisoning outbreak",
    "multistate outbreak investigation",
];
const MEDIA_SEARCH_MAX: u32 = 20;

const LISTING_PAGES: &[&str] = &[
    "https://www.cdc.gov/foodborne-outbreaks/active-investigations/index.html",
    "https://www.cdc.gov/foodsafety/outbreaks/lists/outbreaks-list.html",
];

const FEED_URLS: &[&str] = &["https://www2c.cdc.gov/podcasts/createrss.asp?c=146"];

/// Anchor text and search results must look outbreak-related to count.
static RELEVANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(outbreak|investigation|recall|illness(es)?|salmonella|listeria|e\.?\s?coli)\b")
        .unwrap()
});

/// Listing-page anchors shorter than this are navigation, not stories.
const MIN_ANCHOR_LEN: usize = 20;

/// Fetch recent CDC outbreak reports via all three strategies.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, opts: &FetchOptions) -> Vec<MediaItem> {
    let cutoff = opts.cutoff(DEFAULT_DAYS);

    let (search_items, listing_items, feed_items) = tokio::join!(
        fetch_media_search(client, cutoff),
        fetch_listing_pages(client),
        fetch_feeds(client, cutoff),
    );
    info!(
        search = search_items.len(),
        listing = listing_items.len(),
        feeds = feed_items.len(),
        "CDC strategies settled"
    );

    let mut seen = HashSet::new();
    let mut items: Vec<MediaItem> = Vec::new();
    for item in search_items
        .into_iter()
        .chain(listing_items)
        .chain(feed_items)
    {
        let key = item
            .dedup_key
            .clone()
            .unwrap_or_else(|| item.source_urls[0].clone());
        if seen.insert(key) {
            items.push(item);
        }
    }

    if opts.is_short_window() {
        let before = items.len();
        items.retain(|item| !item.date_estimated);
        if items.len() < before {
            info!(
                dropped = before - items.len(),
                "Dropped undated listing-page items for short window"
            );
        }
    }

    info!(count = items.len(), %cutoff, "Fetched CDC outbreak items");
    items
}

// ---- Strategy (a): media search API ----

/// One syndicated resource from the media search API.
#[derive(Debug, Clone, Deserialize)]
struct MediaResource {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "sourceUrl")]
    source_url: Option<String>,
    #[serde(default, rename = "dateModified")]
    date_modified: Option<String>,
    #[serde(default, rename = "datePublished")]
    date_published: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaSearchResponse {
    #[serde(default)]
    results: Vec<MediaResource>,
}

async fn fetch_media_search(client: &reqwest::Client, cutoff: NaiveDate) -> Vec<MediaItem> {
    let queries = MEDIA_SEARCH_QUERIES
        .iter()
        .map(|query| run_media_query(client, query, cutoff));
    join_all(queries).await.into_iter().flatten().collect()
}

async fn run_media_query(
    client: &reqwest::Client,
    query: &str,
    cutoff: NaiveDate,
) -> Vec<MediaItem> {
    let url = format!(
        "{MEDIA_SEARCH_URL}?q={}&max={MEDIA_SEARCH_MAX}",
        urlencoding::encode(query)
    );
    let response = match client.get(&url).send().await.and_then(|r| r.error_for_status()) {
        Ok(response) => response,
        Err(e) => {
            warn!(source = "cdc", strategy = "search", %query, error = %e, "Media search failed");
            return Vec::new();
        }
    };
    let payload: MediaSearchResponse = match response.json().await {
        Ok(payload) => payload,
        Err(e) => {
            warn!(source = "cdc", strategy = "search", %query, error = %e, "Media search parse failed");
            return Vec::new();
        }
    };
    items_from_media_results(&payload.results, cutoff)
}

/// Filter search results by date and relevance, then normalize.
fn items_from_media_results(results: &[MediaResource], cutoff: NaiveDate) -> Vec<MediaItem> {
    results
        .iter()
        .filter_map(|resource| {
            let url = resource.source_url.as_deref()?;
            // Modified-or-published: whichever the API filled in first.
            let date = resource
                .date_modified
                .as_deref()
                .or(resource.date_published.as_deref())
                .and_then(parse_feed_date)?;
            if date < cutoff {
                return None;
            }
            let scan_text = format!("{} {}", resource.name, resource.description);
            if !RELEVANCE_RE.is_match(&scan_text) {
                return None;
            }
            Some(outbreak_item(
                &resource.name,
                url,
                &strip_markup(&resource.description),
                Some(date),
                false,
            ))
        })
        .collect()
}

// ---- Strategy (b): listing pages ----

/// Try each listing page in order; the first that yields anchors wins.
async fn fetch_listing_pages(client: &reqwest::Client) -> Vec<MediaItem> {
    for page_url in LISTING_PAGES {
        match http::get_text(client, page_url).await {
            Ok(html) => {
                let items = items_from_listing(&html, page_url);
                if !items.is_empty() {
                    info!(page = page_url, count = items.len(), "Listing page yielded items");
                    return items;
                }
            }
            Err(e) => {
                warn!(source = "cdc", strategy = "listing", page = page_url, error = %e, "Listing fetch failed");
            }
        }
    }
    Vec::new()
}

/// Pull outbreak-looking anchors out of a listing page.
///
/// The pages carry no per-item dates, so everything here is `date: None`
/// with `date_estimated` set.
fn items_from_listing(html: &str, page_url: &str) -> Vec<MediaItem> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let mut seen_urls = HashSet::new();
    let mut items = Vec::new();
    for anchor in document.select(&anchor_selector) {
        let text = anchor.text().collect::<String>().trim().to_string();
        if text.len() < MIN_ANCHOR_LEN || !RELEVANCE_RE.is_match(&text) {
            continue;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };
        if !seen_urls.insert(url.to_string()) {
            continue;
        }
        items.push(outbreak_item(&text, url.as_str(), "", None, true));
    }
    items
}

// ---- Strategy (c): podcast/RSS feeds ----

async fn fetch_feeds(client: &reqwest::Client, cutoff: NaiveDate) -> Vec<MediaItem> {
    let fetches = FEED_URLS.iter().map(|url| fetch_feed(client, url, cutoff));
    join_all(fetches).await.into_iter().flatten().collect()
}

async fn fetch_feed(client: &reqwest::Client, url: &str, cutoff: NaiveDate) -> Vec<MediaItem> {
    let xml = match http::get_text(client, url).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(source = "cdc", strategy = "feed", feed = url, error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };
    match rss::parse_rss(&xml) {
        Ok(entries) => items_from_feed_entries(&entries, cutoff),
        Err(e) => {
            warn!(source = "cdc", strategy = "feed", feed = url, error = %e, "Feed parse failed");
            Vec::new()
        }
    }
}

/// Date-filter feed entries the same way the news adapter does.
fn items_from_feed_entries(entries: &[FeedItem], cutoff: NaiveDate) -> Vec<MediaItem> {
    entries
        .iter()
        .filter(|entry| entry.pub_date.is_some_and(|date| date >= cutoff))
        .map(|entry| {
            outbreak_item(
                &entry.title,
                &entry.link,
                &strip_markup(&entry.description),
                entry.pub_date,
                false,
            )
        })
        .collect()
}

// ---- Shared normalization ----

fn outbreak_item(
    title: &str,
    url: &str,
    summary: &str,
    date: Option<NaiveDate>,
    date_estimated: bool,
) -> MediaItem {
    let scan_text = format!("{title} {summary}");

    let mut item = MediaItem::new(SOURCE_NAME, url, title);
    item.summary = summary.to_string();
    item.date = date;
    item.date_estimated = date_estimated;
    item.category = Category::Outbreak;
    item.severity = infer_severity(&scan_text);
    item.pathogen = extract_pathogen(&scan_text);
    item.states = extract_states(&scan_text);
    item.case_count = extract_case_count(&scan_text);
    item.dedup_key = crate::dedup::dedup_key(&item);
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn resource(name: &str, url: &str, modified: &str) -> MediaResource {
        MediaResource {
            name: name.to_string(),
            description: "Multistate investigation details".to_string(),
            source_url: Some(url.to_string()),
            date_modified: Some(modified.to_string()),
            date_published: None,
        }
    }

    #[test]
    fn test_media_results_filtered_by_date_and_relevance() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let results = vec![
            resource(
                "Salmonella Outbreak Linked to Cucumbers",
                "https://www.cdc.gov/salmonella/cucumbers",
                "2026-08-20T10:00:00Z",
            ),
            resource(
                "Salmonella Outbreak Archive",
                "https://www.cdc.gov/salmonella/archive",
                "2026-01-01T10:00:00Z",
            ),
            MediaResource {
                name: "Healthy Swimming Tips".to_string(),
                description: "Pool safety advice".to_string(),
                source_url: Some("https://www.cdc.gov/swimming".to_string()),
                date_modified: Some("2026-08-20T10:00:00Z".to_string()),
                date_published: None,
            },
        ];
        let items = items_from_media_results(&results, cutoff);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Salmonella Outbreak Linked to Cucumbers");
        assert_eq!(items[0].pathogen, Some("Salmonella".to_string()));
        assert_eq!(items[0].category, Category::Outbreak);
        assert!(!items[0].date_estimated);
    }

    #[test]
    fn test_media_result_without_url_skipped() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let mut r = resource("Outbreak update", "https://x", "2026-08-20T00:00:00Z");
        r.source_url = None;
        assert!(items_from_media_results(&[r], cutoff).is_empty());
    }

    #[test]
    fn test_listing_items_undated_and_flagged() {
        let html = r#"<html><body>
          <nav><a href="/outbreaks">Outbreaks</a></nav>
          <ul>
            <li><a href="/listeria/peaches/index.html">Listeria Outbreak Linked to Peaches, 14 cases reported</a></li>
            <li><a href="/about">About this page</a></li>
          </ul>
        </body></html>"#;
        let items = items_from_listing(html, "https://www.cdc.gov/foodsafety/outbreaks/lists/outbreaks-list.html");
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.date, None);
        assert!(item.date_estimated);
        assert_eq!(item.case_count, Some(14));
        assert_eq!(item.pathogen, Some("Listeria".to_string()));
        assert_eq!(
            item.source_urls[0],
            "https://www.cdc.gov/listeria/peaches/index.html"
        );
        // "outbreak" keyword puts listing items at medium severity.
        assert_eq!(item.severity, Severity::Medium);
    }

    #[test]
    fn test_short_window_drops_undated_items() {
        let opts = FetchOptions { days: Some(1), since: None };
        assert!(opts.is_short_window());

        let dated = outbreak_item(
            "Salmonella outbreak update",
            "https://www.cdc.gov/a",
            "",
            NaiveDate::from_ymd_opt(2026, 8, 20),
            false,
        );
        let undated = outbreak_item(
            "Listeria outbreak investigation",
            "https://www.cdc.gov/b",
            "",
            None,
            true,
        );

        let mut items = vec![dated, undated];
        if opts.is_short_window() {
            items.retain(|item| !item.date_estimated);
        }
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Salmonella outbreak update");
    }

    #[test]
    fn test_feed_entries_filtered_like_news() {
        let cutoff = NaiveDate::from_ymd_opt(2026, 8, 15).unwrap();
        let entries = vec![
            FeedItem {
                title: "Outbreak investigation update".to_string(),
                link: "https://www2c.cdc.gov/podcasts/1".to_string(),
                description: "23 cases across 5 states".to_string(),
                pub_date: NaiveDate::from_ymd_opt(2026, 8, 18),
                categories: vec![],
            },
            FeedItem {
                title: "Stale episode".to_string(),
                link: "https://www2c.cdc.gov/podcasts/2".to_string(),
                description: String::new(),
                pub_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                categories: vec![],
            },
        ];
        let items = items_from_feed_entries(&entries, cutoff);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].case_count, Some(23));
    }

    #[test]
    fn test_union_dedup_by_key() {
        // The same investigation reaching us via search and a feed collapses
        // to one item on the shared dedup key.
        let a = outbreak_item(
            "Salmonella Outbreak Linked to Cucumbers",
            "https://www.cdc.gov/salmonella/cucumbers",
            "",
            NaiveDate::from_ymd_opt(2026, 8, 20),
            false,
        );
        let b = outbreak_item(
            "Salmonella Outbreak Linked to Cucumbers",
            "https://www2c.cdc.gov/podcasts/episode-99",
            "",
            NaiveDate::from_ymd_opt(2026, 8, 20),
            false,
        );

        let mut seen = HashSet::new();
        let unioned: Vec<MediaItem> = vec![a, b]
            .into_iter()
            .filter(|item| seen.insert(item.dedup_key.clone().unwrap()))
            .collect();
        assert_eq!(unioned.len(), 1);
    }
}
