//! Food Safety News RSS adapter.
//!
//! [Food Safety News](https://www.foodsafetynews.com) publishes a standard
//! RSS 2.0 feed of its daily reporting. This adapter parses the feed, keeps
//! items published on or after the cutoff, and classifies each one from
//! keyword scans of the title, description, and feed categories.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::http;
use crate::models::{Category, FetchOptions, MediaItem};
use crate::normalize::{
    extract_case_count, extract_pathogen, extract_states, infer_category, infer_severity,
    strip_markup,
};
use crate::rss::{self, FeedItem};

pub const SOURCE_NAME: &str = "Food Safety News";
const FEED_URL: &str = "https://www.foodsafetynews.com/feed/";
const DEFAULT_DAYS: u32 = 7;

/// Fetch recent Food Safety News items.
///
/// Transport or parse failures are logged and yield an empty list.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, opts: &FetchOptions) -> Vec<MediaItem> {
    let cutoff = opts.cutoff(DEFAULT_DAYS);

    let xml = match http::get_text(client, FEED_URL).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(source = "fsn", error = %e, "Feed fetch failed");
            return Vec::new();
        }
    };

    let entries = match rss::parse_rss(&xml) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(source = "fsn", error = %e, "Feed parse failed");
            return Vec::new();
        }
    };

    let items = items_since(&entries, cutoff);
    info!(count = items.len(), %cutoff, "Fetched Food Safety News items");
    items
}

/// Keep entries published on or after `cutoff` and normalize them.
///
/// Undated entries cannot satisfy the window and are dropped.
fn items_since(entries: &[FeedItem], cutoff: NaiveDate) -> Vec<MediaItem> {
    entries
        .iter()
        .filter(|entry| entry.pub_date.is_some_and(|date| date >= cutoff))
        .map(item_from_entry)
        .collect()
}

/// Normalize one feed entry into a [`MediaItem`].
fn item_from_entry(entry: &FeedItem) -> MediaItem {
    let summary = strip_markup(&entry.description);
    let scan_text = format!("{} {} {}", entry.title, summary, entry.categories.join(" "));

    let mut item = MediaItem::new(SOURCE_NAME, &entry.link, &entry.title);
    item.summary = summary.clone();
    item.date = entry.pub_date;
    item.category = infer_category(&scan_text, Category::Research);
    item.severity = infer_severity(&scan_text);
    item.pathogen = extract_pathogen(&scan_text);
    item.states = extract_states(&summary);
    if item.category == Category::Outbreak {
        item.case_count = extract_case_count(&summary);
    }
    item.tags = entry.categories.clone();
    item.dedup_key = crate::dedup::dedup_key(&item);
    item
}
