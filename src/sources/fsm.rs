//! Food Safety Magazine topic-feed adapter.
//!
//! The magazine publishes independent RSS feeds per editorial topic. This
//! adapter fetches the configured topics in parallel, isolates per-feed
//! failures (one broken topic never blocks the others), deduplicates by URL
//! within its own run, and returns the union sorted newest-first.

use chrono::NaiveDate;
use futures::future::join_all;
use itertools::Itertools;
use tracing::{info, instrument, warn};

use crate::http;
use crate::models::{Category, FetchOptions, MediaItem};
use crate::normalize::{extract_pathogen, infer_category, infer_severity, strip_markup};
use crate::rss::{self, FeedItem};

pub const SOURCE_NAME: &str = "Food Safety Magazine";
const DEFAULT_DAYS: u32 = 7;

/// One editorial topic feed: slug (CLI selector), display name (becomes the
/// item tag), feed URL, and the category to fall back on when the keyword
/// scan is inconclusive.
struct Topic {
    slug: &'static str,
    name: &'static str,
    feed_url: &'static str,
    default_category: Category,
}

const TOPICS: &[Topic] = &[
    Topic {
        slug: "recalls",
        name: "Recalls & Alerts",
        feed_url: "https://www.food-safety.com/rss/topic/recalls-alerts",
        default_category: Category::Recall,
    },
    Topic {
        slug: "pathogens",
        name: "Food Pathogens",
        feed_url: "https://www.food-safety.com/rss/topic/food-pathogens",
        default_category: Category::Outbreak,
    },
    Topic {
        slug: "regulatory",
        name: "Regulatory",
        feed_url: "https://www.food-safety.com/rss/topic/regulatory",
        default_category: Category::Policy,
    },
    Topic {
        slug: "testing",
        name: "Testing & Analysis",
        feed_url: "https://www.food-safety.com/rss/topic/testing-analysis",
        default_category: Category::Research,
    },
];

/// Fetch every configured topic feed.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, opts: &FetchOptions) -> Vec<MediaItem> {
    fetch_topics(client, opts, None).await
}

/// Fetch a subset of topic feeds, selected by slug; `None` means all.
///
/// Unknown slugs are logged and skipped rather than failing the run.
#[instrument(level = "info", skip_all)]
pub async fn fetch_topics(
    client: &reqwest::Client,
    opts: &FetchOptions,
    topics: Option<&[String]>,
) -> Vec<MediaItem> {
    let cutoff = opts.cutoff(DEFAULT_DAYS);

    let selected: Vec<&Topic> = match topics {
        Some(slugs) => {
            for slug in slugs {
                if !TOPICS.iter().any(|t| t.slug == slug) {
                    warn!(source = "fsm", topic = %slug, "Unknown topic slug; skipping");
                }
            }
            TOPICS
                .iter()
                .filter(|t| slugs.iter().any(|s| s == t.slug))
                .collect()
        }
        None => TOPICS.iter().collect(),
    };

    let fetches = selected
        .iter()
        .map(|topic| fetch_topic(client, topic, cutoff));
    let per_topic = join_all(fetches).await;

    let mut items: Vec<MediaItem> = per_topic
        .into_iter()
        .flatten()
        .unique_by(|item| item.source_urls[0].clone())
        .collect();
    items.sort_by(|a, b| b.date.cmp(&a.date));

    info!(count = items.len(), %cutoff, "Fetched Food Safety Magazine items");
    items
}

/// Fetch and normalize a single topic feed; failures log and yield empty.
async fn fetch_topic(client: &reqwest::Client, topic: &Topic, cutoff: NaiveDate) -> Vec<MediaItem> {
    let xml = match http::get_text(client, topic.feed_url).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(source = "fsm", topic = topic.slug, error = %e, "Topic feed fetch failed");
            return Vec::new();
        }
    };
    let entries = match rss::parse_rss(&xml) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(source = "fsm", topic = topic.slug, error = %e, "Topic feed parse failed");
            return Vec::new();
        }
    };

    entries
        .iter()
        .filter(|entry| entry.pub_date.is_some_and(|date| date >= cutoff))
        .map(|entry| item_from_entry(entry, topic))
        .collect()
}

fn item_from_entry(entry: &FeedItem, topic: &Topic) -> MediaItem {
    let summary = strip_markup(&entry.description);
    let scan_text = format!("{} {}", entry.title, summary);

    let mut item = MediaItem::new(SOURCE_NAME, &entry.link, &entry.title);
    item.summary = summary;
    item.date = entry.pub_date;
    item.category = infer_category(&scan_text, topic.default_category);
    item.severity = infer_severity(&scan_text);
    item.pathogen = extract_pathogen(&scan_text);
    item.tags = vec![topic.name.to_string()];
    item.dedup_key = crate::dedup::dedup_key(&item);
    item
}
