//! FSIS recall adapter: listing-page scrape with an openFDA fallback.
//!
//! FSIS publishes meat, poultry, and egg product recalls on a listing page
//! with no schema contract, so scraping is wrapped in a three-tier strategy:
//!
//! 1. Scrape the listing page for embedded structured data, then for an HTML
//!    table. Each page strategy returns `None` to signal "try the next one".
//! 2. If scraping yields nothing, query the openFDA enforcement API and keep
//!    only records whose product or recall reason mentions a meat/poultry/egg
//!    term. That recovers FSIS-domain records from a general-purpose source.
//! 3. If both tiers come up empty, return an empty list with a warning.
//!
//! Scraping is preferred when it works: the listing carries source-native
//! titles and dates the API cannot provide.

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::{info, instrument, warn};
use url::Url;

use crate::http;
use crate::models::{Category, FetchOptions, MediaItem};
use crate::normalize::{extract_pathogen, extract_states, infer_severity, strip_markup};
use crate::sources::fda;

pub const SOURCE_NAME: &str = "FSIS";
const RECALLS_URL: &str = "https://www.fsis.usda.gov/recalls";
const DEFAULT_DAYS: u32 = 7;
const FALLBACK_LIMIT: u32 = 100;

/// Meat, poultry, and egg terms used to pull FSIS-domain records out of the
/// general openFDA feed during fallback.
const PRODUCT_TERMS: &[&str] = &[
    "beef", "pork", "chicken", "turkey", "poultry", "meat", "sausage", "ham", "bacon", "hot dog",
    "jerky", "salami", "lamb", "veal", "duck", "egg",
];

/// One recall row recovered from the listing page, before normalization.
#[derive(Debug, Clone)]
struct RecallRow {
    title: String,
    url: String,
    date: Option<NaiveDate>,
    summary: String,
}

/// Ordered page strategies; the first to return `Some` wins.
type PageStrategy = fn(&Html) -> Option<Vec<RecallRow>>;

const PAGE_STRATEGIES: &[(&str, PageStrategy)] = &[
    ("embedded-json", rows_from_embedded_json),
    ("html-table", rows_from_table),
];

/// Fetch recent FSIS recalls.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, opts: &FetchOptions) -> Vec<MediaItem> {
    let cutoff = opts.cutoff(DEFAULT_DAYS);

    // Tier 1: scrape the listing page.
    match http::get_text(client, RECALLS_URL).await {
        Ok(html) => {
            let items = scrape_listing(&html, cutoff);
            if !items.is_empty() {
                info!(count = items.len(), %cutoff, "Scraped FSIS recall listing");
                return items;
            }
            info!(source = "fsis", "Listing scrape yielded no rows in window");
        }
        Err(e) => {
            warn!(source = "fsis", error = %e, "Listing page fetch failed");
        }
    }

    // Tier 2: recover FSIS-domain records from openFDA.
    info!(source = "fsis", "Falling back to openFDA keyword filter");
    match fda::query_enforcement(client, cutoff, FALLBACK_LIMIT).await {
        Ok(records) => {
            let items: Vec<MediaItem> = records
                .iter()
                .filter(|record| matches_product_vocabulary(record))
                .map(|record| fda::item_from_record(record, SOURCE_NAME))
                .collect();
            if !items.is_empty() {
                info!(count = items.len(), "Recovered FSIS records via openFDA fallback");
                return items;
            }
        }
        Err(e) => {
            warn!(source = "fsis", error = %e, "openFDA fallback failed");
        }
    }

    // Tier 3: nothing worked this run.
    warn!(source = "fsis", "All retrieval strategies came up empty");
    Vec::new()
}

/// Run the page strategies in order and normalize whatever the first
/// successful one recovered, filtered to the cutoff window.
fn scrape_listing(html: &str, cutoff: NaiveDate) -> Vec<MediaItem> {
    let document = Html::parse_document(html);

    for (name, strategy) in PAGE_STRATEGIES {
        if let Some(rows) = strategy(&document) {
            info!(strategy = name, rows = rows.len(), "Page strategy matched");
            return rows
                .into_iter()
                .filter(|row| row.date.is_some_and(|date| date >= cutoff))
                .map(item_from_row)
                .collect();
        }
    }
    Vec::new()
}

/// Strategy 1: `application/ld+json` blocks carrying an `ItemList`.
fn rows_from_embedded_json(document: &Html) -> Option<Vec<RecallRow>> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    let mut rows = Vec::new();

    for script in document.select(&selector) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            continue;
        };
        let Some(elements) = value.get("itemListElement").and_then(|v| v.as_array()) else {
            continue;
        };
        for element in elements {
            let entry = element.get("item").unwrap_or(element);
            let (Some(name), Some(url)) = (
                entry.get("name").and_then(|v| v.as_str()),
                entry.get("url").and_then(|v| v.as_str()),
            ) else {
                continue;
            };
            rows.push(RecallRow {
                title: name.to_string(),
                url: url.to_string(),
                date: entry
                    .get("datePublished")
                    .and_then(|v| v.as_str())
                    .and_then(parse_listing_date),
                summary: entry
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            });
        }
    }

    if rows.is_empty() { None } else { Some(rows) }
}

/// Strategy 2: a plain HTML table of recall rows.
fn rows_from_table(document: &Html) -> Option<Vec<RecallRow>> {
    let row_selector = Selector::parse("table tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a[href]").unwrap();
    let base = Url::parse(RECALLS_URL).unwrap();

    let mut rows = Vec::new();
    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            // Header row.
            continue;
        }
        let Some(link) = row.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(url) = base.join(href) else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            continue;
        }

        let cell_texts: Vec<String> = cells
            .iter()
            .map(|cell| strip_markup(&cell.html()))
            .collect();
        let date = cell_texts.iter().find_map(|text| parse_listing_date(text));
        let summary = cell_texts
            .iter()
            .filter(|text| !text.is_empty() && **text != title)
            .cloned()
            .collect::<Vec<_>>()
            .join("; ");

        rows.push(RecallRow {
            title,
            url: url.to_string(),
            date,
            summary,
        });
    }

    if rows.is_empty() { None } else { Some(rows) }
}

/// Listing pages mix date formats; try the ones FSIS has actually used.
fn parse_listing_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%m/%d/%Y", "%b %d, %Y", "%B %d, %Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn item_from_row(row: RecallRow) -> MediaItem {
    let scan_text = format!("{} {}", row.title, row.summary);

    let mut item = MediaItem::new(SOURCE_NAME, &row.url, &row.title);
    item.summary = row.summary;
    item.date = row.date;
    item.category = Category::Recall;
    item.severity = infer_severity(&scan_text);
    item.pathogen = extract_pathogen(&scan_text);
    item.states = extract_states(&scan_text);
    item.dedup_key = crate::dedup::dedup_key(&item);
    item
}

fn matches_product_vocabulary(record: &fda::EnforcementRecord) -> bool {
    let haystack = format!(
        "{} {}",
        record.product_description.as_deref().unwrap_or_default(),
        record.reason_for_recall.as_deref().unwrap_or_default()
    )
    .to_lowercase();
    PRODUCT_TERMS.iter().any(|term| haystack.contains(term))
}
