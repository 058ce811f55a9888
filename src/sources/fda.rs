//! openFDA food enforcement adapter.
//!
//! Queries the [openFDA](https://open.fda.gov) food enforcement endpoint for
//! recalls whose report date falls inside the requested window. The API
//! signals "no matches" with an HTTP 404 rather than an empty result set,
//! which this adapter treats as a valid empty response.

use std::error::Error;

use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::models::{Category, FetchOptions, MediaItem};
use crate::normalize::{
    classification_to_severity, extract_pathogen, extract_states, truncate_product,
};

pub const SOURCE_NAME: &str = "FDA";
const API_URL: &str = "https://api.fda.gov/food/enforcement.json";
const DEFAULT_DAYS: u32 = 7;
const DEFAULT_LIMIT: u32 = 100;

/// One enforcement report as returned by openFDA. Every field is optional in
/// practice; the API omits keys freely.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EnforcementRecord {
    #[serde(default)]
    pub recall_number: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub reason_for_recall: Option<String>,
    #[serde(default)]
    pub recalling_firm: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub distribution_pattern: Option<String>,
    /// Report date in the API's compact `YYYYMMDD` form.
    #[serde(default)]
    pub report_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EnforcementResponse {
    #[serde(default)]
    results: Vec<EnforcementRecord>,
}

/// Fetch recent FDA food enforcement reports.
#[instrument(level = "info", skip_all)]
pub async fn fetch(client: &reqwest::Client, opts: &FetchOptions) -> Vec<MediaItem> {
    fetch_limit(client, opts, DEFAULT_LIMIT).await
}

/// Fetch with an explicit result cap (the CLI's `--limit`).
pub async fn fetch_limit(
    client: &reqwest::Client,
    opts: &FetchOptions,
    limit: u32,
) -> Vec<MediaItem> {
    let cutoff = opts.cutoff(DEFAULT_DAYS);

    let records = match query_enforcement(client, cutoff, limit).await {
        Ok(records) => records,
        Err(e) => {
            warn!(source = "fda", error = %e, "Enforcement query failed");
            return Vec::new();
        }
    };

    let items: Vec<MediaItem> = records
        .iter()
        .map(|record| item_from_record(record, SOURCE_NAME))
        .collect();
    info!(count = items.len(), %cutoff, "Fetched FDA enforcement reports");
    items
}

/// Query the enforcement endpoint for reports between `cutoff` and today.
///
/// Shared with the FSIS adapter's fallback tier. An HTTP 404 is the API's
/// way of saying "no matches" and maps to `Ok(vec![])`.
pub(crate) async fn query_enforcement(
    client: &reqwest::Client,
    cutoff: NaiveDate,
    limit: u32,
) -> Result<Vec<EnforcementRecord>, Box<dyn Error>> {
    let today = Local::now().date_naive();
    let search = format!(
        "report_date:[{} TO {}]",
        cutoff.format("%Y%m%d"),
        today.format("%Y%m%d")
    );

    let response = client
        .get(API_URL)
        .query(&[("search", search.as_str()), ("limit", &limit.to_string())])
        .send()
        .await?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        debug!(source = "fda", "openFDA returned 404: no reports in window");
        return Ok(Vec::new());
    }

    let payload: EnforcementResponse = response.error_for_status()?.json().await?;
    Ok(payload.results)
}

/// Normalize one enforcement record, attributing it to `source` (the FSIS
/// fallback reuses this with its own label).
pub(crate) fn item_from_record(record: &EnforcementRecord, source: &str) -> MediaItem {
    let firm = record.recalling_firm.as_deref().unwrap_or("Unknown Firm");
    let product = record
        .product_description
        .as_deref()
        .map(truncate_product);
    let title = match (&product, &record.classification) {
        (Some(product), Some(class)) => format!("{firm} Recalls {product} ({class})"),
        (Some(product), None) => format!("{firm} Recalls {product}"),
        (None, _) => format!("{firm} Issues Food Recall"),
    };

    let url = record_url(record);
    let reason = record.reason_for_recall.clone().unwrap_or_default();

    let mut item = MediaItem::new(source, &url, &title);
    item.summary = reason.clone();
    item.date = record
        .report_date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y%m%d").ok());
    item.category = Category::Recall;
    item.severity = classification_to_severity(record.classification.as_deref());
    item.pathogen = extract_pathogen(&reason);
    item.product = product;
    item.states = record
        .distribution_pattern
        .as_deref()
        .and_then(extract_states);
    item.recall_number = record.recall_number.clone();
    item.classification = record.classification.clone();
    item.recalling_firm = record.recalling_firm.clone();
    item.status = record.status.clone();
    item.dedup_key = crate::dedup::dedup_key(&item);
    item
}

/// Stable per-record URL. openFDA has no browsable page per report, so the
/// canonical link is the API query pinned to the recall number.
fn record_url(record: &EnforcementRecord) -> String {
    match &record.recall_number {
        Some(number) => format!(
            "{API_URL}?search=recall_number:%22{}%22",
            urlencoding::encode(number)
        ),
        None => {
            let firm = record.recalling_firm.as_deref().unwrap_or("unknown");
            let date = record.report_date.as_deref().unwrap_or("undated");
            format!("{API_URL}#{}-{date}", urlencoding::encode(firm))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn record() -> EnforcementRecord {
        serde_json::from_str(
            r#"{
                "recall_number": "F-0123-2026",
                "classification": "Class I",
                "product_description": "Frozen ground beef patties, 2 lb boxes",
                "reason_for_recall": "Product may be contaminated with E. coli O157:H7",
                "recalling_firm": "Acme Foods",
                "status": "Ongoing",
                "distribution_pattern": "CA, NY, and TX retail locations",
                "report_date": "20260818"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_item_from_record_full() {
        let item = item_from_record(&record(), SOURCE_NAME);
        assert_eq!(item.title, "Acme Foods Recalls Frozen ground beef patties, 2 lb boxes (Class I)");
        assert_eq!(item.category, Category::Recall);
        assert_eq!(item.severity, Severity::High);
        assert_eq!(item.pathogen, Some("E. coli".to_string()));
        assert_eq!(
            item.states,
            Some(vec!["CA".to_string(), "NY".to_string(), "TX".to_string()])
        );
        assert_eq!(item.recall_number, Some("F-0123-2026".to_string()));
        assert_eq!(item.date, NaiveDate::from_ymd_opt(2026, 8, 18));
        assert_eq!(item.dedup_key, Some("f-0123-2026".to_string()));
    }

    #[test]
    fn test_classification_maps_to_severity() {
        let mut r = record();
        r.classification = Some("Class III".to_string());
        assert_eq!(item_from_record(&r, SOURCE_NAME).severity, Severity::Low);
        r.classification = None;
        assert_eq!(item_from_record(&r, SOURCE_NAME).severity, Severity::Medium);
    }

    #[test]
    fn test_sparse_record_still_valid() {
        let r: EnforcementRecord = serde_json::from_str("{}").unwrap();
        let item = item_from_record(&r, SOURCE_NAME);
        assert_eq!(item.title, "Unknown Firm Issues Food Recall");
        assert!(!item.sources.is_empty());
        assert!(!item.source_urls.is_empty());
        assert_eq!(item.severity, Severity::Medium);
        assert_eq!(item.date, None);
    }

    #[test]
    fn test_record_url_pins_recall_number() {
        let url = record_url(&record());
        assert!(url.contains("recall_number"));
        assert!(url.contains("F-0123-2026"));
    }

    #[test]
    fn test_response_parse_empty_results() {
        let payload: EnforcementResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(payload.results.is_empty());
        let missing: EnforcementResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.results.is_empty());
    }
}
