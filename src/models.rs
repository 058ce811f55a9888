//! Data models for food-safety media records.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`MediaItem`]: one normalized news, recall, or outbreak record
//! - [`Category`] and [`Severity`]: closed enumerations every item carries
//! - [`SourceId`]: the five upstream sources the aggregator knows about
//! - [`FetchOptions`]: the date window every adapter accepts
//!
//! The models serialize with camelCase field names to match the JSON schema
//! expected by the downstream scoring agent.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Heuristic category assigned to every media item.
///
/// Adapters assign a category from keyword scans of title, summary, and feed
/// tags, falling back to a source-specific default when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Category {
    Recall,
    Outbreak,
    Alert,
    Policy,
    Research,
}

/// Severity of a media item, derived from regulatory classification codes
/// (Class I/II/III) or keyword heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Numeric rank for comparisons and sort tiebreaks; lower is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }
}

/// One normalized food-safety record from any source.
///
/// Items start life inside a single source adapter and may be merged zero or
/// more times by the dedup engine into a richer composite carrying every
/// contributing source and URL.
///
/// # Invariants
///
/// - `sources` and `source_urls` are non-empty after creation
/// - `category` and `severity` are always set, even when heuristics were unsure
/// - `date`, when present, serializes as `YYYY-MM-DD`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Constant record-class tag, always `"media"`.
    pub source_type: String,
    /// Human-readable provider names that contributed to this record.
    pub sources: Vec<String>,
    /// Canonical URLs, one per contributing source.
    pub source_urls: Vec<String>,
    /// Headline or constructed title.
    pub title: String,
    /// Free-text summary; length bounded informally by upstream extraction.
    pub summary: String,
    /// Publication or report date; absent for undated listing-page items.
    pub date: Option<NaiveDate>,
    pub category: Category,
    pub severity: Severity,
    /// Canonical pathogen name, first vocabulary match in the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pathogen: Option<String>,
    /// Short product description, truncated to 100 chars with an ellipsis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// US two-letter state codes found in distribution text; `None` when the
    /// scan found nothing (distinct from an empty list on purpose).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall_number: Option<String>,
    /// Regulatory class string, e.g. `"Class I"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recalling_firm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Reported case count for outbreak items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_count: Option<u32>,
    /// Set when the item came from an undated listing page and carries no
    /// trustworthy date of its own.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub date_estimated: bool,
    /// Free-form tags, e.g. a magazine topic name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Internal clustering fingerprint; never serialized, cleared before the
    /// aggregator returns its final list.
    #[serde(skip)]
    pub dedup_key: Option<String>,
}

impl MediaItem {
    /// Create a bare media item attributed to one source.
    ///
    /// Adapters fill in the remaining fields after construction; the defaults
    /// here keep the category/severity invariants satisfied from the start.
    pub fn new(source: &str, url: &str, title: &str) -> Self {
        MediaItem {
            source_type: "media".to_string(),
            sources: vec![source.to_string()],
            source_urls: vec![url.to_string()],
            title: title.to_string(),
            summary: String::new(),
            date: None,
            category: Category::Alert,
            severity: Severity::Low,
            pathogen: None,
            product: None,
            states: None,
            recall_number: None,
            classification: None,
            recalling_firm: None,
            status: None,
            case_count: None,
            date_estimated: false,
            tags: Vec::new(),
            dedup_key: None,
        }
    }
}

/// The five upstream sources the aggregator can fan out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    /// Food Safety News RSS feed.
    Fsn,
    /// Food Safety Magazine topic feeds.
    Fsm,
    /// openFDA food enforcement API.
    Fda,
    /// FSIS recall listing page (with openFDA fallback).
    Fsis,
    /// CDC outbreak investigations, multi-strategy.
    Cdc,
}

impl SourceId {
    /// Every source, in the order the aggregator launches them.
    pub const ALL: [SourceId; 5] = [
        SourceId::Fsn,
        SourceId::Fsm,
        SourceId::Fda,
        SourceId::Fsis,
        SourceId::Cdc,
    ];

    /// Short identifier used on the CLI and in log fields.
    pub fn key(self) -> &'static str {
        match self {
            SourceId::Fsn => "fsn",
            SourceId::Fsm => "fsm",
            SourceId::Fda => "fda",
            SourceId::Fsis => "fsis",
            SourceId::Cdc => "cdc",
        }
    }
}

/// Date window accepted by every adapter.
///
/// `since` takes precedence over `days`; when neither is given each adapter
/// applies its own default window.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Look back this many days from today.
    pub days: Option<u32>,
    /// Absolute lower bound on publication date; overrides `days`.
    pub since: Option<NaiveDate>,
}

impl FetchOptions {
    /// Resolve the cutoff date: items strictly older than this are dropped.
    pub fn cutoff(&self, default_days: u32) -> NaiveDate {
        if let Some(since) = self.since {
            return since;
        }
        let days = self.days.unwrap_or(default_days);
        Local::now().date_naive() - chrono::Duration::days(i64::from(days))
    }

    /// True when the caller asked for a short window (one day or less) without
    /// pinning an explicit `since` date. Undated listing-page items are only
    /// tolerable for broader historical windows.
    pub fn is_short_window(&self) -> bool {
        self.since.is_none() && self.days.is_some_and(|d| d <= 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_invariants_on_creation() {
        let item = MediaItem::new("FDA", "https://api.example/recall/1", "Test recall");
        assert_eq!(item.source_type, "media");
        assert!(!item.sources.is_empty());
        assert!(!item.source_urls.is_empty());
    }

    #[test]
    fn test_media_item_serializes_camel_case() {
        let mut item = MediaItem::new("FDA", "https://api.example/recall/1", "Test");
        item.recall_number = Some("F-123-2026".to_string());
        item.date = NaiveDate::from_ymd_opt(2026, 8, 1);
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"sourceType\":\"media\""));
        assert!(json.contains("\"recallNumber\":\"F-123-2026\""));
        assert!(json.contains("\"date\":\"2026-08-01\""));
    }

    #[test]
    fn test_dedup_key_never_serialized() {
        let mut item = MediaItem::new("FDA", "https://api.example/recall/1", "Test");
        item.dedup_key = Some("testkey".to_string());
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("testkey"));
        assert!(!json.contains("dedupKey"));
    }

    #[test]
    fn test_absent_optionals_omitted() {
        let item = MediaItem::new("CDC", "https://cdc.example/x", "Test");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("pathogen"));
        assert!(!json.contains("caseCount"));
        assert!(!json.contains("dateEstimated"));
        assert!(json.contains("\"date\":null"));
    }

    #[test]
    fn test_severity_rank_ordering() {
        assert!(Severity::High.rank() < Severity::Medium.rank());
        assert!(Severity::Medium.rank() < Severity::Low.rank());
    }

    #[test]
    fn test_cutoff_since_overrides_days() {
        let opts = FetchOptions {
            days: Some(30),
            since: NaiveDate::from_ymd_opt(2026, 1, 15),
        };
        assert_eq!(opts.cutoff(7), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn test_cutoff_default_days() {
        let opts = FetchOptions::default();
        let expected = Local::now().date_naive() - chrono::Duration::days(7);
        assert_eq!(opts.cutoff(7), expected);
    }

    #[test]
    fn test_short_window_detection() {
        let short = FetchOptions { days: Some(1), since: None };
        assert!(short.is_short_window());
        let broad = FetchOptions { days: Some(7), since: None };
        assert!(!broad.is_short_window());
        let pinned = FetchOptions {
            days: Some(1),
            since: NaiveDate::from_ymd_opt(2026, 1, 1),
        };
        assert!(!pinned.is_short_window());
    }
}
