//! Duplicate detection and merging across sources.
//!
//! Different outlets report the same recall or outbreak with different
//! headlines, URLs, and levels of detail. This module decides when two
//! [`MediaItem`]s describe the same real-world event and folds them into one
//! composite record that keeps the best fields from each.
//!
//! # Matching
//!
//! [`are_duplicates`] is a disjunction of independent signals: any single
//! match is sufficient. There is no weighted score.
//!
//! # Clustering
//!
//! [`deduplicate_and_merge`] is a greedy single pass: each incoming item is
//! tested against the running merged representative of every existing cluster
//! and merged into the first that matches. Matching against the representative
//! (rather than the cluster's original constituents) lets chains like
//! A~B, B~C collapse into one cluster even when A and C do not match directly.

use std::collections::HashSet;

use tracing::debug;

use crate::models::MediaItem;

/// Build the internal clustering fingerprint for an item.
///
/// Recall numbers are stable identifiers and win outright; otherwise the key
/// is a lowercased, alphanumeric-only prefix of the title capped at 60 chars.
pub fn dedup_key(item: &MediaItem) -> Option<String> {
    if let Some(number) = &item.recall_number {
        return Some(number.to_lowercase());
    }
    let normalized: String = item
        .title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(60)
        .collect();
    if normalized.is_empty() { None } else { Some(normalized) }
}

/// Word-overlap similarity between two free-text strings.
///
/// Tokens are lowercased, stripped of non-alphanumerics, and dropped when two
/// characters or shorter. The score is `|intersection| / min(|a|, |b|)`, an
/// asymmetric Jaccard against the smaller set, so a short title matches a
/// longer one that contains all of its words.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let shared = tokens_a.intersection(&tokens_b).count();
    shared as f64 / tokens_a.len().min(tokens_b.len()) as f64
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|token| token.len() > 2)
        .collect()
}

/// Decide whether two items describe the same real-world event.
///
/// Evaluates, in order, any of:
/// 1. equal non-empty recall numbers
/// 2. any shared source URL
/// 3. equal dedup keys
/// 4. same pathogen and product similarity above 0.5
/// 5. title similarity above 0.6
/// 6. equal recalling firm, case-insensitive
pub fn are_duplicates(a: &MediaItem, b: &MediaItem) -> bool {
    if let (Some(ra), Some(rb)) = (&a.recall_number, &b.recall_number) {
        if ra == rb {
            return true;
        }
    }

    if a.source_urls.iter().any(|url| b.source_urls.contains(url)) {
        return true;
    }

    if let (Some(ka), Some(kb)) = (&a.dedup_key, &b.dedup_key) {
        if ka == kb {
            return true;
        }
    }

    if let (Some(pa), Some(pb)) = (&a.pathogen, &b.pathogen) {
        if pa == pb {
            if let (Some(prod_a), Some(prod_b)) = (&a.product, &b.product) {
                if text_similarity(prod_a, prod_b) > 0.5 {
                    return true;
                }
            }
        }
    }

    if text_similarity(&a.title, &b.title) > 0.6 {
        return true;
    }

    if let (Some(fa), Some(fb)) = (&a.recalling_firm, &b.recalling_firm) {
        if fa.eq_ignore_ascii_case(fb) {
            return true;
        }
    }

    false
}

/// Fold `secondary` into `primary`, keeping the best fields from each.
///
/// The primary keeps its title, date, and category (first item clustered keeps
/// its framing). Sources, URLs, and tags are unioned; single-valued optional
/// fields fill in from the secondary only when the primary lacks them; the
/// longer summary and the higher severity win.
pub fn merge_items(primary: &MediaItem, secondary: &MediaItem) -> MediaItem {
    let mut merged = primary.clone();

    for source in &secondary.sources {
        if !merged.sources.contains(source) {
            merged.sources.push(source.clone());
        }
    }
    for url in &secondary.source_urls {
        if !merged.source_urls.contains(url) {
            merged.source_urls.push(url.clone());
        }
    }
    for tag in &secondary.tags {
        if !merged.tags.contains(tag) {
            merged.tags.push(tag.clone());
        }
    }

    if secondary.summary.len() > merged.summary.len() {
        merged.summary = secondary.summary.clone();
    }
    if secondary.severity.rank() < merged.severity.rank() {
        merged.severity = secondary.severity;
    }

    merged.pathogen = merged.pathogen.or_else(|| secondary.pathogen.clone());
    merged.product = merged.product.or_else(|| secondary.product.clone());
    merged.states = merged.states.or_else(|| secondary.states.clone());
    merged.recall_number = merged.recall_number.or_else(|| secondary.recall_number.clone());
    merged.classification = merged.classification.or_else(|| secondary.classification.clone());
    merged.recalling_firm = merged.recalling_firm.or_else(|| secondary.recalling_firm.clone());
    merged.status = merged.status.or_else(|| secondary.status.clone());
    merged.case_count = merged.case_count.or(secondary.case_count);

    merged
}

/// Cluster a flat list of items into unique merged records.
///
/// Greedy first-match clustering, O(n^2) worst case; fine at the tens to low
/// hundreds of items a digest run produces.
pub fn deduplicate_and_merge(items: Vec<MediaItem>) -> Vec<MediaItem> {
    let total = items.len();
    let mut clusters: Vec<MediaItem> = Vec::new();

    for item in items {
        match clusters.iter_mut().find(|rep| are_duplicates(rep, &item)) {
            Some(rep) => {
                debug!(
                    title = %item.title,
                    into = %rep.title,
                    "Merging duplicate media item"
                );
                *rep = merge_items(rep, &item);
            }
            None => clusters.push(item),
        }
    }

    debug!(input = total, unique = clusters.len(), "Deduplicated media items");
    clusters
}
