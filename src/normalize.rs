//! Shared text normalization and signal extraction.
//!
//! Every adapter funnels its free text through this module rather than keeping
//! its own copy of the vocabularies. The fixed lookup tables (pathogens, state
//! codes, category and severity keywords) live here so they cannot drift
//! between adapters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Category, Severity};

/// Pathogen vocabulary: canonical display form plus the lowercase spellings
/// that count as a match. First occurrence in the scanned text wins.
static PATHOGENS: &[(&str, &[&str])] = &[
    ("Salmonella", &["salmonella"]),
    ("E. coli", &["e. coli", "e.coli", "escherichia coli"]),
    ("Listeria", &["listeria"]),
    ("Campylobacter", &["campylobacter"]),
    ("Norovirus", &["norovirus"]),
    ("Clostridium", &["clostridium"]),
    ("Botulism", &["botulism"]),
    ("Vibrio", &["vibrio"]),
    ("Staphylococcus", &["staphylococcus"]),
    ("Shigella", &["shigella"]),
    ("Hepatitis A", &["hepatitis a"]),
    ("Cyclospora", &["cyclospora"]),
    ("Cronobacter", &["cronobacter"]),
    ("Bacillus cereus", &["bacillus cereus"]),
    ("Yersinia", &["yersinia"]),
];

/// All 50 US state codes plus DC, matched as uppercase word-bounded tokens.
static STATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(AL|AK|AZ|AR|CA|CO|CT|DE|FL|GA|HI|ID|IL|IN|IA|KS|KY|LA|ME|MD|MA|MI|MN|MS|MO|MT|NE|NV|NH|NJ|NM|NY|NC|ND|OH|OK|OR|PA|RI|SC|SD|TN|TX|UT|VT|VA|WA|WV|WI|WY|DC)\b",
    )
    .unwrap()
});

static CASE_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*(?:cases?|ill|sick|infected|people|persons?)\b").unwrap());

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Strip HTML tags, decode entities, and collapse whitespace.
pub fn strip_markup(html: &str) -> String {
    let without_tags = TAG_RE.replace_all(html, " ");
    let decoded = html_escape::decode_html_entities(without_tags.as_ref()).to_string();
    WHITESPACE_RE.replace_all(decoded.trim(), " ").trim().to_string()
}

/// Find the first pathogen mentioned in `text`, case-insensitively.
///
/// Returns the canonical display form: E. coli spelling variants collapse to
/// `"E. coli"`, every other match keeps its vocabulary capitalization. When
/// two pathogens appear, the one occurring earliest in the text wins; there is
/// no multi-pathogen support.
pub fn extract_pathogen(text: &str) -> Option<String> {
    let haystack = text.to_lowercase();
    let mut best: Option<(usize, &str)> = None;
    for (canonical, spellings) in PATHOGENS {
        for spelling in *spellings {
            if let Some(pos) = haystack.find(spelling) {
                if best.is_none_or(|(b, _)| pos < b) {
                    best = Some((pos, canonical));
                }
            }
        }
    }
    best.map(|(_, canonical)| canonical.to_string())
}

/// Extract US state codes from distribution or location text.
///
/// Returns `None` (not an empty vec) when nothing matched, so the merge logic
/// can tell "no state signal" apart from "checked and found none".
pub fn extract_states(text: &str) -> Option<Vec<String>> {
    let mut states: Vec<String> = Vec::new();
    for m in STATE_RE.find_iter(text) {
        let code = m.as_str().to_string();
        if !states.contains(&code) {
            states.push(code);
        }
    }
    if states.is_empty() { None } else { Some(states) }
}

/// First `<digits> case/ill/sick/infected/people/person` match in the text.
pub fn extract_case_count(text: &str) -> Option<u32> {
    CASE_COUNT_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Map a regulatory classification string to a severity.
///
/// Class I means a reasonable probability of serious harm or death; Class III
/// is unlikely to cause harm. Unrecognized codes land on medium rather than
/// low, since an unknown classification is not evidence of low risk.
pub fn classification_to_severity(classification: Option<&str>) -> Severity {
    let Some(code) = classification else {
        return Severity::Medium;
    };
    if code.contains("III") {
        Severity::Low
    } else if code.contains("II") {
        Severity::Medium
    } else if code.contains("I") {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Keyword heuristic shared by the news-style adapters.
///
/// Scan order matters: a recall headline that also mentions illnesses is still
/// filed as a Recall.
pub fn infer_category(text: &str, fallback: Category) -> Category {
    let text = text.to_lowercase();
    if text.contains("recall") {
        Category::Recall
    } else if text.contains("outbreak") || text.contains("illness") || text.contains("hospitalized")
    {
        Category::Outbreak
    } else if text.contains("policy")
        || text.contains("regulation")
        || text.contains("fda")
        || text.contains("usda")
    {
        Category::Policy
    } else if text.contains("study") || text.contains("research") {
        Category::Research
    } else if text.contains("alert") || text.contains("warning") {
        Category::Alert
    } else {
        fallback
    }
}

/// Keyword severity heuristic for sources without a regulatory classification.
pub fn infer_severity(text: &str) -> Severity {
    let text = text.to_lowercase();
    if text.contains("death") || text.contains("fatal") {
        Severity::High
    } else if text.contains("hospitalized")
        || text.contains("outbreak")
        || text.contains("recall")
        || text.contains("contaminated")
    {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Truncate a product description to 100 characters with an ellipsis.
pub fn truncate_product(product: &str) -> String {
    let trimmed = product.trim();
    if trimmed.chars().count() <= 100 {
        trimmed.to_string()
    } else {
        let prefix: String = trimmed.chars().take(100).collect();
        format!("{prefix}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup_tags_and_entities() {
        let html = "<p>Romaine lettuce &amp; spinach</p>\n  <b>recalled</b>";
        assert_eq!(strip_markup(html), "Romaine lettuce & spinach recalled");
    }

    #[test]
    fn test_strip_markup_collapses_whitespace() {
        assert_eq!(strip_markup("a\n\n   b\t c"), "a b c");
    }

    #[test]
    fn test_extract_pathogen_first_in_text_wins() {
        let text = "contains both Salmonella and Listeria traces";
        assert_eq!(extract_pathogen(text), Some("Salmonella".to_string()));
        let reversed = "Listeria found before Salmonella";
        assert_eq!(extract_pathogen(reversed), Some("Listeria".to_string()));
    }

    #[test]
    fn test_extract_pathogen_canonicalizes_e_coli() {
        assert_eq!(extract_pathogen("E.coli O157:H7"), Some("E. coli".to_string()));
        assert_eq!(
            extract_pathogen("escherichia coli found"),
            Some("E. coli".to_string())
        );
    }

    #[test]
    fn test_extract_pathogen_case_insensitive() {
        assert_eq!(
            extract_pathogen("SALMONELLA contamination"),
            Some("Salmonella".to_string())
        );
        assert_eq!(extract_pathogen("nothing here"), None);
    }

    #[test]
    fn test_extract_states_found() {
        assert_eq!(
            extract_states("distributed in CA, NY, and TX"),
            Some(vec!["CA".to_string(), "NY".to_string(), "TX".to_string()])
        );
    }

    #[test]
    fn test_extract_states_nationwide_is_none() {
        assert_eq!(extract_states("nationwide distribution"), None);
    }

    #[test]
    fn test_extract_states_dedups_repeats() {
        assert_eq!(
            extract_states("CA stores and CA warehouses"),
            Some(vec!["CA".to_string()])
        );
    }

    #[test]
    fn test_extract_case_count() {
        assert_eq!(extract_case_count("23 cases reported across 4 states"), Some(23));
        assert_eq!(extract_case_count("12 people sickened"), Some(12));
        assert_eq!(extract_case_count("no numbers here"), None);
    }

    #[test]
    fn test_classification_to_severity() {
        assert_eq!(classification_to_severity(Some("Class I")), Severity::High);
        assert_eq!(classification_to_severity(Some("Class II")), Severity::Medium);
        assert_eq!(classification_to_severity(Some("Class III")), Severity::Low);
        assert_eq!(classification_to_severity(Some("Unknown")), Severity::Medium);
        assert_eq!(classification_to_severity(None), Severity::Medium);
    }

    #[test]
    fn test_infer_category_recall_beats_outbreak() {
        let cat = infer_category(
            "Recall expanded after outbreak sickens dozens",
            Category::Research,
        );
        assert_eq!(cat, Category::Recall);
    }

    #[test]
    fn test_infer_category_fallback() {
        assert_eq!(
            infer_category("new cold chain logistics report", Category::Research),
            Category::Research
        );
    }

    #[test]
    fn test_infer_severity_keywords() {
        assert_eq!(infer_severity("two deaths linked to listeria"), Severity::High);
        assert_eq!(infer_severity("five hospitalized after picnic"), Severity::Medium);
        assert_eq!(infer_severity("routine inspection notes"), Severity::Low);
    }

    #[test]
    fn test_truncate_product_long() {
        let long = "x".repeat(150);
        let truncated = truncate_product(&long);
        assert_eq!(truncated.chars().count(), 103);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_product_short_unchanged() {
        assert_eq!(truncate_product("ground beef"), "ground beef");
    }
}
