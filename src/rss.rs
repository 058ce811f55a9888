//! Minimal RSS 2.0 parsing shared by the feed-backed adapters.
//!
//! The upstream feeds are plain RSS 2.0 (Food Safety News, the magazine topic
//! feeds, and the CDC podcast feeds), so a small pull parser over the handful
//! of elements we care about beats dragging in a full feed model. Unknown
//! elements are skipped; text and CDATA both accumulate into the current
//! field.

use std::error::Error;

use chrono::{DateTime, NaiveDate};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One `<item>` out of an RSS channel.
#[derive(Debug, Clone, Default)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Parsed calendar date of `<pubDate>`, when present and parseable.
    pub pub_date: Option<NaiveDate>,
    /// All `<category>` values, in document order.
    pub categories: Vec<String>,
}

/// Which element of the current `<item>` text should accumulate into.
#[derive(PartialEq)]
enum Field {
    None,
    Title,
    Link,
    Description,
    PubDate,
    Category,
}

/// Parse an RSS 2.0 document into its items.
///
/// Elements outside `<item>` (channel title, ttl, etc.) are ignored. Returns
/// an error only for malformed XML; an empty channel parses to an empty vec.
pub fn parse_rss(xml: &str) -> Result<Vec<FeedItem>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut in_item = false;
    let mut field = Field::None;
    let mut current = FeedItem::default();
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"item" => {
                        in_item = true;
                        current = FeedItem::default();
                    }
                    b"title" if in_item => field = Field::Title,
                    b"link" if in_item => field = Field::Link,
                    b"description" if in_item => field = Field::Description,
                    b"pubDate" if in_item => field = Field::PubDate,
                    b"category" if in_item => field = Field::Category,
                    _ => field = Field::None,
                }
                text.clear();
            }
            Event::Text(e) => {
                if field != Field::None {
                    text.push_str(&e.xml_content()?);
                }
            }
            Event::GeneralRef(e) => {
                if field != Field::None {
                    if let Some(ch) = e.resolve_char_ref()? {
                        text.push(ch);
                    } else if let Some(s) =
                        quick_xml::escape::resolve_predefined_entity(&e.decode()?)
                    {
                        text.push_str(s);
                    }
                }
            }
            Event::CData(e) => {
                if field != Field::None {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"item" => {
                        in_item = false;
                        items.push(std::mem::take(&mut current));
                    }
                    _ if in_item => {
                        let value = text.trim().to_string();
                        match field {
                            Field::Title => current.title = value,
                            Field::Link => current.link = value,
                            Field::Description => current.description = value,
                            Field::PubDate => current.pub_date = parse_feed_date(&value),
                            Field::Category => {
                                if !value.is_empty() {
                                    current.categories.push(value);
                                }
                            }
                            Field::None => {}
                        }
                    }
                    _ => {}
                }
                field = Field::None;
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// Parse the date formats feeds actually emit: RFC 2822 (`pubDate` proper),
/// RFC 3339, or a bare `YYYY-MM-DD` prefix.
pub fn parse_feed_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
        return Some(parsed.date_naive());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example Food Safety Feed</title>
    <link>https://feed.example</link>
    <item>
      <title>Lettuce recall expands</title>
      <link>https://feed.example/lettuce-recall</link>
      <description><![CDATA[<p>Romaine lettuce recalled over <b>E. coli</b> fears.</p>]]></description>
      <pubDate>Tue, 18 Aug 2026 09:30:00 +0000</pubDate>
      <category>Recalls</category>
      <category>Produce</category>
    </item>
    <item>
      <title>Undated notice</title>
      <link>https://feed.example/notice</link>
      <description>Short notice body &amp; details.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let items = parse_rss(FEED).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Lettuce recall expands");
        assert_eq!(first.link, "https://feed.example/lettuce-recall");
        assert!(first.description.contains("E. coli"));
        assert_eq!(first.pub_date, NaiveDate::from_ymd_opt(2026, 8, 18));
        assert_eq!(first.categories, vec!["Recalls", "Produce"]);
    }

    #[test]
    fn test_parse_rss_missing_pub_date() {
        let items = parse_rss(FEED).unwrap();
        assert_eq!(items[1].pub_date, None);
        assert_eq!(items[1].description, "Short notice body & details.");
    }

    #[test]
    fn test_parse_rss_empty_channel() {
        let xml = r#"<rss version="2.0"><channel><title>Empty</title></channel></rss>"#;
        assert!(parse_rss(xml).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rss_malformed_errors() {
        assert!(parse_rss("<rss><channel><item><title>x</wrong></item></channel></rss>").is_err());
    }

    #[test]
    fn test_parse_feed_date_formats() {
        assert_eq!(
            parse_feed_date("Tue, 18 Aug 2026 09:30:00 +0000"),
            NaiveDate::from_ymd_opt(2026, 8, 18)
        );
        assert_eq!(
            parse_feed_date("2026-08-18T09:30:00Z"),
            NaiveDate::from_ymd_opt(2026, 8, 18)
        );
        assert_eq!(parse_feed_date("2026-08-18"), NaiveDate::from_ymd_opt(2026, 8, 18));
        assert_eq!(parse_feed_date("not a date"), None);
        assert_eq!(parse_feed_date(""), None);
    }
}
