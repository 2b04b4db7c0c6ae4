use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rss::{Channel, Item};

use super::types::FeedEntry;

/// Parse an RSS 2.0 channel, falling back to feed-rs for Atom, RSS 1.0 and JSON Feed.
/// Items without any usable link are dropped here since nothing downstream can key them.
pub fn parse_entries(xml: &[u8]) -> Result<Vec<FeedEntry>> {
    match Channel::read_from(xml) {
        Ok(ch) => Ok(ch.items().iter().filter_map(entry_from_item).collect()),
        Err(rss_err) => {
            let feed = feed_rs::parser::parse(xml)
                .map_err(|e| anyhow!("unrecognised feed format (rss: {}; feed-rs: {})", rss_err, e))?;
            Ok(feed.entries.iter().filter_map(entry_from_generic).collect())
        }
    }
}

fn entry_from_item(item: &Item) -> Option<FeedEntry> {
    let link = item
        .link()
        .or_else(|| item.guid().filter(|g| g.is_permalink()).map(|g| g.value()))?
        .trim()
        .to_string();
    if link.is_empty() { return None; }
    Some(FeedEntry {
        title: item.title().unwrap_or("").to_string(),
        link,
        published: extract_published_at(item),
        summary: item.description().map(str::to_string),
        content: item.content().filter(|c| !c.trim().is_empty()).map(str::to_string),
    })
}

pub fn extract_published_at(item: &Item) -> Option<DateTime<Utc>> {
    // dc:date is a modification time, not a publish time
    let pub_date = item.pub_date()?;
    DateTime::parse_from_rfc2822(pub_date.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

fn entry_from_generic(entry: &feed_rs::model::Entry) -> Option<FeedEntry> {
    let link = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())?
        .href
        .trim()
        .to_string();
    if link.is_empty() { return None; }
    Some(FeedEntry {
        title: entry.title.as_ref().map(|t| t.content.clone()).unwrap_or_default(),
        link,
        // `updated` alone says nothing about when the entry first appeared
        published: entry.published,
        summary: entry.summary.as_ref().map(|t| t.content.clone()),
        content: entry
            .content
            .as_ref()
            .and_then(|c| c.body.clone())
            .filter(|b| !b.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Example</title>
    <link>https://example.com</link>
    <description>Example feed</description>
    <item>
      <title>First</title>
      <link>https://example.com/a</link>
      <description>&lt;p&gt;Summary A&lt;/p&gt;</description>
      <content:encoded><![CDATA[<p>Rich body A</p>]]></content:encoded>
      <pubDate>Wed, 01 May 2024 10:00:00 GMT</pubDate>
    </item>
    <item>
      <title>Second</title>
      <link>https://example.com/b</link>
      <dc:date>2024-05-01T09:30:00Z</dc:date>
    </item>
    <item>
      <title>No link</title>
      <description>dropped</description>
    </item>
    <item>
      <title>Undated</title>
      <guid isPermaLink="true">https://example.com/c</guid>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Atom Example</title>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <updated>2024-05-01T12:00:00Z</updated>
  <entry>
    <title>Atom entry</title>
    <link rel="alternate" href="https://blog.example.org/post-1"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2024-05-01T11:00:00Z</updated>
    <summary>Short summary</summary>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 3);

        let a = &entries[0];
        assert_eq!(a.title, "First");
        assert_eq!(a.link, "https://example.com/a");
        assert_eq!(a.published, Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()));
        assert_eq!(a.summary.as_deref(), Some("<p>Summary A</p>"));
        assert_eq!(a.content.as_deref(), Some("<p>Rich body A</p>"));
    }

    #[test]
    fn rss_ignores_dublin_core_date_and_uses_permalink_guid() {
        let entries = parse_entries(RSS.as_bytes()).unwrap();
        assert_eq!(entries[1].published, None);
        assert_eq!(entries[1].summary, None);
        assert_eq!(entries[2].link, "https://example.com/c");
        assert_eq!(entries[2].published, None);
    }

    #[test]
    fn parses_atom_via_fallback() {
        let entries = parse_entries(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.title, "Atom entry");
        assert_eq!(e.link, "https://blog.example.org/post-1");
        assert_eq!(e.published, None);
        assert_eq!(e.summary.as_deref(), Some("Short summary"));
    }

    #[test]
    fn atom_published_is_kept() {
        let xml = ATOM.replace(
            "<updated>2024-05-01T11:00:00Z</updated>\n    <summary>",
            "<updated>2024-05-01T11:00:00Z</updated>\n    <published>2024-04-01T08:00:00Z</published>\n    <summary>",
        );
        let entries = parse_entries(xml.as_bytes()).unwrap();
        assert_eq!(entries[0].published, Some(Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap()));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_entries(b"<html><body>not a feed</body></html>").is_err());
    }
}
