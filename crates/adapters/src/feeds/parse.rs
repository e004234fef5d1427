//! RSS / Atom document parsing

use feed_rs::model::Entry;
use social_feed_domain::PostSourceError;
use time::OffsetDateTime;

/// The fields of a feed entry the normalizer cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FeedEntry {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub published: Option<OffsetDateTime>,
}

/// Parse an RSS or Atom document into entries, in document order.
///
/// A blank body is an empty feed, not an error.
pub(crate) fn parse_entries(body: &[u8]) -> Result<Vec<FeedEntry>, PostSourceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(vec![]);
    }

    let feed = feed_rs::parser::parse(body).map_err(|e| PostSourceError::Parse(e.to_string()))?;
    Ok(feed.entries.into_iter().map(to_feed_entry).collect())
}

fn to_feed_entry(entry: Entry) -> FeedEntry {
    let link = select_link(&entry);
    let published = entry
        .published
        .or(entry.updated)
        .and_then(|d| OffsetDateTime::from_unix_timestamp(d.timestamp()).ok());

    let description = entry
        .summary
        .map(|s| s.content)
        .filter(|s| !s.trim().is_empty())
        .or_else(|| entry.content.and_then(|c| c.body))
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            entry
                .media
                .into_iter()
                .find_map(|m| m.description.map(|d| d.content))
        });

    FeedEntry {
        title: entry.title.map(|t| t.content),
        description,
        link,
        published,
    }
}

fn select_link(entry: &Entry) -> Option<String> {
    let alternate = entry.links.iter().find(|l| {
        let rel = l.rel.as_deref().unwrap_or("");
        !l.href.trim().is_empty() && (rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    });
    if let Some(link) = alternate.or_else(|| entry.links.iter().find(|l| !l.href.trim().is_empty()))
    {
        return Some(link.href.trim().to_string());
    }

    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        return Some(id.to_string());
    }
    None
}
