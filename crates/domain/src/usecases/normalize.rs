//! Content normalizer - turns raw upstream text into canonical posts

use regex::Regex;
use std::sync::{Arc, LazyLock};
use time::UtcOffset;

use crate::model::{Platform, Post, RawFeedItem, RawTweet, split_timestamp};
use crate::ports::{Clock, EngagementGenerator};
use crate::rules::{CATEGORY_RULES, DEFAULT_CATEGORY, TAG_RULES, first_matching_category, matching_tags};

/// Maximum length of cleaned content, in characters
pub const MAX_CONTENT_CHARS: usize = 500;
/// Maximum length of a first-sentence summary, in characters
pub const MAX_SUMMARY_CHARS: usize = 150;
/// First sentences this short (or shorter) fall back to a prefix summary
pub const MIN_SUMMARY_CHARS: usize = 20;
/// Prefix length used when the first sentence is unusable
pub const SUMMARY_PREFIX_CHARS: usize = 120;
/// Tag cap for feed-derived posts
pub const FEED_TAG_LIMIT: usize = 5;
/// Tag cap for REST-derived posts (these also carry topic annotations)
pub const TWEET_TAG_LIMIT: usize = 8;
/// Feed items with less cleaned content than this are discarded
pub const MIN_FEED_CONTENT_CHARS: usize = 10;

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid markup regex"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").expect("valid entity regex")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\p{L}\p{N}_]+)").expect("valid hashtag regex"));

/// Strip markup and entities, collapse whitespace, and cap the length
pub fn clean_content(raw: &str) -> String {
    let text = MARKUP.replace_all(raw, " ");
    let text = ENTITY.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    truncate_chars(text.trim(), MAX_CONTENT_CHARS)
        .trim_end()
        .to_string()
}

/// Derive a one-sentence synopsis.
///
/// Uses the first sentence when it is longer than 20 and at most 150 chars,
/// otherwise the first 120 chars of content followed by `...`.
pub fn generate_summary(content: &str) -> String {
    let first = content
        .split(['.', '!', '?'])
        .next()
        .unwrap_or_default()
        .trim();
    let len = first.chars().count();

    if len > MIN_SUMMARY_CHARS && len <= MAX_SUMMARY_CHARS {
        format!("{}.", first)
    } else {
        format!("{}...", truncate_chars(content, SUMMARY_PREFIX_CHARS))
    }
}

/// Extract hashtags and keyword tags, capped at [`FEED_TAG_LIMIT`]
pub fn extract_tags(content: &str) -> Vec<String> {
    extract_tags_with(content, &[], FEED_TAG_LIMIT)
}

/// Extract tags from hashtags, keyword rules and provider annotations.
///
/// Order is hashtags, then keyword tags in rule order, then annotations.
/// Duplicates keep their first position.
pub fn extract_tags_with(content: &str, annotations: &[String], limit: usize) -> Vec<String> {
    let hashtags = HASHTAG
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    let keyword_tags = matching_tags(TAG_RULES, content)
        .into_iter()
        .map(str::to_string);
    let annotations = annotations
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty());

    let mut tags: Vec<String> = Vec::new();
    for tag in hashtags.chain(keyword_tags).chain(annotations) {
        if tags.len() >= limit {
            break;
        }
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Assign the first matching category, or `Genel`
pub fn categorize_content(content: &str) -> String {
    first_matching_category(CATEGORY_RULES, content)
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string()
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds canonical [`Post`]s from raw adapter output
#[derive(Clone)]
pub struct Normalizer {
    engagement: Arc<dyn EngagementGenerator>,
    clock: Arc<dyn Clock>,
    offset: UtcOffset,
}

impl Normalizer {
    pub fn new(
        engagement: Arc<dyn EngagementGenerator>,
        clock: Arc<dyn Clock>,
        offset: UtcOffset,
    ) -> Self {
        Self {
            engagement,
            clock,
            offset,
        }
    }

    /// Normalize a feed entry. Returns `None` when the cleaned content is too short.
    pub fn feed_post(&self, item: RawFeedItem) -> Option<Post> {
        let raw = item
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .or(item.title.as_deref())
            .unwrap_or_default();
        let content = clean_content(raw);

        if content.chars().count() < MIN_FEED_CONTENT_CHARS {
            tracing::debug!(id = %item.id, "Discarding feed item with too little content");
            return None;
        }

        let published = item.published.unwrap_or_else(|| self.clock.now());
        let (date, time) = split_timestamp(published, self.offset);
        let engagement = self
            .engagement
            .generate(item.platform, content.chars().count());

        Some(Post {
            id: item.id,
            summary: generate_summary(&content),
            tags: extract_tags(&content),
            category: categorize_content(&content),
            platform: item.platform,
            date,
            time,
            url: item.link.filter(|l| !l.trim().is_empty()),
            engagement,
            author: None,
            content,
        })
    }

    /// Normalize a tweet fetched through the REST API
    pub fn tweet_post(&self, tweet: RawTweet) -> Post {
        let content = clean_content(&tweet.text);
        let published = tweet.created_at.unwrap_or_else(|| self.clock.now());
        let (date, time) = split_timestamp(published, self.offset);

        Post {
            id: format!("twitter_{}", tweet.id),
            summary: generate_summary(&content),
            tags: extract_tags_with(&content, &tweet.annotations, TWEET_TAG_LIMIT),
            category: categorize_content(&content),
            platform: Platform::Twitter,
            date,
            time,
            url: Some(tweet.url),
            engagement: tweet.engagement,
            author: Some(tweet.author),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::SyntheticEngagement;
    use crate::model::{Author, Engagement};
    use time::OffsetDateTime;
    use time::macros::{datetime, offset};

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(
            Arc::new(SyntheticEngagement::seeded(3)),
            Arc::new(FixedClock(datetime!(2025-03-01 09:00 UTC))),
            offset!(+3),
        )
    }

    #[test]
    fn test_clean_content_strips_markup_and_entities() {
        let cleaned = clean_content("<p>Merhaba&nbsp;<b>İstanbul</b></p>\n\n  &amp; &#8217;dünya&#x21;");
        assert_eq!(cleaned, "Merhaba İstanbul dünya");
    }

    #[test]
    fn test_clean_content_properties() {
        let inputs = [
            String::new(),
            "   ".to_string(),
            "<div><a href=\"x\">link</a></div>".to_string(),
            "a  b\t\tc\n\nd".to_string(),
            "ş".repeat(800),
            format!("<p>{}</p>", "kelime ".repeat(200)),
        ];

        for input in &inputs {
            let cleaned = clean_content(input);
            assert!(cleaned.chars().count() <= MAX_CONTENT_CHARS);
            assert!(!MARKUP.is_match(&cleaned), "markup left in {:?}", cleaned);
            assert!(!cleaned.contains("  "), "double space in {:?}", cleaned);
        }
    }

    #[test]
    fn test_summary_uses_first_sentence() {
        let content = "Yeni metro hattı bugün hizmete açıldı. Detaylar yakında!";
        assert_eq!(
            generate_summary(content),
            "Yeni metro hattı bugün hizmete açıldı."
        );
    }

    #[test]
    fn test_summary_falls_back_to_prefix() {
        assert_eq!(generate_summary("Kısa. Devamı var"), "Kısa. Devamı var...");

        let long = "a".repeat(200);
        let summary = generate_summary(&long);
        assert_eq!(summary.chars().count(), SUMMARY_PREFIX_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_summary_is_idempotent_for_short_sentences() {
        let once = generate_summary("Bugün parkta bir etkinlik düzenledik! Herkesi bekleriz");
        assert_eq!(generate_summary(&once), once);
    }

    #[test]
    fn test_summary_length_bound() {
        for len in [0, 21, 150, 151, 400] {
            let content = "k".repeat(len);
            assert!(generate_summary(&content).chars().count() <= MAX_SUMMARY_CHARS + 3);
        }
    }

    #[test]
    fn test_extract_tags_turkish_hashtags_and_keywords() {
        let tags = extract_tags("İstanbul'da #Metro ve #YeşilUlaşım büyüyor");

        assert_eq!(tags.len(), FEED_TAG_LIMIT);
        for expected in ["Metro", "YeşilUlaşım", "İstanbul", "Şehir", "Ulaşım"] {
            assert!(tags.iter().any(|t| t == expected), "missing {expected}: {tags:?}");
        }
    }

    #[test]
    fn test_extract_tags_dedupes_preserving_order() {
        let tags = extract_tags_with("#Metro #Metro metro", &["Metro".to_string()], 8);
        assert_eq!(tags, vec!["Metro", "Ulaşım"]);
    }

    #[test]
    fn test_extract_tags_appends_annotations() {
        let tags = extract_tags_with(
            "Bugün güzel bir gün",
            &["Politics".to_string(), " ".to_string()],
            TWEET_TAG_LIMIT,
        );
        assert_eq!(tags, vec!["Politics"]);
    }

    #[test]
    fn test_categorize_content() {
        assert_eq!(categorize_content("Yeni metro durağı açıldı"), "Ulaşım");
        assert_eq!(categorize_content("Merhaba dünya"), "Genel");
    }

    #[test]
    fn test_feed_post_falls_back_to_title_and_fetch_time() {
        let post = normalizer()
            .feed_post(RawFeedItem {
                id: "instagram_1".to_string(),
                platform: Platform::Instagram,
                title: Some("Kadıköy'de yeni park açılışı".to_string()),
                description: Some("   ".to_string()),
                link: Some("https://example.com/p/1".to_string()),
                published: None,
            })
            .expect("post");

        assert_eq!(post.content, "Kadıköy'de yeni park açılışı");
        assert_eq!(post.date, "2025-03-01");
        assert_eq!(post.time, "12:00");
        assert_eq!(post.category, "Çevre");
        assert_eq!(post.platform, Platform::Instagram);
        assert!(post.author.is_none());
    }

    #[test]
    fn test_feed_post_discards_short_content() {
        let post = normalizer().feed_post(RawFeedItem {
            id: "rss_1".to_string(),
            platform: Platform::Rss,
            title: None,
            description: Some("<p>Kısa</p>".to_string()),
            link: None,
            published: None,
        });
        assert!(post.is_none());
    }

    #[test]
    fn test_tweet_post_keeps_real_metrics_and_author() {
        let author = Author {
            username: "ornek".to_string(),
            name: "Örnek Kişi".to_string(),
            verified: true,
        };
        let post = normalizer().tweet_post(RawTweet {
            id: "1001".to_string(),
            text: "Metro çalışmaları sürüyor #Ulaşım".to_string(),
            created_at: Some(datetime!(2025-01-15 21:30 UTC)),
            url: "https://twitter.com/ornek/status/1001".to_string(),
            engagement: Engagement {
                likes: 10,
                shares: 2,
                comments: 1,
            },
            annotations: vec!["Transit".to_string()],
            author: author.clone(),
        });

        assert_eq!(post.id, "twitter_1001");
        assert_eq!(post.date, "2025-01-16");
        assert_eq!(post.time, "00:30");
        assert_eq!(post.engagement.likes, 10);
        assert_eq!(post.author, Some(author));
        assert_eq!(post.tags, vec!["Ulaşım", "Toplu Taşıma", "Metro", "Transit"]);
    }
}
