//! Domain models and value objects

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Platform a post was published on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Instagram,
    Facebook,
    Youtube,
    Rss,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Twitter,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Youtube,
        Platform::Rss,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Youtube => "youtube",
            Platform::Rss => "rss",
        }
    }

    /// Derive the platform from a feed's identifying key.
    ///
    /// Feeds for Instagram, Facebook and YouTube are republished through
    /// third-party RSS bridges, so the key (e.g. `instagram_main`) is the only
    /// reliable hint. Anything else is plain RSS.
    pub fn from_feed_key(key: &str) -> Self {
        let key = key.to_lowercase();
        if key.contains("instagram") {
            Platform::Instagram
        } else if key.contains("facebook") {
            Platform::Facebook
        } else if key.contains("youtube") {
            Platform::Youtube
        } else {
            Platform::Rss
        }
    }

    /// Popularity multiplier used by the synthetic engagement generator
    pub fn engagement_multiplier(&self) -> f64 {
        match self {
            Platform::Twitter => 1.2,
            Platform::Instagram => 1.5,
            Platform::Facebook => 1.0,
            Platform::Youtube => 0.8,
            Platform::Rss => 0.5,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a platform name is not one of the supported values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown platform '{0}' (expected twitter, instagram, facebook, youtube or rss)")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

/// Engagement counters attached to a post
///
/// REST-sourced posts carry real counts. Feed-sourced posts carry synthetic
/// numbers from an [`crate::EngagementGenerator`]; they are display filler, not telemetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
}

/// Author profile for posts resolved through the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub verified: bool,
}

/// A normalized social-media post in the unified feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique within one merge cycle (`{source}_{native id}`)
    pub id: String,
    /// Cleaned body text
    pub content: String,
    /// One-sentence synopsis
    pub summary: String,
    pub platform: Platform,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Local clock time, `HH:MM`
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub engagement: Engagement,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Post {
    /// Effective timestamp used for timeline ordering.
    ///
    /// Both `date` and `time` must parse; otherwise the post is treated as
    /// the oldest possible entry (`UNIX_EPOCH`).
    pub fn timestamp(&self) -> OffsetDateTime {
        parse_stamp(&self.date, &self.time).unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

fn parse_stamp(date: &str, time: &str) -> Option<OffsetDateTime> {
    let date = Date::parse(date.trim(), format_description!("[year]-[month]-[day]")).ok()?;
    let time = Time::parse(time.trim(), format_description!("[hour]:[minute]"))
        .or_else(|_| Time::parse(time.trim(), format_description!("[hour]:[minute]:[second]")))
        .ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Split an instant into the `(date, time)` pair stored on a [`Post`],
/// rendered at the given local offset.
pub fn split_timestamp(at: OffsetDateTime, offset: UtcOffset) -> (String, String) {
    let local = at.to_offset(offset);
    let date = format!(
        "{:04}-{:02}-{:02}",
        local.year(),
        u8::from(local.month()),
        local.day()
    );
    let time = format!("{:02}:{:02}", local.hour(), local.minute());
    (date, time)
}

/// Optional constraints applied by the query layer.
///
/// A `None` field places no constraint on that dimension. An empty tag list
/// is treated the same as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub category: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    #[serde(default)]
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl SearchFilters {
    /// True when no dimension is constrained
    pub fn is_empty(&self) -> bool {
        self.platform.is_none()
            && self.category.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
            && self.tags.as_ref().is_none_or(|t| t.is_empty())
    }
}

/// Raw tweet fields handed from the REST adapter to the normalizer
#[derive(Debug, Clone)]
pub struct RawTweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<OffsetDateTime>,
    pub url: String,
    pub engagement: Engagement,
    /// Provider topic annotations (entity names)
    pub annotations: Vec<String>,
    pub author: Author,
}

/// Raw feed entry fields handed from the feed adapter to the normalizer
#[derive(Debug, Clone)]
pub struct RawFeedItem {
    pub id: String,
    pub platform: Platform,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub published: Option<OffsetDateTime>,
}
