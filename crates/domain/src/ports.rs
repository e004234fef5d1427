//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::{Engagement, Platform, Post};

/// Error type for post source operations
#[derive(Debug, Error)]
pub enum PostSourceError {
    /// Missing or invalid configuration (e.g. no bearer token). Fatal for the source.
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Rate limited, retry after: {0:?}")]
    RateLimited(Option<std::time::Duration>),
    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("API error: {0}")]
    Api(String),
}

/// Port for fetching normalized posts from one upstream source kind
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Short name used in logs and merge reports
    fn name(&self) -> &str;

    /// Fetch and normalize every post this source currently offers
    async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError>;
}

/// Port for synthetic engagement numbers on sources without real metrics
pub trait EngagementGenerator: Send + Sync {
    fn generate(&self, platform: Platform, content_len: usize) -> Engagement;
}

/// Port for time/clock operations (enables deterministic testing)
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> OffsetDateTime;
}

/// Real clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
