//! In-process post source for offline runs and tests

use async_trait::async_trait;
use social_feed_domain::{Post, PostSource, PostSourceError};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Post source returning a fixed result on every call
pub struct StubPostSource {
    name: String,
    posts: Vec<Post>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl StubPostSource {
    /// A source that has nothing to offer
    pub fn empty() -> Self {
        Self::with_posts(vec![])
    }

    /// A source that always returns `posts`
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            name: "stub".to_string(),
            posts,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A source whose every fetch fails with an API error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::empty()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of `fetch_posts` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for StubPostSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(PostSourceError::Api(message.clone())),
            None => Ok(self.posts.clone()),
        }
    }
}
