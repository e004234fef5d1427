//! RSS / Atom feed adapter with per-feed retry

mod parse;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use social_feed_domain::usecases::Normalizer;
use social_feed_domain::{Platform, Post, PostSource, PostSourceError, RawFeedItem};
use std::time::Duration;
use tokio::time::{sleep, timeout};

use parse::{FeedEntry, parse_entries};

const ACCEPT_FEEDS: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.9, */*;q=0.5";

/// One upstream feed, identified by a key such as `instagram_main`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub key: String,
    pub url: String,
}

impl FeedSpec {
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform::from_feed_key(&self.key)
    }
}

/// Linear backoff: attempt `n` failing waits `n * backoff_step` before the next one
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_step: Duration,
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_step: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// What a single feed contributed to a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedOutcome {
    Posts(usize),
    Empty,
    Failed(String),
}

/// Posts from every feed plus a per-feed outcome
#[derive(Debug, Clone, Default)]
pub struct FeedRun {
    pub posts: Vec<Post>,
    pub outcomes: Vec<(String, FeedOutcome)>,
}

/// Post source polling a fixed list of feeds
pub struct FeedPostSource {
    client: Client,
    feeds: Vec<FeedSpec>,
    retry: RetryPolicy,
    max_items_per_feed: usize,
    normalizer: Normalizer,
}

impl FeedPostSource {
    pub fn new(feeds: Vec<FeedSpec>, normalizer: Normalizer) -> Result<Self, PostSourceError> {
        let client = Client::builder()
            .build()
            .map_err(|e| PostSourceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            feeds,
            retry: RetryPolicy::default(),
            max_items_per_feed: 15,
            normalizer,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_items_per_feed(mut self, max_items: usize) -> Self {
        self.max_items_per_feed = max_items;
        self
    }

    /// Fetch every feed in order. Failures are recorded, never propagated.
    pub async fn fetch_all(&self) -> FeedRun {
        let mut run = FeedRun::default();
        let mut next_id = 0usize;

        for feed in &self.feeds {
            tracing::info!(feed = %feed.key, url = %feed.url, "Fetching feed");

            let entries = match self.fetch_with_retry(feed).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!(feed = %feed.key, error = %e, "Feed failed after retries");
                    run.outcomes
                        .push((feed.key.clone(), FeedOutcome::Failed(e.to_string())));
                    continue;
                }
            };

            let platform = feed.platform();
            let mut count = 0;
            for entry in entries.into_iter().take(self.max_items_per_feed) {
                let id = format!("{}_{}", feed.key, next_id);
                next_id += 1;
                if let Some(post) = self.normalizer.feed_post(to_raw_item(id, platform, entry)) {
                    run.posts.push(post);
                    count += 1;
                }
            }

            if count == 0 {
                tracing::info!(feed = %feed.key, "Feed has no posts");
                run.outcomes.push((feed.key.clone(), FeedOutcome::Empty));
            } else {
                tracing::info!(feed = %feed.key, count, "Fetched feed posts");
                run.outcomes.push((feed.key.clone(), FeedOutcome::Posts(count)));
            }
        }

        run
    }

    async fn fetch_with_retry(&self, feed: &FeedSpec) -> Result<Vec<FeedEntry>, PostSourceError> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_once(feed).await {
                Ok(entries) => return Ok(entries),
                Err(e) => {
                    tracing::warn!(
                        feed = %feed.key,
                        attempt,
                        attempts,
                        error = %e,
                        "Feed fetch attempt failed"
                    );
                    last_error = Some(e);
                    if attempt < attempts {
                        sleep(self.retry.backoff_step * attempt).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| PostSourceError::Network("no attempts made".to_string())))
    }

    async fn fetch_once(&self, feed: &FeedSpec) -> Result<Vec<FeedEntry>, PostSourceError> {
        let request = async {
            let response = self
                .client
                .get(&feed.url)
                .header(ACCEPT, ACCEPT_FEEDS)
                .header(USER_AGENT, concat!("social-feed/", env!("CARGO_PKG_VERSION")))
                .send()
                .await
                .map_err(|e| PostSourceError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PostSourceError::Upstream {
                    status: status.as_u16(),
                    message: body,
                });
            }

            response
                .bytes()
                .await
                .map_err(|e| PostSourceError::Network(e.to_string()))
        };

        let body = timeout(self.retry.request_timeout, request)
            .await
            .map_err(|_| PostSourceError::Timeout(self.retry.request_timeout))??;

        parse_entries(&body)
    }
}

fn to_raw_item(id: String, platform: Platform, entry: FeedEntry) -> RawFeedItem {
    RawFeedItem {
        id,
        platform,
        title: entry.title,
        description: entry.description,
        link: entry.link,
        published: entry.published,
    }
}

#[async_trait]
impl PostSource for FeedPostSource {
    fn name(&self) -> &str {
        "feeds"
    }

    /// Fails only when feeds are configured and every one of them failed,
    /// so a merge report can tell "nothing published" from "nothing reachable".
    async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError> {
        let run = self.fetch_all().await;

        let failures: Vec<String> = run
            .outcomes
            .iter()
            .filter_map(|(key, outcome)| match outcome {
                FeedOutcome::Failed(reason) => Some(format!("{}: {}", key, reason)),
                _ => None,
            })
            .collect();

        if !run.outcomes.is_empty() && failures.len() == run.outcomes.len() {
            return Err(PostSourceError::Api(format!(
                "All feeds failed ({})",
                failures.join("; ")
            )));
        }

        Ok(run.posts)
    }
}
