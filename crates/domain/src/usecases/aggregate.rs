//! Aggregation cache - merges every source into one timeline with a TTL

use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use time::{Duration, OffsetDateTime, UtcOffset};
use tokio::sync::Mutex;

use crate::model::{Engagement, Platform, Post, split_timestamp};
use crate::ports::{Clock, PostSource};

/// Category carried by placeholder posts
pub const SYSTEM_CATEGORY: &str = "Sistem";

/// Configuration for the aggregation cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window for the merged timeline
    pub ttl: Duration,
    /// Offset used to render placeholder timestamps
    pub utc_offset: UtcOffset,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// The single cached timeline
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Vec<Post>,
    pub timestamp: OffsetDateTime,
}

/// Where the posts returned by [`AggregationCache::load`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrigin {
    /// Fresh cache hit, no upstream calls
    Cached,
    /// Newly merged from upstream
    Fresh,
    /// Refresh produced nothing; previous entry served past its TTL
    Stale,
    /// Nothing cached and nothing fetched
    Placeholder,
}

/// Posts plus their provenance
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub posts: Vec<Post>,
    pub origin: FeedOrigin,
}

/// Result of one source call within a merge cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    Fetched(usize),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub source: String,
    pub outcome: SourceOutcome,
}

/// Merges posts from every [`PostSource`] and caches the result
pub struct AggregationCache<Cl>
where
    Cl: Clock + ?Sized,
{
    sources: Vec<Arc<dyn PostSource>>,
    clock: Arc<Cl>,
    config: CacheConfig,
    entry: Mutex<Option<CacheEntry>>,
    last_report: Mutex<Vec<SourceReport>>,
}

impl<Cl> AggregationCache<Cl>
where
    Cl: Clock + ?Sized,
{
    pub fn new(sources: Vec<Arc<dyn PostSource>>, clock: Arc<Cl>, config: CacheConfig) -> Self {
        Self {
            sources,
            clock,
            config,
            entry: Mutex::new(None),
            last_report: Mutex::new(Vec::new()),
        }
    }

    /// All posts, newest first. Never fails; see [`Self::load`] for provenance.
    pub async fn get_all_posts(&self) -> Vec<Post> {
        self.load().await.posts
    }

    /// Serve the cached timeline or run a merge cycle
    pub async fn load(&self) -> FeedSnapshot {
        let now = self.clock.now();

        if let Some(entry) = self.entry.lock().await.as_ref() {
            if now - entry.timestamp < self.config.ttl {
                tracing::debug!(count = entry.data.len(), "Serving cached posts");
                return FeedSnapshot {
                    posts: entry.data.clone(),
                    origin: FeedOrigin::Cached,
                };
            }
        }

        let merged = self.merge().await;

        if !merged.is_empty() {
            tracing::info!(count = merged.len(), "Merged posts from sources");
            *self.entry.lock().await = Some(CacheEntry {
                data: merged.clone(),
                timestamp: now,
            });
            return FeedSnapshot {
                posts: merged,
                origin: FeedOrigin::Fresh,
            };
        }

        if let Some(entry) = self.entry.lock().await.as_ref() {
            tracing::warn!(
                count = entry.data.len(),
                cached_at = %entry.timestamp,
                "No fresh posts, serving stale cache"
            );
            return FeedSnapshot {
                posts: entry.data.clone(),
                origin: FeedOrigin::Stale,
            };
        }

        tracing::warn!("No posts available from any source, serving placeholder posts");
        FeedSnapshot {
            posts: placeholder_posts(self.clock.now(), self.config.utc_offset),
            origin: FeedOrigin::Placeholder,
        }
    }

    /// Per-source outcomes of the most recent merge cycle
    pub async fn last_report(&self) -> Vec<SourceReport> {
        self.last_report.lock().await.clone()
    }

    /// Fetch all sources concurrently, then de-duplicate and sort newest first
    async fn merge(&self) -> Vec<Post> {
        let results = join_all(self.sources.iter().map(|source| async move {
            (source.name().to_string(), source.fetch_posts().await)
        }))
        .await;

        let mut posts = Vec::new();
        let mut report = Vec::with_capacity(results.len());

        for (name, result) in results {
            match result {
                Ok(fetched) => {
                    if fetched.is_empty() {
                        tracing::info!(source = %name, "Source returned no posts");
                    } else {
                        tracing::info!(source = %name, count = fetched.len(), "Source fetched");
                    }
                    report.push(SourceReport {
                        source: name,
                        outcome: SourceOutcome::Fetched(fetched.len()),
                    });
                    posts.extend(fetched);
                }
                Err(e) => {
                    tracing::error!(source = %name, error = %e, "Source failed");
                    report.push(SourceReport {
                        source: name,
                        outcome: SourceOutcome::Failed(e.to_string()),
                    });
                }
            }
        }

        *self.last_report.lock().await = report;

        let mut seen = HashSet::new();
        posts.retain(|post| seen.insert(post.id.clone()));
        sort_newest_first(&mut posts);
        posts
    }
}

/// Stable sort by effective timestamp, newest first.
/// Posts with unparsable timestamps sink to the end.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by_cached_key(|post| Reverse(post.timestamp()));
}

/// Fixed posts shown when nothing could be fetched and nothing is cached
pub fn placeholder_posts(now: OffsetDateTime, offset: UtcOffset) -> Vec<Post> {
    let (date, time) = split_timestamp(now, offset);
    let notice = |id: &str, content: &str, summary: &str| Post {
        id: id.to_string(),
        content: content.to_string(),
        summary: summary.to_string(),
        platform: Platform::Rss,
        date: date.clone(),
        time: time.clone(),
        url: None,
        engagement: Engagement::default(),
        tags: vec!["Sistem".to_string(), "Bilgilendirme".to_string()],
        category: SYSTEM_CATEGORY.to_string(),
        author: None,
    };

    vec![
        notice(
            "system_unavailable",
            "Sosyal medya kaynaklarına şu anda ulaşılamıyor. Paylaşımlar kısa süre içinde \
             yeniden yüklenecek.",
            "Sosyal medya kaynaklarına şu anda ulaşılamıyor.",
        ),
        notice(
            "system_retry",
            "Akış birkaç dakika içinde otomatik olarak yenilenir. Sorun devam ederse sayfayı \
             daha sonra tekrar ziyaret edin.",
            "Akış birkaç dakika içinde otomatik olarak yenilenir.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PostSourceError;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;

    // Fake implementations for testing
    struct FakeSource {
        name: &'static str,
        result: StdMutex<Result<Vec<Post>, String>>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn ok(name: &'static str, posts: Vec<Post>) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: StdMutex::new(Ok(posts)),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                result: StdMutex::new(Err("boom".to_string())),
                calls: AtomicUsize::new(0),
            })
        }

        fn set_result(&self, result: Result<Vec<Post>, String>) {
            *self.result.lock().unwrap() = result;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PostSource for FakeSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .lock()
                .unwrap()
                .clone()
                .map_err(PostSourceError::Network)
        }
    }

    /// Source whose fetch takes `delay` of fake time
    struct SlowSource {
        clock: Arc<FakeClock>,
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PostSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.clock.advance(self.delay);
            Ok(vec![post("a", "2025-01-01", "10:00")])
        }
    }

    struct FakeClock {
        time: StdMutex<OffsetDateTime>,
    }

    impl FakeClock {
        fn at(time: OffsetDateTime) -> Arc<Self> {
            Arc::new(Self {
                time: StdMutex::new(time),
            })
        }

        fn advance(&self, by: Duration) {
            *self.time.lock().unwrap() += by;
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> OffsetDateTime {
            *self.time.lock().unwrap()
        }
    }

    fn post(id: &str, date: &str, time: &str) -> Post {
        Post {
            id: id.to_string(),
            content: format!("content {}", id),
            summary: format!("summary {}", id),
            platform: Platform::Rss,
            date: date.to_string(),
            time: time.to_string(),
            url: None,
            engagement: Engagement::default(),
            tags: vec![],
            category: "Genel".to_string(),
            author: None,
        }
    }

    fn ids(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.id.as_str()).collect()
    }

    fn cache(
        sources: Vec<Arc<dyn PostSource>>,
        clock: Arc<FakeClock>,
    ) -> AggregationCache<FakeClock> {
        AggregationCache::new(sources, clock, CacheConfig::default())
    }

    #[tokio::test]
    async fn test_merges_and_sorts_newest_first() {
        let twitter = FakeSource::ok(
            "x",
            vec![
                post("t1", "2025-01-10", "09:00"),
                post("t2", "2025-01-12", "18:30"),
            ],
        );
        let feeds = FakeSource::ok(
            "feeds",
            vec![
                post("f1", "2025-01-12", "08:00"),
                post("broken", "yesterday", "noon"),
                post("f2", "2025-01-11", "23:59"),
            ],
        );
        let clock = FakeClock::at(datetime!(2025-01-13 00:00 UTC));
        let cache = cache(vec![twitter, feeds], clock);

        let snapshot = cache.load().await;

        assert_eq!(snapshot.origin, FeedOrigin::Fresh);
        assert_eq!(ids(&snapshot.posts), vec!["t2", "f1", "f2", "t1", "broken"]);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_hits_cache() {
        let source = FakeSource::ok("feeds", vec![post("a", "2025-01-01", "10:00")]);
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![source.clone()], clock.clone());

        let first = cache.get_all_posts().await;
        clock.advance(Duration::minutes(4));
        let second = cache.load().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(second.origin, FeedOrigin::Cached);
        assert_eq!(second.posts, first);
    }

    #[tokio::test]
    async fn test_refreshes_after_ttl() {
        let source = FakeSource::ok("feeds", vec![post("a", "2025-01-01", "10:00")]);
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![source.clone()], clock.clone());

        cache.get_all_posts().await;
        source.set_result(Ok(vec![post("b", "2025-01-02", "10:00")]));
        clock.advance(Duration::minutes(5));
        let snapshot = cache.load().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(snapshot.origin, FeedOrigin::Fresh);
        assert_eq!(ids(&snapshot.posts), vec!["b"]);
    }

    #[tokio::test]
    async fn test_entry_is_stamped_before_the_merge() {
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let source = Arc::new(SlowSource {
            clock: clock.clone(),
            delay: Duration::seconds(3),
            calls: AtomicUsize::new(0),
        });
        let cache = cache(vec![source.clone()], clock.clone());

        let mut origins = Vec::new();
        let start = clock.now();
        for tick in 0..4i32 {
            *clock.time.lock().unwrap() = start + Duration::minutes(5) * tick;
            origins.push(cache.load().await.origin);
        }

        assert_eq!(origins, vec![FeedOrigin::Fresh; 4]);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_one_failing_source_does_not_block_others() {
        let good = FakeSource::ok("feeds", vec![post("a", "2025-01-01", "10:00")]);
        let bad = FakeSource::failing("x");
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![bad, good], clock);

        let snapshot = cache.load().await;

        assert_eq!(snapshot.origin, FeedOrigin::Fresh);
        assert_eq!(ids(&snapshot.posts), vec!["a"]);

        let report = cache.last_report().await;
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].source, "x");
        assert!(matches!(report[0].outcome, SourceOutcome::Failed(_)));
        assert_eq!(report[1].outcome, SourceOutcome::Fetched(1));
    }

    #[tokio::test]
    async fn test_all_sources_failing_serves_stale_cache() {
        let source = FakeSource::ok(
            "feeds",
            vec![
                post("a", "2025-01-01", "10:00"),
                post("b", "2025-01-01", "11:00"),
            ],
        );
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![source.clone()], clock.clone());

        let first = cache.get_all_posts().await;
        source.set_result(Err("down".to_string()));
        clock.advance(Duration::hours(1));
        let snapshot = cache.load().await;

        assert_eq!(snapshot.origin, FeedOrigin::Stale);
        assert_eq!(snapshot.posts, first);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_refresh_does_not_clear_cache() {
        let source = FakeSource::ok("feeds", vec![post("a", "2025-01-01", "10:00")]);
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![source.clone()], clock.clone());

        cache.get_all_posts().await;
        source.set_result(Ok(vec![]));
        clock.advance(Duration::minutes(10));

        let snapshot = cache.load().await;
        assert_eq!(snapshot.origin, FeedOrigin::Stale);
        assert_eq!(ids(&snapshot.posts), vec!["a"]);
        assert_eq!(
            cache.last_report().await[0].outcome,
            SourceOutcome::Fetched(0)
        );
    }

    #[tokio::test]
    async fn test_no_cache_and_no_data_serves_placeholders() {
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(
            vec![FakeSource::failing("x"), FakeSource::ok("feeds", vec![])],
            clock,
        );

        let snapshot = cache.load().await;

        assert_eq!(snapshot.origin, FeedOrigin::Placeholder);
        assert_eq!(
            snapshot.posts,
            placeholder_posts(datetime!(2025-01-02 10:00 UTC), UtcOffset::UTC)
        );
        assert!(!snapshot.posts.is_empty());
        assert!(snapshot.posts.iter().all(|p| p.category == SYSTEM_CATEGORY));
    }

    #[tokio::test]
    async fn test_placeholders_are_not_cached() {
        let source = FakeSource::failing("x");
        let clock = FakeClock::at(datetime!(2025-01-02 10:00 UTC));
        let cache = cache(vec![source.clone()], clock);

        cache.get_all_posts().await;
        cache.get_all_posts().await;

        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first() {
        let mut dup = post("same", "2025-01-03", "10:00");
        dup.content = "second copy".to_string();
        let source = FakeSource::ok("feeds", vec![post("same", "2025-01-01", "10:00"), dup]);
        let clock = FakeClock::at(datetime!(2025-01-04 10:00 UTC));
        let cache = cache(vec![source], clock);

        let posts = cache.get_all_posts().await;

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "content same");
    }
}
