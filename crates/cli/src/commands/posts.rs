//! Posts command - one merge cycle, then search and filter

use anyhow::{Context, Result};
use secrecy::SecretString;
use social_feed_adapters::StubPostSource;
use social_feed_adapters::feeds::{FeedPostSource, FeedSpec, RetryPolicy};
use social_feed_adapters::x::{XPostSource, XSourceConfig};
use social_feed_domain::usecases::{
    AggregationCache, CacheConfig, Normalizer, apply, validate_filters,
};
use social_feed_domain::{
    EngagementGenerator, Post, PostSource, SearchFilters, SyntheticEngagement, SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::{PostsArgs, SourceArgs};
use crate::config::AppConfig;

pub async fn execute(args: PostsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let filters = SearchFilters {
        platform: args.platform,
        category: args.category.clone(),
        date_from: args.from.clone(),
        date_to: args.to.clone(),
        tags: if args.tags.is_empty() {
            None
        } else {
            Some(args.tags.clone())
        },
    };
    validate_filters(&filters).context("Invalid filters")?;

    let cache = build_cache(&config, args.source)?;
    let snapshot = cache.load().await;

    let mut posts = apply(&snapshot.posts, &args.query, &filters);
    if let Some(limit) = args.limit {
        posts.truncate(limit);
    }

    tracing::info!(
        origin = ?snapshot.origin,
        total = snapshot.posts.len(),
        matched = posts.len(),
        "Query complete"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else {
        print_posts(&posts);
    }

    Ok(())
}

/// Wire the configured sources into an aggregation cache
pub(crate) fn build_cache(
    config: &AppConfig,
    source: SourceArgs,
) -> Result<AggregationCache<SystemClock>> {
    let offset = config.utc_offset();
    let clock = Arc::new(SystemClock);

    let engagement: Arc<dyn EngagementGenerator> = match config.engagement.seed {
        Some(seed) => Arc::new(SyntheticEngagement::seeded(seed)),
        None => Arc::new(SyntheticEngagement::from_entropy()),
    };
    let normalizer = Normalizer::new(engagement, clock.clone(), offset);

    let mut sources: Vec<Arc<dyn PostSource>> = Vec::new();

    if source.offline {
        tracing::info!("Offline mode, network sources disabled");
        sources.push(Arc::new(StubPostSource::empty().named("offline")));
    } else {
        if config.x.enabled {
            sources.push(Arc::new(build_x_source(config, normalizer.clone())?));
        }
        if config.feeds.enabled {
            sources.push(Arc::new(build_feed_source(config, normalizer)?));
        }
    }

    if sources.is_empty() {
        tracing::warn!("No sources enabled");
    }

    let cache_config = CacheConfig {
        ttl: time::Duration::seconds(config.general.cache_ttl_secs as i64),
        utc_offset: offset,
    };
    Ok(AggregationCache::new(sources, clock, cache_config))
}

fn build_x_source(config: &AppConfig, normalizer: Normalizer) -> Result<XPostSource> {
    let bearer_token = load_bearer_token(&config.x.bearer_token_env);
    let language = Some(config.x.language.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string);

    let source_config = XSourceConfig {
        accounts: config.x.accounts.clone(),
        max_results: config.x.max_results,
        language,
        ..Default::default()
    };

    XPostSource::with_base_url(
        bearer_token,
        config.x.base_url.clone(),
        source_config,
        normalizer,
    )
    .context("Failed to initialize X source")
}

fn build_feed_source(config: &AppConfig, normalizer: Normalizer) -> Result<FeedPostSource> {
    let feeds = config
        .feeds
        .sources
        .iter()
        .map(|s| FeedSpec::new(s.key.clone(), s.url.clone()))
        .collect();

    let retry = RetryPolicy {
        attempts: config.feeds.retries,
        backoff_step: Duration::from_secs(config.feeds.backoff_secs),
        request_timeout: Duration::from_secs(config.feeds.timeout_secs),
    };

    Ok(FeedPostSource::new(feeds, normalizer)
        .context("Failed to initialize feed source")?
        .with_retry_policy(retry)
        .with_max_items_per_feed(config.feeds.max_items_per_feed))
}

/// Read the bearer token; absence is reported by the X source on each fetch
pub(crate) fn load_bearer_token(env_var: &str) -> Option<SecretString> {
    if env_var.trim().is_empty() {
        return None;
    }

    match std::env::var(env_var) {
        Ok(token) if !token.trim().is_empty() => Some(SecretString::new(token.into())),
        _ => {
            tracing::warn!(env_var = %env_var, "X bearer token not set");
            None
        }
    }
}

fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No posts match.");
        return;
    }

    for post in posts {
        println!(
            "[{} {}] {} | {}",
            post.date, post.time, post.platform, post.category
        );
        if let Some(ref author) = post.author {
            println!("  @{} ({})", author.username, author.name);
        }
        println!("  {}", post.summary);
        if !post.tags.is_empty() {
            println!("  #{}", post.tags.join(" #"));
        }
        println!(
            "  likes {} | shares {} | comments {}",
            post.engagement.likes, post.engagement.shares, post.engagement.comments
        );
        if let Some(ref url) = post.url {
            println!("  {}", url);
        }
        println!();
    }
    println!("{} post(s)", posts.len());
}
