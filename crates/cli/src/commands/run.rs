//! Run command - periodic refresh loop with optional snapshot output

use anyhow::{Context, Result};
use social_feed_adapters::snapshot::SnapshotWriter;
use social_feed_domain::usecases::{AggregationCache, SourceOutcome};
use social_feed_domain::SystemClock;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::interval;

use crate::args::RunArgs;
use crate::commands::posts::build_cache;
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let writer = match config.general.snapshot_path.clone() {
        Some(path) => Some(
            SnapshotWriter::new(path)
                .await
                .context("Failed to initialize snapshot writer")?,
        ),
        None => None,
    };

    tracing::info!(
        once = args.once,
        offline = args.source.offline,
        accounts = ?config.x.accounts,
        feeds = config.feeds.sources.len(),
        snapshot = ?writer.as_ref().map(|w| w.path().display().to_string()),
        "Starting social-feed run"
    );

    let cache = build_cache(&config, args.source)?;

    if args.once {
        refresh(&cache, writer.as_ref()).await?;
    } else {
        let period = args
            .interval_secs
            .unwrap_or(config.general.cache_ttl_secs)
            .max(1);
        let mut ticker = interval(Duration::from_secs(period));

        let shutdown = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutdown signal received"),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = refresh(&cache, writer.as_ref()).await {
                        tracing::error!(error = %e, "Refresh failed");
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down gracefully");
                    break;
                }
            }
        }
    }

    tracing::info!("social-feed run completed");
    Ok(())
}

async fn refresh(
    cache: &AggregationCache<SystemClock>,
    writer: Option<&SnapshotWriter>,
) -> Result<()> {
    let snapshot = cache.load().await;

    for report in cache.last_report().await {
        match report.outcome {
            SourceOutcome::Fetched(count) => {
                tracing::debug!(source = %report.source, count, "Source outcome")
            }
            SourceOutcome::Failed(error) => {
                tracing::warn!(source = %report.source, error = %error, "Source outcome")
            }
        }
    }

    tracing::info!(
        origin = ?snapshot.origin,
        count = snapshot.posts.len(),
        "Refresh complete"
    );

    if let Some(writer) = writer {
        writer
            .write(&snapshot, OffsetDateTime::now_utc())
            .await
            .context("Failed to write snapshot")?;
    }

    Ok(())
}
