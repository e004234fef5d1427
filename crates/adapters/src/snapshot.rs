//! JSON snapshot of the merged timeline for `run` mode.

use serde::Serialize;
use social_feed_domain::Post;
use social_feed_domain::usecases::{FeedOrigin, FeedSnapshot};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    #[serde(with = "time::serde::rfc3339")]
    generated_at: OffsetDateTime,
    origin: FeedOrigin,
    count: usize,
    posts: &'a [Post],
}

/// Writes the whole timeline to one file, replacing it atomically
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    pub async fn new(path: PathBuf) -> Result<Self, SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn write(
        &self,
        snapshot: &FeedSnapshot,
        generated_at: OffsetDateTime,
    ) -> Result<(), SnapshotError> {
        let document = SnapshotDocument {
            generated_at,
            origin: snapshot.origin,
            count: snapshot.posts.len(),
            posts: &snapshot.posts,
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), count = document.count, "Wrote snapshot");
        Ok(())
    }
}
