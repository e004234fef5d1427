//! social-feed adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `x`: X (Twitter) REST API source
//! - `feeds`: RSS / Atom feed source with retry
//! - `stub`: fixed in-process source for offline runs
//! - `snapshot`: JSON snapshot writer for `run` mode

pub mod feeds;
pub mod snapshot;
mod stub;
pub mod x_api;

/// Re-exports for X API adapters
pub mod x {
    pub use crate::x_api::{XPostSource, XSourceConfig};
}

pub use stub::StubPostSource;
