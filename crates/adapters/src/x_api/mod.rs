//! X (Twitter) API adapters

mod read;

pub use read::{XPostSource, XSourceConfig};
