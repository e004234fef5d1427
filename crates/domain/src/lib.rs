//! social-feed domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Post model and value objects
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: Normalizer, aggregation cache and query layer
//! - `rules`: Ordered keyword tables for tags and categories
//! - `engagement`: Synthetic engagement generator for feed-derived posts

pub mod engagement;
pub mod model;
pub mod ports;
pub mod rules;
pub mod usecases;

pub use engagement::SyntheticEngagement;
pub use model::*;
pub use ports::*;
