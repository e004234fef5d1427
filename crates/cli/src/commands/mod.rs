//! Subcommand implementations

pub mod config;
pub mod doctor;
pub mod facets;
pub mod posts;
pub mod run;
