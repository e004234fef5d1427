//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use social_feed_domain::Platform;
use std::path::PathBuf;

/// social-feed: aggregate, search and filter a public figure's social media posts
#[derive(Parser, Debug)]
#[command(name = "social-feed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, search and filter posts
    Posts(PostsArgs),

    /// List the categories present in the feed
    Categories(FacetArgs),

    /// List the most frequent tags
    Tags(TagsArgs),

    /// Refresh the feed periodically and write snapshots
    Run(RunArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct SourceArgs {
    /// Skip all network sources and use an empty local source
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug)]
pub struct PostsArgs {
    /// Free-text query; every word must match
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Only posts from this platform
    #[arg(long, value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Only posts in this exact category
    #[arg(long)]
    pub category: Option<String>,

    /// Earliest date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Keep posts with a tag containing this text (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Maximum number of posts to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct FacetArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct TagsArgs {
    /// Number of tags to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Seconds between refreshes (defaults to the cache TTL)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Refresh once and exit
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    value.parse::<Platform>().map_err(|e| e.to_string())
}
