//! social-feed CLI entry point

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod args;
mod commands;
mod config;

use args::{Cli, Commands, LogFormat};
use crate::config::AppConfig;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = resolve_log_level(cli.log_level.as_deref(), cli.config.as_deref());
    init_logging(&log_level, cli.log_format)?;

    match cli.command {
        Commands::Posts(args) => commands::posts::execute(args, cli.config).await,
        Commands::Categories(args) => commands::facets::categories(args, cli.config).await,
        Commands::Tags(args) => commands::facets::tags(args, cli.config).await,
        Commands::Run(args) => commands::run::execute(args, cli.config).await,
        Commands::Config(args) => commands::config::execute(args).await,
        Commands::Doctor(args) => commands::doctor::execute(args, cli.config).await,
    }
}

/// `--log-level` wins, then `general.log_level`, then `info`.
/// Config errors are left for the command itself to report.
fn resolve_log_level(flag: Option<&str>, config_path: Option<&Path>) -> String {
    if let Some(level) = flag {
        return level.to_string();
    }
    AppConfig::load(config_path)
        .map(|c| c.general.log_level)
        .unwrap_or_else(|_| "info".to_string())
}

fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}
