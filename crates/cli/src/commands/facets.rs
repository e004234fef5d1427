//! Categories and tags commands

use anyhow::Result;
use social_feed_domain::usecases::{get_categories, get_popular_tags};
use std::path::PathBuf;

use crate::args::{FacetArgs, TagsArgs};
use crate::commands::posts::build_cache;
use crate::config::AppConfig;

pub async fn categories(args: FacetArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let posts = build_cache(&config, args.source)?.get_all_posts().await;

    print_list(&get_categories(&posts), args.json)
}

pub async fn tags(args: TagsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let posts = build_cache(&config, args.source)?.get_all_posts().await;

    print_list(&get_popular_tags(&posts, args.limit), args.json)
}

fn print_list(items: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(items)?);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}
