//! Query layer - search, filter, and facet derivation over an in-memory post list

use std::collections::HashMap;
use thiserror::Error;
use time::Date;
use time::macros::format_description;

use crate::model::{Post, SearchFilters};
use crate::rules::fold_case;

/// Errors for malformed query input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid {field} date '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },
    #[error("Date range is empty: {from} is after {to}")]
    EmptyRange { from: String, to: String },
}

/// Check that date bounds are ISO dates and form a non-empty range.
///
/// The filter itself compares strings, which only matches calendar order for
/// well-formed `YYYY-MM-DD` values.
pub fn validate_filters(filters: &SearchFilters) -> Result<(), QueryError> {
    let parse = |field: &'static str, value: &str| {
        Date::parse(value, format_description!("[year]-[month]-[day]")).map_err(|_| {
            QueryError::InvalidDate {
                field,
                value: value.to_string(),
            }
        })
    };

    let from = filters
        .date_from
        .as_deref()
        .map(|v| parse("from", v))
        .transpose()?;
    let to = filters
        .date_to
        .as_deref()
        .map(|v| parse("to", v))
        .transpose()?;

    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(QueryError::EmptyRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
    Ok(())
}

/// Keep posts whose searchable text contains every whitespace-separated token.
///
/// Searchable text is content, summary, tags and category. A blank query
/// returns the input unchanged.
pub fn search_posts(posts: &[Post], query: &str) -> Vec<Post> {
    let tokens: Vec<String> = query.split_whitespace().map(fold_case).collect();
    if tokens.is_empty() {
        return posts.to_vec();
    }

    posts
        .iter()
        .filter(|post| {
            let haystack = fold_case(&searchable_text(post));
            tokens.iter().all(|token| haystack.contains(token.as_str()))
        })
        .cloned()
        .collect()
}

fn searchable_text(post: &Post) -> String {
    format!(
        "{} {} {} {}",
        post.content,
        post.summary,
        post.tags.join(" "),
        post.category
    )
}

/// Keep posts that satisfy every constrained dimension of `filters`.
///
/// Platform and category are exact matches; dates are inclusive ISO string
/// comparisons. Tags pass when any requested tag is a case-insensitive
/// substring of any post tag.
pub fn filter_posts(posts: &[Post], filters: &SearchFilters) -> Vec<Post> {
    let wanted_tags: Vec<String> = filters
        .tags
        .iter()
        .flatten()
        .map(|t| fold_case(t.trim()))
        .filter(|t| !t.is_empty())
        .collect();

    posts
        .iter()
        .filter(|post| {
            if let Some(platform) = filters.platform {
                if post.platform != platform {
                    return false;
                }
            }
            if let Some(ref category) = filters.category {
                if &post.category != category {
                    return false;
                }
            }
            if let Some(ref from) = filters.date_from {
                if post.date.as_str() < from.as_str() {
                    return false;
                }
            }
            if let Some(ref to) = filters.date_to {
                if post.date.as_str() > to.as_str() {
                    return false;
                }
            }
            if !wanted_tags.is_empty() {
                let post_tags: Vec<String> = post.tags.iter().map(|t| fold_case(t)).collect();
                let any_match = wanted_tags
                    .iter()
                    .any(|wanted| post_tags.iter().any(|tag| tag.contains(wanted.as_str())));
                if !any_match {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Search then filter
pub fn apply(posts: &[Post], query: &str, filters: &SearchFilters) -> Vec<Post> {
    filter_posts(&search_posts(posts, query), filters)
}

/// Sorted, de-duplicated list of non-empty categories
pub fn get_categories(posts: &[Post]) -> Vec<String> {
    let mut categories: Vec<String> = posts
        .iter()
        .map(|p| p.category.clone())
        .filter(|c| !c.is_empty())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// The `limit` most frequent tags, most frequent first.
///
/// Ties keep the order in which tags were first seen.
pub fn get_popular_tags(posts: &[Post], limit: usize) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for tag in posts.iter().flat_map(|p| p.tags.iter()) {
        let count = counts.entry(tag.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(tag.as_str());
        }
        *count += 1;
    }

    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
    first_seen
        .into_iter()
        .take(limit)
        .map(str::to_string)
        .collect()
}
