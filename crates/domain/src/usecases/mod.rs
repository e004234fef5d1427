//! Application use cases / business logic

pub mod aggregate;
pub mod normalize;
pub mod query;

pub use aggregate::{
    AggregationCache, CacheConfig, CacheEntry, FeedOrigin, FeedSnapshot, SourceOutcome,
    SourceReport,
};
pub use normalize::{
    Normalizer, categorize_content, clean_content, extract_tags, extract_tags_with,
    generate_summary,
};
pub use query::{
    QueryError, apply, filter_posts, get_categories, get_popular_tags, search_posts,
    validate_filters,
};
