//! X API read adapter for fetching account timelines

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use social_feed_domain::usecases::Normalizer;
use social_feed_domain::{Author, Engagement, Post, PostSource, PostSourceError, RawTweet};
use std::time::Duration;
use time::OffsetDateTime;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com";
const USER_FIELDS: &str = "name,username,verified";
const TWEET_FIELDS: &str = "created_at,public_metrics,context_annotations,lang";

/// Which accounts to read and which tweets to keep
#[derive(Debug, Clone)]
pub struct XSourceConfig {
    /// Account handles, without `@`
    pub accounts: Vec<String>,
    /// Tweets requested per account
    pub max_results: u32,
    /// Keep only tweets in this language (tweets without a language tag are kept)
    pub language: Option<String>,
    /// Tweets starting with this marker are reshares and are dropped
    pub repost_marker: String,
}

impl Default for XSourceConfig {
    fn default() -> Self {
        Self {
            accounts: vec![],
            max_results: 20,
            language: Some("tr".to_string()),
            repost_marker: "RT @".to_string(),
        }
    }
}

/// X API post source for reading user timelines
pub struct XPostSource {
    client: Client,
    bearer_token: Option<SecretString>,
    base_url: String,
    config: XSourceConfig,
    normalizer: Normalizer,
}

impl XPostSource {
    pub fn new(
        bearer_token: Option<SecretString>,
        config: XSourceConfig,
        normalizer: Normalizer,
    ) -> Result<Self, PostSourceError> {
        Self::with_base_url(bearer_token, DEFAULT_BASE_URL.to_string(), config, normalizer)
    }

    pub fn with_base_url(
        bearer_token: Option<SecretString>,
        base_url: String,
        config: XSourceConfig,
        normalizer: Normalizer,
    ) -> Result<Self, PostSourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PostSourceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            bearer_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
            normalizer,
        })
    }

    fn token(&self) -> Result<&str, PostSourceError> {
        self.bearer_token
            .as_ref()
            .map(|t| t.expose_secret())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| PostSourceError::Config("X bearer token is not set".to_string()))
    }

    async fn get(&self, url: &str, token: &str) -> Result<Response, PostSourceError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| PostSourceError::Network(e.to_string()))?;

        check_status(response).await
    }

    /// Look up a user profile by username
    async fn get_user(&self, username: &str, token: &str) -> Result<UserData, PostSourceError> {
        let url = format!(
            "{}/2/users/by/username/{}?user.fields={}",
            self.base_url, username, USER_FIELDS
        );

        let user_response: UserResponse = self
            .get(&url, token)
            .await?
            .json()
            .await
            .map_err(|e| PostSourceError::Parse(e.to_string()))?;

        user_response
            .data
            .ok_or_else(|| PostSourceError::Api(format!("User not found: {}", username)))
    }

    /// Fetch recent tweets for a resolved user
    async fn fetch_user_tweets(
        &self,
        user: &UserData,
        token: &str,
    ) -> Result<Vec<Post>, PostSourceError> {
        let url = format!(
            "{}/2/users/{}/tweets?max_results={}&tweet.fields={}&expansions=author_id&user.fields={}",
            self.base_url, user.id, self.config.max_results, TWEET_FIELDS, USER_FIELDS
        );

        let timeline: TimelineResponse = self
            .get(&url, token)
            .await?
            .json()
            .await
            .map_err(|e| PostSourceError::Parse(e.to_string()))?;

        let included_users = timeline.includes.map(|i| i.users).unwrap_or_default();

        let posts = timeline
            .data
            .unwrap_or_default()
            .into_iter()
            .filter(|tweet| self.keep_tweet(tweet))
            .map(|tweet| {
                let profile = tweet
                    .author_id
                    .as_ref()
                    .and_then(|id| included_users.iter().find(|u| &u.id == id))
                    .unwrap_or(user);
                self.normalizer.tweet_post(to_raw_tweet(tweet, profile))
            })
            .collect();

        Ok(posts)
    }

    fn keep_tweet(&self, tweet: &Tweet) -> bool {
        if let (Some(wanted), Some(lang)) = (&self.config.language, &tweet.lang) {
            if lang != wanted {
                tracing::debug!(tweet_id = %tweet.id, lang = %lang, "Skipping tweet in other language");
                return false;
            }
        }
        if tweet.text.starts_with(&self.config.repost_marker) {
            tracing::debug!(tweet_id = %tweet.id, "Skipping reshare");
            return false;
        }
        true
    }
}

async fn check_status(response: Response) -> Result<Response, PostSourceError> {
    let status = response.status();

    if status == 401 {
        return Err(PostSourceError::Auth("Invalid bearer token".to_string()));
    }

    if status == 429 {
        let retry_after = response
            .headers()
            .get("x-rate-limit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(|ts| {
                let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
                Duration::from_secs(ts.saturating_sub(now))
            });
        return Err(PostSourceError::RateLimited(retry_after));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PostSourceError::Upstream {
            status: status.as_u16(),
            message: body,
        });
    }

    Ok(response)
}

fn to_raw_tweet(tweet: Tweet, profile: &UserData) -> RawTweet {
    let created_at = tweet.created_at.as_ref().and_then(|s| {
        OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339).ok()
    });
    let engagement = tweet
        .public_metrics
        .map(|m| Engagement {
            likes: m.like_count,
            shares: m.retweet_count + m.quote_count,
            comments: m.reply_count,
        })
        .unwrap_or_default();

    RawTweet {
        url: format!("https://twitter.com/{}/status/{}", profile.username, tweet.id),
        id: tweet.id,
        text: tweet.text,
        created_at,
        engagement,
        annotations: tweet
            .context_annotations
            .into_iter()
            .map(|a| a.entity.name)
            .collect(),
        author: Author {
            username: profile.username.clone(),
            name: profile.name.clone(),
            verified: profile.verified,
        },
    }
}

#[derive(Deserialize)]
struct UserResponse {
    data: Option<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
struct UserData {
    id: String,
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    verified: bool,
}

#[derive(Deserialize)]
struct TimelineResponse {
    data: Option<Vec<Tweet>>,
    includes: Option<Includes>,
}

#[derive(Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<UserData>,
}

#[derive(Deserialize)]
struct Tweet {
    id: String,
    text: String,
    created_at: Option<String>,
    author_id: Option<String>,
    lang: Option<String>,
    public_metrics: Option<PublicMetrics>,
    #[serde(default)]
    context_annotations: Vec<ContextAnnotation>,
}

#[derive(Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
    #[serde(default)]
    quote_count: u64,
}

#[derive(Deserialize)]
struct ContextAnnotation {
    entity: AnnotationEntity,
}

#[derive(Deserialize)]
struct AnnotationEntity {
    name: String,
}

#[async_trait]
impl PostSource for XPostSource {
    fn name(&self) -> &str {
        "x"
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, PostSourceError> {
        let token = self.token()?;
        let mut posts = Vec::new();

        for account in &self.config.accounts {
            tracing::info!(account = %account, "Fetching posts from X");

            let user = match self.get_user(account, token).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(account = %account, error = %e, "User lookup failed, skipping account");
                    continue;
                }
            };

            match self.fetch_user_tweets(&user, token).await {
                Ok(account_posts) => {
                    tracing::info!(account = %account, count = account_posts.len(), "Fetched posts");
                    posts.extend(account_posts);
                }
                Err(e) => {
                    tracing::warn!(account = %account, error = %e, "Timeline fetch failed, skipping account");
                }
            }
        }

        Ok(posts)
    }
}
