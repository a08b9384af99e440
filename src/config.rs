use std::env;

use crate::services::status::ConcludedRule;

pub const DEFAULT_NOTIFIER_ENDPOINT: &str = "https://api.twitter.com/1.1/statuses/update.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_key: String,
    pub base_uri: String,
    pub host: String,
    pub port: u16,
    pub concluded_rule: ConcludedRule,
    pub notifier: NotifierConfig,
}

/// OAuth 1.0a credential set and target of the status-posting endpoint.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://status_notices.db?mode=rwc".into()),
            api_key: required("API_KEY")?,
            base_uri: required("BASE_URI")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            concluded_rule: env::var("CONCLUDED_RULE")
                .unwrap_or_else(|_| "end_passed".into())
                .parse()?,
            notifier: NotifierConfig {
                endpoint: env::var("NOTIFIER_ENDPOINT")
                    .ok()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_NOTIFIER_ENDPOINT.into()),
                timeout_seconds: env::var("NOTIFIER_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".into())
                    .parse()?,
                consumer_key: required("TWITTER_API_KEY")?,
                consumer_secret: required("TWITTER_API_SECRET")?,
                access_token: required("TWITTER_ACCESS_TOKEN")?,
                access_secret: required("TWITTER_ACCESS_SECRET")?,
            },
        })
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("Missing required env var: {}", key))
}
