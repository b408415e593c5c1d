use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: String,
    pub vision_model: String,
    pub completions_url: String,
    pub price_cache_ttl: Duration,
    pub storefront_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = env::var("OPENAI_API_KEY").map_err(|_| ConfigError::MissingApiKey)?;

        // Get vision model from env or use default
        let vision_model =
            env::var("OPENAI_VISION_MODEL").unwrap_or_else(|_| "gpt-4o-2024-08-06".to_string());

        // Get API URL from env or use default
        let completions_url = env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let price_cache_ttl = env::var("PRICE_CACHE_TTL_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300));

        let storefront_timeout = env::var("STOREFRONT_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(8));

        Ok(Self {
            openai_api_key,
            vision_model,
            completions_url,
            price_cache_ttl,
            storefront_timeout,
        })
    }
}
