use std::env;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL used when a credential is configured
    pub api_url: String,
    /// Base URL used for unauthenticated, rate-limited requests
    pub public_api_url: String,
    /// Path prefix of the trends endpoint, followed by `<woeid>.<ext>`
    pub trends_path: String,
    /// Bearer token used to sign requests
    pub bearer_token: Option<String>,
    /// Remaining-calls level below which a warning is shown (default: 100)
    pub low_quota_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://api.twitter.com".to_string(),
            public_api_url: "http://api.twitter.com".to_string(),
            trends_path: "/1/trends/".to_string(),
            bearer_token: None,
            low_quota_threshold: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("TTC_API_URL").unwrap_or(defaults.api_url);
        let public_api_url = lookup("TTC_PUBLIC_API_URL").unwrap_or(defaults.public_api_url);
        let trends_path = lookup("TTC_TRENDS_PATH").unwrap_or(defaults.trends_path);

        let bearer_token = lookup("TTC_BEARER_TOKEN").filter(|token| !token.trim().is_empty());

        let low_quota_threshold = match lookup("TTC_LOW_QUOTA_THRESHOLD") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TTC_LOW_QUOTA_THRESHOLD"))?,
            None => defaults.low_quota_threshold,
        };

        Ok(Self {
            api_url,
            public_api_url,
            trends_path,
            bearer_token,
            low_quota_threshold,
        })
    }

    /// Base URL for the next request, depending on whether it will be signed
    pub fn base_url(&self) -> &str {
        if self.bearer_token.is_some() {
            &self.api_url
        } else {
            &self.public_api_url
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
