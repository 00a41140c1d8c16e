//! Session configuration.
use std::{env, fmt};

/// Environment variable of [`Config::api_url`].
pub const ENV_API_URL: &str = "REST_API_URL";
/// Environment variable of [`Config::anti_cache`].
pub const ENV_ANTI_CACHE: &str = "REST_ANTI_CACHE";
/// Environment variable of [`Config::debug`].
pub const ENV_DEBUG: &str = "REST_DEBUG";
/// Environment variable of [`Config::cache_limit`].
pub const ENV_CACHE_LIMIT: &str = "REST_CACHE_LIMIT";

/// Session configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Prefix of templated request paths.
    pub api_url: Option<String>,
    /// Add the anti cache query parameter and conditional headers, and record responses.
    pub anti_cache: bool,
    /// Keep the last prepared request.
    pub debug: bool,
    /// Maximum number of cache records, unbounded if `None`.
    pub cache_limit: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup.
    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|url| !url.is_empty()) {
            config.api_url = Some(url);
        }
        if let Some(value) = lookup(ENV_ANTI_CACHE) {
            config.anti_cache = parse_bool(ENV_ANTI_CACHE, value)?;
        }
        if let Some(value) = lookup(ENV_DEBUG) {
            config.debug = parse_bool(ENV_DEBUG, value)?;
        }
        if let Some(value) = lookup(ENV_CACHE_LIMIT) {
            match value.trim().parse() {
                Ok(limit) => config.cache_limit = Some(limit),
                Err(_) => return Err(ConfigError::new(ENV_CACHE_LIMIT, value)),
            }
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_anti_cache(mut self, anti_cache: bool) -> Self {
        self.anti_cache = anti_cache;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = Some(limit);
        self
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    const TRUE: [&str; 4] = ["1", "true", "yes", "on"];
    const FALSE: [&str; 4] = ["0", "false", "no", "off"];

    let trimmed = value.trim();
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
        Ok(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(trimmed)) {
        Ok(false)
    } else {
        Err(ConfigError::new(key, value))
    }
}

// ===== Error =====

/// An environment variable holds an invalid value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    key: &'static str,
    value: String,
}

impl ConfigError {
    fn new(key: &'static str, value: String) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.key, self.value)
    }
}
