use crate::ConfigError;

/// Runtime configuration for the analytics core.
///
/// The API key is optional at load time: collection aborts with a soft
/// "unavailable" status when it is missing, so a dashboard can still render
/// cached data without credentials configured.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_request_delay_ms: u64,
    pub max_consecutive_empty_pages: u32,
    pub followers_max_pages: u32,
    pub followers_max_items: usize,
    pub tweets_max_pages: u32,
    pub tweets_max_items: usize,
    pub top_follower_count: usize,
    pub hot_post_count: usize,
    pub follower_cache_ttl_secs: i64,
    pub tweet_cache_ttl_secs: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("api_base_url", &self.api_base_url)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field(
                "max_consecutive_empty_pages",
                &self.max_consecutive_empty_pages,
            )
            .field("followers_max_pages", &self.followers_max_pages)
            .field("followers_max_items", &self.followers_max_items)
            .field("tweets_max_pages", &self.tweets_max_pages)
            .field("tweets_max_items", &self.tweets_max_items)
            .field("top_follower_count", &self.top_follower_count)
            .field("hot_post_count", &self.hot_post_count)
            .field("follower_cache_ttl_secs", &self.follower_cache_ttl_secs)
            .field("tweet_cache_ttl_secs", &self.tweet_cache_ttl_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: "https://fapi.uk/api/base/apitools".to_owned(),
            user_agent: "kolscope/0.1 (kol-analytics)".to_owned(),
            request_timeout_secs: 25,
            max_retries: 3,
            retry_backoff_base_ms: 1_000,
            inter_request_delay_ms: 1_500,
            max_consecutive_empty_pages: 3,
            followers_max_pages: 200,
            followers_max_items: 5_000,
            tweets_max_pages: 100,
            tweets_max_items: 500,
            top_follower_count: 20,
            hot_post_count: 12,
            follower_cache_ttl_secs: 24 * 60 * 60,
            tweet_cache_ttl_secs: 6 * 60 * 60,
        }
    }
}

/// Load configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// The parsing/validation logic is decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var`
/// needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let defaults = AppConfig::default();

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: u32| -> Result<u32, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_i64 = |var: &str, default: i64| -> Result<i64, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        }
    };

    Ok(AppConfig {
        api_key: lookup("KOL_API_KEY").ok(),
        api_base_url: or_default("KOL_API_BASE_URL", &defaults.api_base_url),
        user_agent: or_default("KOL_USER_AGENT", &defaults.user_agent),
        request_timeout_secs: parse_u64("KOL_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
        max_retries: parse_u32("KOL_MAX_RETRIES", defaults.max_retries)?,
        retry_backoff_base_ms: parse_u64(
            "KOL_RETRY_BACKOFF_BASE_MS",
            defaults.retry_backoff_base_ms,
        )?,
        inter_request_delay_ms: parse_u64(
            "KOL_INTER_REQUEST_DELAY_MS",
            defaults.inter_request_delay_ms,
        )?,
        max_consecutive_empty_pages: parse_u32(
            "KOL_MAX_CONSECUTIVE_EMPTY_PAGES",
            defaults.max_consecutive_empty_pages,
        )?,
        followers_max_pages: parse_u32("KOL_FOLLOWERS_MAX_PAGES", defaults.followers_max_pages)?,
        followers_max_items: parse_usize("KOL_FOLLOWERS_MAX_ITEMS", defaults.followers_max_items)?,
        tweets_max_pages: parse_u32("KOL_TWEETS_MAX_PAGES", defaults.tweets_max_pages)?,
        tweets_max_items: parse_usize("KOL_TWEETS_MAX_ITEMS", defaults.tweets_max_items)?,
        top_follower_count: parse_usize("KOL_TOP_FOLLOWER_COUNT", defaults.top_follower_count)?,
        hot_post_count: parse_usize("KOL_HOT_POST_COUNT", defaults.hot_post_count)?,
        follower_cache_ttl_secs: parse_i64(
            "KOL_FOLLOWER_CACHE_TTL_SECS",
            defaults.follower_cache_ttl_secs,
        )?,
        tweet_cache_ttl_secs: parse_i64("KOL_TWEET_CACHE_TTL_SECS", defaults.tweet_cache_ttl_secs)?,
    })
}
