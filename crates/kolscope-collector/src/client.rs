//! HTTP client for the third-party X-data proxy API.
//!
//! Wraps `reqwest` with per-request retry, 4xx short-circuiting, and the
//! nested-JSON envelope normalization the upstream requires. Page-level
//! methods return one parsed [`Page`]; the `collect_*` methods drive the
//! generic pagination loop to a full deduplicated listing.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde_json::Value;

use kolscope_core::{AppConfig, FollowerProfile, Post, ProfileSummary};

use crate::error::CollectorError;
use crate::followers::parse_followers_page;
use crate::normalize::normalize_nested_json;
use crate::paginate::{collect_pages, CollectLimits, Collection, Page};
use crate::retry::retry_with_backoff;
use crate::tweets::parse_tweets_page;
use crate::wire::{count_field, str_field};

/// Client for the X-data proxy endpoints (`followersListV2`, `userTweetsV2`,
/// `userByScreenNameV2`).
pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl ApiClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::MissingApiKey`] if no API credential is
    /// configured, or [`CollectorError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollectorError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(CollectorError::MissingApiKey)?;
        Self::with_base_url(
            &api_key,
            config.request_timeout_secs,
            &config.api_base_url,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, CollectorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    /// Fetches one page of the followers listing.
    ///
    /// # Errors
    ///
    /// - [`CollectorError::ClientRejected`] on a 4xx response.
    /// - [`CollectorError::Http`] on network failure or 5xx after retries.
    /// - [`CollectorError::Deserialize`] if the body is not valid JSON.
    pub async fn followers_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<FollowerProfile>, CollectorError> {
        let mut extra = vec![("userId", user_id)];
        if let Some(c) = cursor {
            extra.push(("cursor", c));
        }
        let url = self.build_url("followersListV2", &extra)?;
        let body = self.request_json_with_retry(Method::GET, &url).await?;
        Ok(parse_followers_page(&normalize_nested_json(body)))
    }

    /// Fetches one page of the user's tweet timeline.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::followers_page`].
    pub async fn tweets_page(
        &self,
        user_id: &str,
        cursor: Option<&str>,
    ) -> Result<Page<Post>, CollectorError> {
        let mut extra = vec![("userId", user_id)];
        if let Some(c) = cursor {
            extra.push(("cursor", c));
        }
        let url = self.build_url("userTweetsV2", &extra)?;
        let body = self.request_json_with_retry(Method::GET, &url).await?;
        Ok(parse_tweets_page(&normalize_nested_json(body)))
    }

    /// Looks up the analyzed account's own profile card by screen name.
    ///
    /// The upstream exposes this as a POST with query parameters.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::followers_page`].
    pub async fn user_profile(&self, handle: &str) -> Result<ProfileSummary, CollectorError> {
        let url = self.build_url("userByScreenNameV2", &[("screenName", handle)])?;
        let body = self.request_json_with_retry(Method::POST, &url).await?;
        let root = normalize_nested_json(body);
        let legacy = root
            .pointer("/data/data/user/result/legacy")
            .cloned()
            .unwrap_or(Value::Null);
        Ok(ProfileSummary {
            display_name: str_field(&legacy, "name"),
            follower_count: count_field(legacy.get("followers_count")),
            bio: str_field(&legacy, "description"),
            avatar_url: str_field(&legacy, "profile_image_url_https"),
        })
    }

    /// Collects the full followers listing, deduplicated by handle.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions; page failures are folded
    /// into the stop reason (see [`collect_pages`]).
    pub async fn collect_followers<P>(
        &self,
        user_id: &str,
        limits: &CollectLimits,
        on_progress: P,
    ) -> Result<Collection<FollowerProfile>, CollectorError>
    where
        P: FnMut(u32, usize),
    {
        collect_pages(
            limits,
            move |cursor| async move { self.followers_page(user_id, cursor.as_deref()).await },
            |follower| follower.handle.clone(),
            on_progress,
        )
        .await
    }

    /// Collects the full tweet history, deduplicated by tweet id.
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal conditions; page failures are folded
    /// into the stop reason (see [`collect_pages`]).
    pub async fn collect_tweets<P>(
        &self,
        user_id: &str,
        limits: &CollectLimits,
        on_progress: P,
    ) -> Result<Collection<Post>, CollectorError>
    where
        P: FnMut(u32, usize),
    {
        collect_pages(
            limits,
            move |cursor| async move { self.tweets_page(user_id, cursor.as_deref()).await },
            |post| post.id.clone(),
            on_progress,
        )
        .await
    }

    /// Builds the full request URL with percent-encoded query parameters,
    /// always including the API key.
    fn build_url(&self, op: &str, extra: &[(&str, &str)]) -> Result<Url, CollectorError> {
        let raw = format!("{}/{op}", self.base_url);
        let mut url = Url::parse(&raw).map_err(|e| CollectorError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apiKey", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends one request with transient-error retry and parses the body as
    /// JSON. 4xx responses short-circuit as [`CollectorError::ClientRejected`]
    /// without retry.
    async fn request_json_with_retry(
        &self,
        method: Method,
        url: &Url,
    ) -> Result<Value, CollectorError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_json(method.clone(), url.clone())
        })
        .await
    }

    async fn request_json(&self, method: Method, url: Url) -> Result<Value, CollectorError> {
        let response = self.client.request(method, url.clone()).send().await?;
        let status = response.status();
        if status.is_client_error() {
            return Err(CollectorError::ClientRejected {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| CollectorError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}
