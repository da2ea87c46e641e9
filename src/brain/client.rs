//! HTTP client wrapper for the TheBrain API.
//!
//! All thought operations live under `/brains/{brain_id}/thoughts`. Every
//! received response goes through the same status check; transport failures
//! (connect errors, timeouts) are retried with exponential backoff before any
//! response exists, and a received response is never retried.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{Map, Value};
use tokio::time::sleep;

use crate::brain::cache::ThoughtCache;
use crate::brain::error::{BrainError, BrainResult};
use crate::brain::thought::NewThought;
use crate::config::ApiConfig;
use crate::error::ConfigError;

const USER_AGENT: &str = concat!("thebrain-mcp/", env!("CARGO_PKG_VERSION"));

/// Default page size for [`BrainClient::list`].
pub const DEFAULT_LIST_LIMIT: u64 = 50;

/// Client for thought CRUD operations with a read-through cache.
pub struct BrainClient {
    client: Client,
    base_url: Url,
    api_key: String,
    brain_id: String,
    retry_attempts: u32,
    retry_interval: Duration,
    cache: Option<ThoughtCache>,
}

impl BrainClient {
    /// Builds a client from connection settings.
    ///
    /// Settings are checked before anything else is built, in the order API
    /// key, brain id, base URL; a value that is absent or empty is missing.
    /// No network I/O happens here.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::Configuration`] naming the first missing value,
    /// [`BrainError::InvalidUrl`] for an unparsable base URL, or
    /// [`BrainError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> BrainResult<Self> {
        let api_key = required(config.api_key.as_deref(), "API key")?;
        let brain_id = required(config.brain_id.as_deref(), "Brain ID")?;
        let base_url = required(config.base_url.as_deref(), "Base URL")?;

        let base_url = normalize_base_url(base_url).map_err(BrainError::InvalidUrl)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(
            url = %base_url,
            brain_id,
            retry_attempts = config.retry_attempts,
            cache_enabled = config.cache_enabled,
            "Initialized TheBrain HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: api_key.to_string(),
            brain_id: brain_id.to_string(),
            retry_attempts: config.retry_attempts,
            retry_interval: Duration::from_millis(config.retry_interval_ms),
            cache: config.cache_enabled.then(ThoughtCache::new),
        })
    }

    /// The thought cache, or `None` when caching is disabled.
    #[must_use]
    pub const fn cache(&self) -> Option<&ThoughtCache> {
        self.cache.as_ref()
    }

    /// Searches thoughts by free-text query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn search(&self, query: &str, limit: u64) -> BrainResult<Value> {
        tracing::info!(query, limit, "Searching thoughts");

        let url = self.thoughts_url(&["search"])?;
        let response = self
            .send_with_retry(|| {
                self.request(Method::GET, url.clone())
                    .query(&[("q", query)])
                    .query(&[("limit", limit)])
            })
            .await?;

        decode(response, "search thoughts").await
    }

    /// Lists thoughts of the brain.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn list(&self, limit: u64) -> BrainResult<Value> {
        tracing::info!(limit, "Listing thoughts");

        let url = self.thoughts_url(&[])?;
        let response = self
            .send_with_retry(|| {
                self.request(Method::GET, url.clone())
                    .query(&[("limit", limit)])
            })
            .await?;

        decode(response, "list thoughts").await
    }

    /// Fetches the links of a thought. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn links(&self, id: &str) -> BrainResult<Value> {
        tracing::info!(thought_id = id, "Fetching thought links");

        let url = self.thoughts_url(&[id, "links"])?;
        let response = self
            .send_with_retry(|| self.request(Method::GET, url.clone()))
            .await?;

        decode(response, "get thought links").await
    }

    /// Fetches a thought, serving it from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn get(&self, id: &str) -> BrainResult<Value> {
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(id)) {
            tracing::debug!(thought_id = id, "Thought served from cache");
            return Ok(cached);
        }

        tracing::info!(thought_id = id, "Fetching thought");

        let url = self.thoughts_url(&[id])?;
        let response = self
            .send_with_retry(|| self.request(Method::GET, url.clone()))
            .await?;
        let thought = decode(response, "get thought").await?;

        if let Some(cache) = &self.cache {
            cache.insert(id, thought.clone());
        }

        Ok(thought)
    }

    /// Creates a thought. Clears the whole cache on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn create(&self, thought: &NewThought) -> BrainResult<Value> {
        tracing::info!(name = %thought.name, "Creating thought");

        let url = self.thoughts_url(&[])?;
        let response = self
            .send_with_retry(|| self.request(Method::POST, url.clone()).json(thought))
            .await?;
        let created = decode(response, "create thought").await?;

        if let Some(cache) = &self.cache {
            cache.clear();
        }

        Ok(created)
    }

    /// Updates a thought with the given fields; `null` fields are dropped.
    /// Evicts only that thought from the cache on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn update(&self, id: &str, fields: &Map<String, Value>) -> BrainResult<Value> {
        tracing::info!(thought_id = id, "Updating thought");

        let body: Map<String, Value> = fields
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let url = self.thoughts_url(&[id])?;
        let response = self
            .send_with_retry(|| self.request(Method::PUT, url.clone()).json(&body))
            .await?;
        let updated = decode(response, "update thought").await?;

        if let Some(cache) = &self.cache {
            cache.evict(id);
        }

        Ok(updated)
    }

    /// Deletes a thought.
    ///
    /// Returns `true` when the API answered 200 or 204, in which case the
    /// thought is evicted from the cache. Other 2xx statuses yield `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API answers non-2xx.
    pub async fn delete(&self, id: &str) -> BrainResult<bool> {
        tracing::info!(thought_id = id, "Deleting thought");

        let url = self.thoughts_url(&[id])?;
        let response = self
            .send_with_retry(|| self.request(Method::DELETE, url.clone()))
            .await?;
        let response = ensure_success(response, "delete thought").await?;

        let deleted = matches!(response.status(), StatusCode::OK | StatusCode::NO_CONTENT);
        if deleted {
            if let Some(cache) = &self.cache {
                cache.evict(id);
            }
        }

        Ok(deleted)
    }

    /// Probes `GET /health` once, without retries.
    ///
    /// Returns `true` only for HTTP 200; any failure yields `false`.
    pub async fn health_check(&self) -> bool {
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(error = %err, "Health check URL could not be built");
                return false;
            }
        };
        match self.request(Method::GET, url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                tracing::debug!(error = %err, "Health check failed");
                false
            }
        }
    }

    /// `{base}/brains/{brain_id}/thoughts/{rest..}`, each segment percent-encoded.
    fn thoughts_url(&self, rest: &[&str]) -> BrainResult<Url> {
        let mut segments = vec!["brains", self.brain_id.as_str(), "thoughts"];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn endpoint(&self, segments: &[&str]) -> BrainResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BrainError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send_with_retry<F>(&self, build: F) -> BrainResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;

        loop {
            match build().send().await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.retry_attempts && is_transient(&err) => {
                    let backoff = self
                        .retry_interval
                        .saturating_mul(2_u32.saturating_pow(attempt));
                    tracing::warn!(
                        error = %err,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        attempt = attempt + 1,
                        max_attempts = self.retry_attempts,
                        "Request failed, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Passes 2xx responses through; maps anything else to its error kind.
async fn ensure_success(response: Response, operation: &str) -> BrainResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            tracing::debug!(operation, error = %err, "Could not read error response body");
            String::new()
        }
    };
    let error = BrainError::from_status(status.as_u16(), body);
    tracing::error!(operation, error = %error, "TheBrain request failed");
    Err(error)
}

/// Decodes a JSON body; an empty success body decodes to `null`.
async fn decode(response: Response, operation: &str) -> BrainResult<Value> {
    let response = ensure_success(response, operation).await?;
    let body = response.text().await?;

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConfigError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingValue { field }),
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn normalize_base_url(url: &str) -> Result<Url, String> {
    let mut parsed = Url::parse(url).map_err(|err| err.to_string())?;
    if parsed.cannot_be_a_base() {
        return Err(format!("{url} cannot be used as a base URL"));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed)
}
