//! TMDB API provider
//!
//! Every request carries the API key as a query parameter and runs under the
//! client-wide timeout. Transient failures (transport errors, timeouts, 5xx)
//! are retried with bounded exponential backoff; 4xx responses are returned
//! on the first attempt.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::TmdbMovie,
    services::{
        providers::MovieMetadataProvider,
        retry::{retry_with_backoff, RetryPolicy},
    },
};

const SERVICE: &str = "TMDB";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: Option<String>,
    base_url: String,
    retry: RetryPolicy,
}

impl TmdbClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_base_url.clone(),
            config.upstream_timeout(),
            RetryPolicy::new(
                config.tmdb_max_attempts,
                Duration::from_millis(config.retry_base_delay_ms),
                Duration::from_millis(config.retry_max_delay_ms),
            ),
        )
    }

    /// GET `{base_url}/{endpoint}` with `params`, retried per the client's policy
    pub async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> AppResult<Value> {
        self.fetch_as(endpoint, params).await
    }

    /// Same as [`fetch`](Self::fetch) with `max_attempts` in place of the
    /// client's configured attempt count
    pub async fn fetch_with_attempts(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        max_attempts: u32,
    ) -> AppResult<Value> {
        let policy = RetryPolicy {
            max_attempts,
            ..self.retry
        };
        self.request(endpoint, params, policy).await
    }

    /// Same as [`fetch`](Self::fetch), decoding the body into `T`
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        self.request(endpoint, params, self.retry).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        policy: RetryPolicy,
    ) -> AppResult<T> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("TMDB API key not configured".to_string()))?;

        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        retry_with_backoff(
            policy,
            |attempt| {
                let url = url.as_str();
                async move {
                    tracing::debug!(
                        endpoint = %endpoint,
                        attempt,
                        max_attempts = policy.max_attempts,
                        "TMDB request"
                    );
                    self.send_once(url, api_key, params).await
                }
            },
            AppError::is_retryable,
        )
        .await
    }

    async fn send_once<T: DeserializeOwned>(
        &self,
        url: &str,
        api_key: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", api_key)])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let json = serde_json::from_str::<Value>(&body).ok();
            // TMDB errors look like {"status_code": 34, "status_message": "..."}
            let message = json
                .as_ref()
                .and_then(|v| v.get("status_message"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(body);

            return Err(AppError::UpstreamStatus {
                service: SERVICE,
                status: status.as_u16(),
                message,
                body: json,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl MovieMetadataProvider for TmdbClient {
    async fn movie_details(
        &self,
        movie_id: i64,
        append_to_response: Option<String>,
    ) -> AppResult<TmdbMovie> {
        let params: Vec<(&str, String)> = append_to_response
            .map(|append| vec![("append_to_response", append)])
            .unwrap_or_default();

        let movie: TmdbMovie = self
            .fetch_as(&format!("movie/{}", movie_id), &params)
            .await?;

        tracing::debug!(movie_id, title = ?movie.title, "Fetched TMDB movie");

        Ok(movie)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
