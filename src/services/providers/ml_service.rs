//! Recommendation (ML) service provider
//!
//! Thin JSON client for the dataset/similarity service:
//! `GET /movies`, `GET /search?query=&limit=`, `POST /recommend`.
//! Calls are not retried; callers decide how to degrade.

use std::time::Duration;

use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{MlMovieRef, MlMoviesResponse, MlRecommendRequest, MlRecommendResponse, MlSearchResponse},
    services::providers::RecommendationProvider,
};

const SERVICE: &str = "ML service";

#[derive(Clone)]
pub struct MlServiceClient {
    http_client: HttpClient,
    base_url: String,
}

impl MlServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            http_client: HttpClient::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Decodes a successful body, or turns an error status into
    /// `UpstreamStatus` keeping the service's `detail` document
    async fn decode<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let text = response.text().await.unwrap_or_default();
        // FastAPI-style errors: {"detail": "..."} or {"detail": {"error": "...", ...}}
        let detail = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|mut v| v.get_mut("detail").map(Value::take));

        let message = match &detail {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Object(obj)) => obj
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string(),
            _ if text.is_empty() => status.to_string(),
            _ => text,
        };

        Err(AppError::UpstreamStatus {
            service: SERVICE,
            status: status.as_u16(),
            message,
            body: detail,
        })
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for MlServiceClient {
    async fn list_movies(&self) -> AppResult<Vec<MlMovieRef>> {
        let response = self.http_client.get(self.url("movies")).send().await?;
        let body: MlMoviesResponse = Self::decode(response).await?;

        tracing::info!(count = body.movies.len(), "Fetched ML dataset movie list");

        Ok(body.movies)
    }

    async fn search(&self, query: &str, limit: usize) -> AppResult<MlSearchResponse> {
        let response = self
            .http_client
            .get(self.url("search"))
            .query(&[("query", query.to_string()), ("limit", limit.to_string())])
            .send()
            .await?;

        let body: MlSearchResponse = Self::decode(response).await?;

        tracing::info!(
            query = %query,
            results = body.results.len(),
            total_found = body.total_found,
            "ML search completed"
        );

        Ok(body)
    }

    async fn recommend(
        &self,
        movie_title: &str,
        num_recommendations: u32,
    ) -> AppResult<MlRecommendResponse> {
        let response = self
            .http_client
            .post(self.url("recommend"))
            .json(&MlRecommendRequest {
                movie_title,
                num_recommendations,
            })
            .send()
            .await?;

        let body: MlRecommendResponse = Self::decode(response).await?;

        tracing::info!(
            movie_title = %movie_title,
            matched_movie = ?body.matched_movie,
            count = body.recommendations.len(),
            "ML recommendations received"
        );

        Ok(body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
