//! Upstream data providers
//!
//! Two upstreams feed this service: a movie metadata provider (TMDB) and the
//! recommendation service that owns the ML dataset. Both sit behind traits so
//! handlers, the dataset cache and tests can swap implementations.

use crate::{
    error::AppResult,
    models::{MlMovieRef, MlRecommendResponse, MlSearchResponse, TmdbMovie},
};

pub mod ml_service;
pub mod tmdb;

pub use ml_service::MlServiceClient;
pub use tmdb::TmdbClient;

/// Movie metadata lookups
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieMetadataProvider: Send + Sync {
    /// Fetch one movie's metadata
    ///
    /// `append_to_response` names extra sub-resources to inline (e.g.
    /// `credits,videos,similar`).
    async fn movie_details(
        &self,
        movie_id: i64,
        append_to_response: Option<String>,
    ) -> AppResult<TmdbMovie>;

    /// Whether the provider has the credentials it needs
    fn is_configured(&self) -> bool;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// The recommendation service and its dataset
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Every movie known to the dataset
    async fn list_movies(&self) -> AppResult<Vec<MlMovieRef>>;

    /// Title substring search over the dataset
    async fn search(&self, query: &str, limit: usize) -> AppResult<MlSearchResponse>;

    /// Movies most similar to the dataset entry best matching `movie_title`
    async fn recommend(
        &self,
        movie_title: &str,
        num_recommendations: u32,
    ) -> AppResult<MlRecommendResponse>;

    /// Base URL, reported by the health endpoint
    fn base_url(&self) -> &str;
}
