use serde::Serialize;

use super::{EnrichedMovie, RecommendationResult, TmdbMovie};

/// `GET /api/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub tmdb_configured: bool,
    pub ml_service: String,
}

/// `GET /api/movies/popular`
///
/// Totals are computed over the ML dataset, not over how many movies TMDB
/// returned; `returned` is the number actually enriched.
#[derive(Debug, Serialize)]
pub struct PopularMoviesResponse {
    pub page: usize,
    pub results: Vec<TmdbMovie>,
    pub total_results: usize,
    pub total_pages: usize,
    pub ml_dataset_size: usize,
    pub returned: usize,
}

/// `GET /api/movies/search`
#[derive(Debug, Serialize)]
pub struct SearchMoviesResponse {
    pub results: Vec<TmdbMovie>,
    pub total_results: usize,
    pub query: String,
    pub returned: usize,
}

/// `GET /api/ml/movies`
#[derive(Debug, Serialize)]
pub struct MlMoviesListing {
    pub movies: Vec<EnrichedMovie>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub returned: usize,
}

/// `GET /api/movies/:movie_id`: the TMDB document plus dataset membership
#[derive(Debug, Serialize)]
pub struct MovieDetailResponse {
    #[serde(flatten)]
    pub movie: TmdbMovie,
    /// Whether the movie can seed recommendations
    pub ml_available: bool,
}

/// `POST /api/recommendations`
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<RecommendationResult>,
    pub matched_movie: Option<String>,
    pub total: usize,
}
