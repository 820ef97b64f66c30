use serde::Deserialize;

pub mod movie;
pub mod recommendation;
pub mod responses;

pub use movie::{EnrichedMovie, MlMovieRef, TmdbMovie};
pub use recommendation::{
    MlRecommendRequest, MlRecommendResponse, MlRecommendation, RecommendationResult,
};
pub use responses::{
    HealthResponse, MlMoviesListing, MovieDetailResponse, PopularMoviesResponse,
    RecommendationsResponse, SearchMoviesResponse,
};

// ============================================================================
// ML service wire types
// ============================================================================

/// Response of `GET /movies`
#[derive(Debug, Clone, Deserialize)]
pub struct MlMoviesResponse {
    pub movies: Vec<MlMovieRef>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Response of `GET /search`
#[derive(Debug, Clone, Deserialize)]
pub struct MlSearchResponse {
    #[serde(default)]
    pub query: String,
    pub results: Vec<MlMovieRef>,
    /// Number of dataset titles matching the query, before the limit
    #[serde(default)]
    pub total_found: usize,
}
