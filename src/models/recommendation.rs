use serde::{Deserialize, Serialize};

use super::TmdbMovie;

/// Request body of `POST /recommend` on the ML service
#[derive(Debug, Clone, Serialize)]
pub struct MlRecommendRequest<'a> {
    pub movie_title: &'a str,
    pub num_recommendations: u32,
}

/// One scored neighbour returned by the ML service
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MlRecommendation {
    pub movie_id: i64,
    pub title: String,
    pub similarity_score: f64,
}

/// Response of `POST /recommend`
#[derive(Debug, Clone, Deserialize)]
pub struct MlRecommendResponse {
    pub recommendations: Vec<MlRecommendation>,
    #[serde(default)]
    pub matched_movie: Option<String>,
}

/// A recommendation returned to the client, with TMDB data when available
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResult {
    pub movie_id: i64,
    pub title: String,
    /// Similarity to the matched movie, in `[0, 1]`
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_data: Option<TmdbMovie>,
}

impl RecommendationResult {
    pub fn new(rec: &MlRecommendation, tmdb_data: Option<TmdbMovie>) -> Self {
        Self {
            movie_id: rec.movie_id,
            title: rec.title.clone(),
            similarity_score: rec.similarity_score.clamp(0.0, 1.0),
            tmdb_data,
        }
    }
}
