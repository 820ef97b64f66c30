use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{RecommendationResult, RecommendationsResponse},
    services::{
        batch::{fetch_batched, with_fallback, BatchConfig},
        providers::{MovieMetadataProvider, RecommendationProvider},
    },
};

pub const DEFAULT_RECOMMENDATIONS: u32 = 5;
pub const MAX_RECOMMENDATIONS: u32 = 50;

/// Generates watch recommendations for a movie title
///
/// The recommendation service resolves the free-text title to a dataset
/// entry (exact, substring, then fuzzy match on its side) and returns the
/// most similar movies, which are then enriched with TMDB metadata.
///
/// Lookup is keyed by display title, so duplicate or near-duplicate titles
/// resolve to whichever entry the service matches first. `matched_movie`
/// lets clients spot a mismatch.
#[derive(Clone)]
pub struct RecommendationService {
    metadata: Arc<dyn MovieMetadataProvider>,
    recommender: Arc<dyn RecommendationProvider>,
    batch: BatchConfig,
}

impl RecommendationService {
    pub fn new(
        metadata: Arc<dyn MovieMetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
        batch: BatchConfig,
    ) -> Self {
        Self {
            metadata,
            recommender,
            batch,
        }
    }

    pub async fn recommend(
        &self,
        movie_title: &str,
        num_recommendations: Option<u32>,
    ) -> AppResult<RecommendationsResponse> {
        // Sent as received; the recommendation service does its own matching
        if movie_title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "movie_title is required".to_string(),
            ));
        }

        let count = num_recommendations
            .unwrap_or(DEFAULT_RECOMMENDATIONS)
            .clamp(1, MAX_RECOMMENDATIONS);

        let response = self
            .recommender
            .recommend(movie_title, count)
            .await
            .map_err(|e| match e {
                AppError::UpstreamStatus {
                    status: 404,
                    message,
                    body,
                    ..
                } => AppError::NotFound { message, details: body },
                e => e,
            })?;

        let results = fetch_batched(&response.recommendations, self.batch, |rec| {
            self.metadata.movie_details(rec.movie_id, None)
        })
        .await;

        let recommendations = with_fallback(
            &response.recommendations,
            results,
            |rec, tmdb| RecommendationResult::new(rec, Some(tmdb)),
            |rec| RecommendationResult::new(rec, None),
        );

        tracing::info!(
            movie_title = %movie_title,
            matched_movie = ?response.matched_movie,
            total = recommendations.len(),
            enriched = recommendations.iter().filter(|r| r.tmdb_data.is_some()).count(),
            "Recommendations generated"
        );

        Ok(RecommendationsResponse {
            total: recommendations.len(),
            recommendations,
            matched_movie: response.matched_movie,
        })
    }
}
