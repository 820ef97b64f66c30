use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult, ResultExt},
    middleware::RequestId,
    models::RecommendationsResponse,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub movie_title: Option<String>,
    #[serde(default)]
    pub num_recommendations: Option<u32>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationsResponse>> {
    let Json(request) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    let movie_title = request
        .movie_title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("movie_title is required".to_string()))?;

    tracing::info!(
        request_id = %request_id,
        movie_title = %movie_title,
        num_recommendations = ?request.num_recommendations,
        "Processing recommendation request"
    );

    let response = state
        .recommendations
        .recommend(&movie_title, request.num_recommendations)
        .await
        .context("Failed to get recommendations")?;

    Ok(Json(response))
}
