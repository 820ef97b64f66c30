use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppResult, ResultExt},
    middleware::RequestId,
    models::MlMoviesListing,
    services::movies::DEFAULT_PER_PAGE,
};

use super::{parse_param, AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
    offset: Option<String>,
}

/// Handler listing the movies the recommendation dataset knows about
pub async fn list_movies(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> AppResult<Json<MlMoviesListing>> {
    let limit = parse_param(params.limit.as_deref(), DEFAULT_PER_PAGE);
    let offset = parse_param(params.offset.as_deref(), 0);

    tracing::info!(request_id = %request_id, limit, offset, "Listing ML dataset movies");

    let listing = state
        .movies
        .ml_movies(limit, offset)
        .await
        .context("Failed to fetch ML movies")?;

    Ok(Json(listing))
}
