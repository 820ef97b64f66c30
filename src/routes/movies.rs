use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult, ResultExt},
    middleware::RequestId,
    models::{MovieDetailResponse, PopularMoviesResponse, SearchMoviesResponse},
    services::movies::DEFAULT_PER_PAGE,
};

use super::{parse_param, AppState};

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    page: Option<String>,
    per_page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
    page: Option<String>,
}

/// Handler for the popular movies page
pub async fn popular(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<PopularQuery>,
) -> AppResult<Json<PopularMoviesResponse>> {
    let page = parse_param(params.page.as_deref(), 1);
    let per_page = parse_param(params.per_page.as_deref(), DEFAULT_PER_PAGE);

    tracing::info!(request_id = %request_id, page, per_page, "Fetching popular movies");

    let response = state
        .movies
        .popular(page, per_page)
        .await
        .context("Failed to fetch popular movies")?;

    Ok(Json(response))
}

/// Handler for title search
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<SearchMoviesResponse>> {
    let query = params.query.unwrap_or_default();
    let page = parse_param(params.page.as_deref(), 1);

    tracing::info!(request_id = %request_id, query = %query, page, "Searching movies");

    let response = state
        .movies
        .search(&query, page)
        .await
        .context("Failed to search movies")?;

    Ok(Json(response))
}

/// Handler for a single movie's details
pub async fn detail(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<MovieDetailResponse>> {
    let movie_id: i64 = movie_id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid movie ID: {}", movie_id)))?;

    tracing::info!(request_id = %request_id, movie_id, "Fetching movie details");

    let response = state
        .movies
        .detail(movie_id)
        .await
        .context("Failed to fetch movie details")?;

    Ok(Json(response))
}
