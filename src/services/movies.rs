use std::sync::Arc;

use crate::{
    cache::DatasetCache,
    error::{AppError, AppResult},
    models::{
        EnrichedMovie, MlMoviesListing, MovieDetailResponse, PopularMoviesResponse,
        SearchMoviesResponse,
    },
    services::{
        batch::{fetch_batched, successes, with_fallback, BatchConfig},
        providers::{MovieMetadataProvider, RecommendationProvider},
    },
};

/// Sub-resources inlined into the movie detail document
pub const DETAIL_APPEND: &str = "credits,videos,similar";

/// Search results per page
pub const SEARCH_PAGE_SIZE: usize = 20;

pub const DEFAULT_PER_PAGE: usize = 20;
pub const MAX_PER_PAGE: usize = 100;

/// Movie listing, search and detail, composed from the ML dataset and TMDB
#[derive(Clone)]
pub struct MovieService {
    metadata: Arc<dyn MovieMetadataProvider>,
    recommender: Arc<dyn RecommendationProvider>,
    dataset: DatasetCache,
    batch: BatchConfig,
}

impl MovieService {
    pub fn new(
        metadata: Arc<dyn MovieMetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
        dataset: DatasetCache,
        batch: BatchConfig,
    ) -> Self {
        Self {
            metadata,
            recommender,
            dataset,
            batch,
        }
    }

    /// One page of dataset movies with TMDB metadata. Movies TMDB cannot
    /// resolve are left out of `results` but still count toward the totals.
    pub async fn popular(&self, page: usize, per_page: usize) -> AppResult<PopularMoviesResponse> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, MAX_PER_PAGE);

        let dataset = self.dataset.get_eligible_movies().await;
        let total = dataset.len();
        let start = (page - 1).saturating_mul(per_page).min(total);
        let end = start.saturating_add(per_page).min(total);
        let window = &dataset[start..end];

        let results = successes(
            fetch_batched(window, self.batch, |movie| {
                self.metadata.movie_details(movie.movie_id, None)
            })
            .await,
        );

        tracing::info!(
            provider = self.metadata.name(),
            page,
            per_page,
            dataset_size = total,
            requested = window.len(),
            returned = results.len(),
            "Popular movies page built"
        );

        Ok(PopularMoviesResponse {
            page,
            returned: results.len(),
            results,
            total_results: total,
            total_pages: total.div_ceil(per_page),
            ml_dataset_size: total,
        })
    }

    /// Title search over the dataset, enriched with TMDB; unresolved movies
    /// are dropped
    pub async fn search(&self, query: &str, page: usize) -> AppResult<SearchMoviesResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Query parameter is required".to_string(),
            ));
        }

        let page = page.max(1);
        let limit = page.saturating_mul(SEARCH_PAGE_SIZE);
        let found = self.recommender.search(query, limit).await?;

        let window: Vec<_> = found
            .results
            .into_iter()
            .skip((page - 1).saturating_mul(SEARCH_PAGE_SIZE))
            .take(SEARCH_PAGE_SIZE)
            .collect();

        let results = successes(
            fetch_batched(&window, self.batch, |movie| {
                self.metadata.movie_details(movie.movie_id, None)
            })
            .await,
        );

        Ok(SearchMoviesResponse {
            returned: results.len(),
            results,
            total_results: found.total_found,
            query: query.to_string(),
        })
    }

    /// Full TMDB document with credits, videos and similar movies
    pub async fn detail(&self, movie_id: i64) -> AppResult<MovieDetailResponse> {
        let movie = self
            .metadata
            .movie_details(movie_id, Some(DETAIL_APPEND.to_string()))
            .await
            .map_err(|e| {
                if e.is_upstream_not_found() {
                    AppError::NotFound {
                        message: "Movie not found".to_string(),
                        details: None,
                    }
                } else {
                    e
                }
            })?;

        let ml_available = self.dataset.is_eligible(movie_id).await;

        Ok(MovieDetailResponse {
            movie,
            ml_available,
        })
    }

    /// A slice of the dataset; movies TMDB cannot resolve keep their
    /// dataset fields only
    pub async fn ml_movies(&self, limit: usize, offset: usize) -> AppResult<MlMoviesListing> {
        let limit = limit.clamp(1, MAX_PER_PAGE);
        let dataset = self.dataset.get_eligible_movies().await;
        let total = dataset.len();
        let start = offset.min(total);
        let end = start.saturating_add(limit).min(total);
        let window = &dataset[start..end];

        let results = fetch_batched(window, self.batch, |movie| {
            self.metadata.movie_details(movie.movie_id, None)
        })
        .await;

        let movies = with_fallback(
            window,
            results,
            |movie, tmdb| EnrichedMovie {
                movie_id: movie.movie_id,
                title: movie.title.clone(),
                tmdb_data: Some(tmdb),
            },
            EnrichedMovie::dataset_only,
        );

        Ok(MlMoviesListing {
            returned: movies.len(),
            movies,
            total,
            limit,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MlMovieRef, MlSearchResponse, TmdbMovie};
    use crate::services::providers::{MockMovieMetadataProvider, MockRecommendationProvider};
    use mockall::predicate::eq;
    use std::time::Duration;

    fn tmdb(id: i64) -> TmdbMovie {
        serde_json::from_value(serde_json::json!({ "id": id, "title": format!("TMDB {id}") }))
            .unwrap()
    }

    fn not_found() -> AppError {
        AppError::UpstreamStatus {
            service: "TMDB",
            status: 404,
            message: "The resource you requested could not be found.".to_string(),
            body: None,
        }
    }

    fn dataset(n: i64) -> Vec<MlMovieRef> {
        (1..=n).map(|id| MlMovieRef::new(id, format!("Movie {id}"))).collect()
    }

    fn service(
        metadata: MockMovieMetadataProvider,
        recommender: MockRecommendationProvider,
    ) -> MovieService {
        let recommender: Arc<dyn RecommendationProvider> = Arc::new(recommender);
        let cache = DatasetCache::new(
            recommender.clone(),
            Duration::from_secs(300),
            Duration::from_secs(5),
        );
        MovieService::new(
            Arc::new(metadata),
            recommender,
            cache,
            BatchConfig {
                batch_size: 5,
                delay: Duration::from_millis(500),
            },
        )
    }

    fn dataset_of(n: i64) -> MockRecommendationProvider {
        let mut recommender = MockRecommendationProvider::new();
        recommender
            .expect_list_movies()
            .returning(move || Ok(dataset(n)));
        recommender
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_paginates_over_dataset() {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata
            .expect_movie_details()
            .returning(|id, _| Ok(tmdb(id)));

        let service = service(metadata, dataset_of(45));
        let response = service.popular(1, 20).await.unwrap();

        assert_eq!(response.total_pages, 3);
        assert_eq!(response.total_results, 45);
        assert_eq!(response.ml_dataset_size, 45);
        assert_eq!(response.returned, 20);
        assert_eq!(response.results[0].id, 1);

        let last = service.popular(3, 20).await.unwrap();
        assert_eq!(last.returned, 5);
        assert_eq!(last.results[0].id, 41);
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_drops_failed_lookups() {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata.expect_movie_details().returning(|id, _| {
            if id == 3 {
                Err(AppError::Internal("timeout".to_string()))
            } else {
                Ok(tmdb(id))
            }
        });

        let service = service(metadata, dataset_of(5));
        let response = service.popular(1, 20).await.unwrap();

        assert_eq!(response.returned, 4);
        assert_eq!(response.total_results, 5);
        assert!(response.results.iter().all(|m| m.id != 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_popular_page_past_end_is_empty() {
        let metadata = MockMovieMetadataProvider::new();
        let service = service(metadata, dataset_of(10));

        let response = service.popular(9, 20).await.unwrap();
        assert!(response.results.is_empty());
        assert_eq!(response.page, 9);
        assert_eq!(response.total_pages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_rejects_blank_query_without_upstream_call() {
        let service = service(
            MockMovieMetadataProvider::new(),
            MockRecommendationProvider::new(),
        );

        let err = service.search("   ", 1).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == "Query parameter is required"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_enriches_and_drops_failures() {
        let mut recommender = MockRecommendationProvider::new();
        recommender
            .expect_search()
            .withf(|query, limit| query.to_string() == "dark" && *limit == 20)
            .times(1)
            .returning(|query, _| {
                Ok(MlSearchResponse {
                    query: query.to_string(),
                    results: dataset(3),
                    total_found: 3,
                })
            });

        let mut metadata = MockMovieMetadataProvider::new();
        metadata
            .expect_movie_details()
            .returning(|id, _| if id == 2 { Err(not_found()) } else { Ok(tmdb(id)) });

        let service = service(metadata, recommender);
        let response = service.search(" dark ", 1).await.unwrap();

        assert_eq!(response.query, "dark");
        assert_eq!(response.total_results, 3);
        assert_eq!(response.returned, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_second_page_enriches_its_window_only() {
        let mut recommender = MockRecommendationProvider::new();
        recommender
            .expect_search()
            .withf(|query, limit| query.to_string() == "the" && *limit == 40)
            .times(1)
            .returning(|query, _| {
                Ok(MlSearchResponse {
                    query: query.to_string(),
                    results: dataset(40),
                    total_found: 57,
                })
            });

        let mut metadata = MockMovieMetadataProvider::new();
        metadata
            .expect_movie_details()
            .withf(|id, _| (21..=40).contains(id))
            .times(20)
            .returning(|id, _| Ok(tmdb(id)));

        let service = service(metadata, recommender);
        let response = service.search("the", 2).await.unwrap();

        let ids: Vec<i64> = response.results.iter().map(|m| m.id).collect();
        assert_eq!(ids, (21..=40).collect::<Vec<_>>());
        assert_eq!(response.returned, 20);
        assert_eq!(response.total_results, 57);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_huge_page_is_empty_not_a_panic() {
        let mut recommender = MockRecommendationProvider::new();
        recommender
            .expect_search()
            .withf(|_, limit| *limit == usize::MAX)
            .times(1)
            .returning(|query, _| {
                Ok(MlSearchResponse {
                    query: query.to_string(),
                    results: dataset(1),
                    total_found: 1,
                })
            });

        let service = service(MockMovieMetadataProvider::new(), recommender);
        let response = service.search("alien", usize::MAX).await.unwrap();

        assert!(response.results.is_empty());
        assert_eq!(response.total_results, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_maps_upstream_404() {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata
            .expect_movie_details()
            .with(eq(999_999), eq(Some(DETAIL_APPEND.to_string())))
            .returning(|_, _| Err(not_found()));

        let service = service(metadata, MockRecommendationProvider::new());
        let err = service.detail(999_999).await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_reports_dataset_membership() {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata
            .expect_movie_details()
            .returning(|id, _| Ok(tmdb(id)));

        let service = service(metadata, dataset_of(3));

        assert!(service.detail(2).await.unwrap().ml_available);
        assert!(!service.detail(50).await.unwrap().ml_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ml_movies_keeps_failed_items_with_dataset_fields() {
        let mut metadata = MockMovieMetadataProvider::new();
        metadata.expect_movie_details().returning(|id, _| {
            if id == 12 {
                Err(AppError::Internal("boom".to_string()))
            } else {
                Ok(tmdb(id))
            }
        });

        let service = service(metadata, dataset_of(30));
        let listing = service.ml_movies(5, 10).await.unwrap();

        assert_eq!(listing.total, 30);
        assert_eq!(listing.returned, 5);
        let ids: Vec<i64> = listing.movies.iter().map(|m| m.movie_id).collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
        assert!(listing.movies[1].tmdb_data.is_none());
        assert!(listing.movies[0].tmdb_data.is_some());
    }
}
