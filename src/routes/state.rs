use std::sync::Arc;
use std::time::Duration;

use crate::{
    cache::DatasetCache,
    config::Config,
    error::AppResult,
    services::{
        providers::{MlServiceClient, MovieMetadataProvider, RecommendationProvider, TmdbClient},
        BatchConfig, MovieService, RecommendationService,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub metadata: Arc<dyn MovieMetadataProvider>,
    pub recommender: Arc<dyn RecommendationProvider>,
    pub dataset: DatasetCache,
    pub movies: MovieService,
    pub recommendations: RecommendationService,
}

impl AppState {
    /// Wires the TMDB and ML service clients described by `config`
    pub fn from_config(config: Config) -> AppResult<Self> {
        let metadata: Arc<dyn MovieMetadataProvider> = Arc::new(TmdbClient::from_config(&config)?);
        let recommender: Arc<dyn RecommendationProvider> = Arc::new(MlServiceClient::new(
            config.ml_service_url.clone(),
            config.upstream_timeout(),
        )?);

        Ok(Self::new(config, metadata, recommender))
    }

    /// Builds the state around arbitrary providers
    pub fn new(
        config: Config,
        metadata: Arc<dyn MovieMetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
    ) -> Self {
        let batch = BatchConfig {
            batch_size: config.batch_size,
            delay: Duration::from_millis(config.batch_delay_ms),
        };

        let dataset = DatasetCache::new(
            recommender.clone(),
            config.dataset_cache_ttl(),
            config.dataset_timeout(),
        );

        let movies = MovieService::new(
            metadata.clone(),
            recommender.clone(),
            dataset.clone(),
            batch,
        );
        let recommendations =
            RecommendationService::new(metadata.clone(), recommender.clone(), batch);

        Self {
            config: Arc::new(config),
            metadata,
            recommender,
            dataset,
            movies,
            recommendations,
        }
    }
}
