use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{
    error::AppError,
    models::MlMovieRef,
    services::providers::RecommendationProvider,
};

/// Last successful fetch of the ML dataset list
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Arc<Vec<MlMovieRef>>,
    fetched_at: DateTime<Utc>,
    fetched_instant: Instant,
}

/// Point-in-time view of the cache, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    pub len: usize,
    pub fetched_at: Option<DateTime<Utc>>,
    pub is_fresh: bool,
}

/// In-memory cache of the movies the recommendation service knows about.
///
/// Entries are served for `ttl` after a successful fetch. Past that, the next
/// caller refetches; if the refetch fails the previous (stale) list is served
/// instead. The stale entry is never dropped. The lock is not held while
/// fetching, so concurrent callers may refetch twice; the later write wins.
#[derive(Clone)]
pub struct DatasetCache {
    provider: Arc<dyn RecommendationProvider>,
    entry: Arc<RwLock<Option<CacheEntry>>>,
    ttl: Duration,
    fetch_timeout: Duration,
}

impl DatasetCache {
    pub fn new(
        provider: Arc<dyn RecommendationProvider>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            entry: Arc::new(RwLock::new(None)),
            ttl,
            fetch_timeout,
        }
    }

    /// Movies eligible for recommendation. Never fails: degrades to the stale
    /// list, or to an empty list when no fetch has ever succeeded.
    pub async fn get_eligible_movies(&self) -> Arc<Vec<MlMovieRef>> {
        let previous = self.entry.read().await.clone();

        if let Some(entry) = &previous {
            if entry.fetched_instant.elapsed() < self.ttl {
                tracing::debug!(count = entry.data.len(), "ML dataset cache hit");
                return entry.data.clone();
            }
        }

        match self.fetch().await {
            Ok(movies) => {
                let data = Arc::new(movies);
                *self.entry.write().await = Some(CacheEntry {
                    data: data.clone(),
                    fetched_at: Utc::now(),
                    fetched_instant: Instant::now(),
                });
                tracing::info!(count = data.len(), "ML dataset cache refreshed");
                data
            }
            Err(e) => match previous {
                Some(entry) => {
                    tracing::warn!(
                        error = %e,
                        count = entry.data.len(),
                        fetched_at = %entry.fetched_at,
                        "ML dataset refresh failed, serving stale cache"
                    );
                    entry.data
                }
                None => {
                    tracing::warn!(error = %e, "ML dataset unavailable and nothing cached");
                    Arc::new(Vec::new())
                }
            },
        }
    }

    /// Whether `movie_id` is part of the (possibly stale) dataset
    pub async fn is_eligible(&self, movie_id: i64) -> bool {
        self.get_eligible_movies()
            .await
            .iter()
            .any(|movie| movie.movie_id == movie_id)
    }

    pub async fn snapshot(&self) -> CacheSnapshot {
        match self.entry.read().await.as_ref() {
            Some(entry) => CacheSnapshot {
                len: entry.data.len(),
                fetched_at: Some(entry.fetched_at),
                is_fresh: entry.fetched_instant.elapsed() < self.ttl,
            },
            None => CacheSnapshot {
                len: 0,
                fetched_at: None,
                is_fresh: false,
            },
        }
    }

    async fn fetch(&self) -> Result<Vec<MlMovieRef>, AppError> {
        tokio::time::timeout(self.fetch_timeout, self.provider.list_movies())
            .await
            .map_err(|_| AppError::Timeout {
                service: "ML service",
            })?
    }
}
