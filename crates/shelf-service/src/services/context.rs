//! Service context - dependency container for services
//!
//! Holds the review store and ranking settings needed by services.

use std::sync::Arc;

use shelf_common::{AppConfig, RankingConfig};
use shelf_core::ranking::HideRankPolicy;
use shelf_core::traits::ReviewStore;
use shelf_db::pool::{create_pool, DatabaseConfig};
use shelf_db::{InMemoryReviewStore, PgReviewStore};
use tracing::info;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every clone shares the same store.
#[derive(Clone)]
pub struct ServiceContext {
    review_store: Arc<dyn ReviewStore>,
    ranking: RankingConfig,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(review_store: Arc<dyn ReviewStore>, ranking: RankingConfig) -> Self {
        Self {
            review_store,
            ranking,
        }
    }

    /// Context backed by a fresh in-memory store
    pub fn in_memory(ranking: RankingConfig) -> Self {
        Self::new(Arc::new(InMemoryReviewStore::new()), ranking)
    }

    /// Connect to PostgreSQL using the application configuration
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if the pool cannot be created
    pub async fn from_config(config: &AppConfig) -> ServiceResult<Self> {
        let pool = create_pool(&DatabaseConfig::from(&config.database))
            .await
            .map_err(|e| ServiceError::internal(format!("failed to connect to database: {e}")))?;

        info!(
            max_connections = config.database.max_connections,
            hide_rank_threshold = config.ranking.hide_rank_threshold,
            "Review store connected"
        );

        Ok(Self::new(Arc::new(PgReviewStore::new(pool)), config.ranking))
    }

    /// Get the review store
    pub fn review_store(&self) -> &dyn ReviewStore {
        self.review_store.as_ref()
    }

    /// Get the ranking settings
    pub fn ranking(&self) -> &RankingConfig {
        &self.ranking
    }

    /// Visibility policy derived from the ranking settings
    pub fn hide_rank_policy(&self) -> HideRankPolicy {
        HideRankPolicy::new(self.ranking.hide_rank_threshold)
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("review_store", &"dyn ReviewStore")
            .field("ranking", &self.ranking)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    review_store: Option<Arc<dyn ReviewStore>>,
    ranking: Option<RankingConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn review_store(mut self, store: Arc<dyn ReviewStore>) -> Self {
        self.review_store = Some(store);
        self
    }

    pub fn ranking(mut self, ranking: RankingConfig) -> Self {
        self.ranking = Some(ranking);
        self
    }

    pub fn hide_rank_threshold(mut self, threshold: i64) -> Self {
        let mut ranking = self.ranking.unwrap_or_default();
        ranking.hide_rank_threshold = threshold;
        self.ranking = Some(ranking);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the review store is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let review_store = self
            .review_store
            .ok_or_else(|| ServiceError::validation("review_store is required"))?;
        Ok(ServiceContext::new(
            review_store,
            self.ranking.unwrap_or_default(),
        ))
    }
}
