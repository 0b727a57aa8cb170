//! Test helpers for integration tests
//!
//! Wraps a `ServiceContext` with shortcuts for mutating a user's shelf and
//! asserting the ranking invariants over every partition afterwards.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use shelf_common::{AppConfig, RankingConfig};
use shelf_core::entities::{Comparison, Reaction, Review, ReviewInput};
use shelf_core::ranking::{verify_partition, HideRankPolicy};
use shelf_core::traits::ReviewFilter;
use shelf_core::value_objects::{BookId, UserId};
use shelf_db::{create_pool, run_migrations, DatabaseConfig, PgReviewStore};
use shelf_service::{ReviewService, ServiceContext, ServiceResult};

/// Workspace migrations, independent of the test's working directory
const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../migrations");

/// Service context plus the settings it was built with
pub struct TestHarness {
    ctx: ServiceContext,
}

impl TestHarness {
    /// Harness over a fresh in-memory store
    pub fn in_memory(hide_rank_threshold: i64) -> Self {
        Self {
            ctx: ServiceContext::in_memory(RankingConfig::with_threshold(hide_rank_threshold)),
        }
    }

    /// Harness over PostgreSQL, or `None` when `DATABASE_URL` is unset.
    /// Pending migrations are applied first.
    pub async fn postgres(hide_rank_threshold: i64) -> Result<Option<Self>> {
        if !check_test_env() {
            return Ok(None);
        }

        let config = AppConfig::from_env().context("loading config")?;
        let pool = create_pool(&DatabaseConfig::from(&config.database))
            .await
            .context("connecting to database")?;
        run_migrations(&pool, MIGRATIONS_DIR)
            .await
            .context("running migrations")?;

        let ranking = RankingConfig {
            hide_rank_threshold,
            ..config.ranking
        };
        Ok(Some(Self {
            ctx: ServiceContext::new(Arc::new(PgReviewStore::new(pool)), ranking),
        }))
    }

    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn service(&self) -> ReviewService<'_> {
        ReviewService::new(&self.ctx)
    }

    /// Upsert a review without notes
    pub async fn add(
        &self,
        user_id: UserId,
        book_id: BookId,
        reaction: Reaction,
        comparison: Comparison,
    ) -> ServiceResult<Review> {
        self.service()
            .upsert_review(ReviewInput::new(user_id, book_id, reaction), comparison)
            .await
    }

    pub async fn remove(&self, user_id: UserId, book_id: BookId) -> ServiceResult<()> {
        self.service().delete_review(user_id, book_id).await
    }

    pub async fn get(&self, user_id: UserId, book_id: BookId) -> Result<Review> {
        Ok(self.service().get_review(user_id, book_id).await?)
    }

    /// One partition, lowest rank first
    pub async fn partition(&self, user_id: UserId, reaction: Reaction) -> Result<Vec<Review>> {
        Ok(self.service().list_partition(user_id, reaction).await?)
    }

    /// Every review of a user
    pub async fn user_reviews(&self, user_id: UserId) -> Result<Vec<Review>> {
        Ok(self
            .service()
            .list_reviews(&ReviewFilter::for_user(user_id))
            .await?)
    }

    /// Rank, rating and visibility of every review of a user, by book
    pub async fn snapshot(&self, user_id: UserId) -> Result<Vec<ReviewState>> {
        let mut states: Vec<ReviewState> = self
            .user_reviews(user_id)
            .await?
            .iter()
            .map(ReviewState::from)
            .collect();
        states.sort_by_key(|s| s.book_id);
        Ok(states)
    }

    /// Check contiguity, boundedness and monotonicity of every partition of
    /// `user_id`, and that each `hide_rank` flag matches the review count.
    pub async fn assert_invariants(&self, user_id: UserId) -> Result<()> {
        let mut total = 0;
        for reaction in Reaction::ALL {
            let partition = self.partition(user_id, reaction).await?;
            verify_partition(reaction, &partition)
                .with_context(|| format!("{reaction} partition of user {user_id}"))?;
            total += partition.len();
        }

        let reviews = self.user_reviews(user_id).await?;
        if reviews.len() != total {
            bail!(
                "partitions hold {total} reviews but user {user_id} has {}",
                reviews.len()
            );
        }

        let expected = HideRankPolicy::new(self.ctx.ranking().hide_rank_threshold)
            .should_hide(total as i64);
        if let Some(wrong) = reviews.iter().find(|r| r.hide_rank != expected) {
            bail!(
                "book {} has hide_rank={} with {total} reviews",
                wrong.book_id,
                wrong.hide_rank
            );
        }
        Ok(())
    }
}

/// Comparable slice of a stored review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewState {
    pub book_id: BookId,
    pub reaction: Reaction,
    pub rank: i32,
    pub rating: f64,
    pub hide_rank: bool,
}

impl From<&Review> for ReviewState {
    fn from(review: &Review) -> Self {
        Self {
            book_id: review.book_id,
            reaction: review.reaction,
            rank: review.rank,
            rating: review.rating,
            hide_rank: review.hide_rank,
        }
    }
}

/// Book ids of a partition in rank order
pub fn book_order(partition: &[Review]) -> Vec<(BookId, i32)> {
    partition.iter().map(|r| (r.book_id, r.rank)).collect()
}

/// Check that PostgreSQL tests can run
pub fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    true
}
