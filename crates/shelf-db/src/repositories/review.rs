//! PostgreSQL implementation of ReviewStore

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use shelf_core::entities::{Reaction, Review};
use shelf_core::ranking::RankUpdate;
use shelf_core::traits::{RepoResult, ReviewFilter, ReviewStore, ReviewTransaction};
use shelf_core::value_objects::{BookId, UserId};

use crate::mappers::{reviews_from_models, ReviewInsert};
use crate::models::ReviewModel;

use super::error::map_db_error;

const REVIEW_COLUMNS: &str =
    "user_id, book_id, reaction, rank, rating, hide_rank, notes, created_at, updated_at";

/// PostgreSQL implementation of ReviewStore
#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    /// Create a new PgReviewStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn ReviewTransaction>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgReviewTransaction { tx }))
    }

    #[instrument(skip(self))]
    async fn find(&self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>> {
        let result = sqlx::query_as::<_, ReviewModel>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND book_id = $2"
        ))
        .bind(user_id.into_inner())
        .bind(book_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Review::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let results = sqlx::query_as::<_, ReviewModel>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::BIGINT IS NULL OR book_id = $2)
            ORDER BY rating DESC, book_id
            LIMIT $3
            "#
        ))
        .bind(filter.user_id.map(UserId::into_inner))
        .bind(filter.book_id.map(BookId::into_inner))
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        reviews_from_models(results)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ReviewFilter) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM reviews
            WHERE ($1::BIGINT IS NULL OR user_id = $1)
              AND ($2::BIGINT IS NULL OR book_id = $2)
            "#,
        )
        .bind(filter.user_id.map(UserId::into_inner))
        .bind(filter.book_id.map(BookId::into_inner))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_partition(
        &self,
        user_id: UserId,
        reaction: Reaction,
    ) -> RepoResult<Vec<Review>> {
        let results = sqlx::query_as::<_, ReviewModel>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE user_id = $1 AND reaction = $2
            ORDER BY rank, book_id
            "#
        ))
        .bind(user_id.into_inner())
        .bind(reaction.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        reviews_from_models(results)
    }
}

/// One open PostgreSQL transaction. Rolled back by sqlx if dropped uncommitted.
pub struct PgReviewTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReviewTransaction for PgReviewTransaction {
    #[instrument(skip(self))]
    async fn lock_user(&mut self, user_id: UserId) -> RepoResult<()> {
        // Transaction-scoped advisory lock: also covers partitions with no rows yet
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(user_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>> {
        let result = sqlx::query_as::<_, ReviewModel>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND book_id = $2"
        ))
        .bind(user_id.into_inner())
        .bind(book_id.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        result.map(Review::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_partition(
        &mut self,
        user_id: UserId,
        reaction: Reaction,
    ) -> RepoResult<Vec<Review>> {
        let results = sqlx::query_as::<_, ReviewModel>(&format!(
            r#"
            SELECT {REVIEW_COLUMNS}
            FROM reviews
            WHERE user_id = $1 AND reaction = $2
            ORDER BY rank, book_id
            "#
        ))
        .bind(user_id.into_inner())
        .bind(reaction.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        reviews_from_models(results)
    }

    #[instrument(skip(self))]
    async fn max_rank(&mut self, user_id: UserId, reaction: Reaction) -> RepoResult<i32> {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(rank) FROM reviews WHERE user_id = $1 AND reaction = $2",
        )
        .bind(user_id.into_inner())
        .bind(reaction.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(max.unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn count_by_user(&mut self, user_id: UserId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id.into_inner())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, review), fields(user_id = %review.user_id, book_id = %review.book_id))]
    async fn insert(&mut self, review: &Review) -> RepoResult<()> {
        let insert = ReviewInsert::new(review);

        sqlx::query(
            r#"
            INSERT INTO reviews
                (user_id, book_id, reaction, rank, rating, hide_rank, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(insert.user_id)
        .bind(insert.book_id)
        .bind(insert.reaction)
        .bind(insert.rank)
        .bind(insert.rating)
        .bind(insert.hide_rank)
        .bind(insert.notes)
        .bind(review.created_at)
        .bind(review.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, updates), fields(count = updates.len()))]
    async fn update_rankings(
        &mut self,
        user_id: UserId,
        updates: &[RankUpdate],
    ) -> RepoResult<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let book_ids: Vec<i64> = updates.iter().map(|u| u.book_id.into_inner()).collect();
        let ranks: Vec<i32> = updates.iter().map(|u| u.rank).collect();
        let ratings: Vec<f64> = updates.iter().map(|u| u.rating).collect();

        let result = sqlx::query(
            r#"
            UPDATE reviews AS r
            SET rank = u.rank, rating = u.rating, updated_at = NOW()
            FROM UNNEST($2::BIGINT[], $3::INTEGER[], $4::DOUBLE PRECISION[])
                AS u(book_id, rank, rating)
            WHERE r.user_id = $1 AND r.book_id = u.book_id
            "#,
        )
        .bind(user_id.into_inner())
        .bind(&book_ids)
        .bind(&ranks)
        .bind(&ratings)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        debug!(rows = result.rows_affected(), "Applied rank updates");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE user_id = $1 AND book_id = $2")
            .bind(user_id.into_inner())
            .bind(book_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_hide_rank(&mut self, user_id: UserId, hide_rank: bool) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE reviews
            SET hide_rank = $2, updated_at = NOW()
            WHERE user_id = $1 AND hide_rank <> $2
            "#,
        )
        .bind(user_id.into_inner())
        .bind(hide_rank)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
