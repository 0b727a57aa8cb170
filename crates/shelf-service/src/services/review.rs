//! Review service
//!
//! Entry point for reading and mutating a user's ranked reviews. Every
//! mutation takes the user's lock, runs the ranking steps, re-syncs rank
//! visibility and commits as one transaction.

use tracing::{error, info, instrument, warn};
use validator::Validate;

use shelf_core::entities::{Comparison, Reaction, Review, ReviewInput};
use shelf_core::error::DomainError;
use shelf_core::traits::{ReviewFilter, ReviewTransaction};
use shelf_core::value_objects::{BookId, UserId};

use crate::dto::{ListReviewsQuery, ReviewListResponse, ReviewResponse, UpsertReviewRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::ranking;

/// Largest page `list_reviews` returns
pub const MAX_LIST_LIMIT: i64 = 500;

/// Review service
pub struct ReviewService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReviewService<'a> {
    /// Create a new ReviewService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get one review
    #[instrument(skip(self))]
    pub async fn get_review(&self, user_id: UserId, book_id: BookId) -> ServiceResult<Review> {
        let review = self
            .ctx
            .review_store()
            .find(user_id, book_id)
            .await?
            .ok_or_else(|| DomainError::review_not_found(user_id, book_id))?;

        Ok(review)
    }

    /// List reviews, highest rating first
    #[instrument(skip(self))]
    pub async fn list_reviews(&self, filter: &ReviewFilter) -> ServiceResult<Vec<Review>> {
        let filter = ReviewFilter {
            limit: filter.limit.map(|limit| limit.clamp(1, MAX_LIST_LIMIT)),
            ..*filter
        };
        Ok(self.ctx.review_store().list(&filter).await?)
    }

    /// Validate listing query parameters and return one page plus the total
    #[instrument(skip(self))]
    pub async fn browse_reviews(&self, query: ListReviewsQuery) -> ServiceResult<ReviewListResponse> {
        query.validate()?;
        let filter = ReviewFilter::from(query);
        let total = self.count_reviews(&filter).await?;
        let reviews = self.list_reviews(&filter).await?;
        Ok(ReviewListResponse {
            reviews: reviews.iter().map(ReviewResponse::from).collect(),
            total,
        })
    }

    /// Count reviews matching a filter
    #[instrument(skip(self))]
    pub async fn count_reviews(&self, filter: &ReviewFilter) -> ServiceResult<i64> {
        Ok(self.ctx.review_store().count(filter).await?)
    }

    /// One user's reviews for one reaction, lowest rank first
    #[instrument(skip(self))]
    pub async fn list_partition(
        &self,
        user_id: UserId,
        reaction: Reaction,
    ) -> ServiceResult<Vec<Review>> {
        Ok(self
            .ctx
            .review_store()
            .find_partition(user_id, reaction)
            .await?)
    }

    /// Create or replace a review, positioned by `comparison`.
    ///
    /// A replaced review is first removed from its old partition, so the
    /// comparison is judged against the partition without it.
    #[instrument(skip(self, input), fields(user_id = %input.user_id, book_id = %input.book_id, reaction = %input.reaction))]
    pub async fn upsert_review(
        &self,
        input: ReviewInput,
        comparison: Comparison,
    ) -> ServiceResult<Review> {
        let mut tx = self.ctx.review_store().begin().await?;

        match self.upsert_in(&mut *tx, input, comparison).await {
            Ok(review) => {
                tx.commit().await?;
                info!(
                    user_id = %review.user_id,
                    book_id = %review.book_id,
                    reaction = %review.reaction,
                    rank = review.rank,
                    rating = review.rating,
                    hide_rank = review.hide_rank,
                    "Review saved"
                );
                Ok(review)
            }
            Err(e) => Err(Self::abort(tx, e).await),
        }
    }

    /// Validate a request DTO and upsert it
    #[instrument(skip(self, request))]
    pub async fn put_review(&self, request: UpsertReviewRequest) -> ServiceResult<ReviewResponse> {
        request.validate()?;
        let (input, comparison) = request.into_parts();
        let review = self.upsert_review(input, comparison).await?;
        Ok(ReviewResponse::from(&review))
    }

    /// Delete a review and close the gap it leaves
    #[instrument(skip(self))]
    pub async fn delete_review(&self, user_id: UserId, book_id: BookId) -> ServiceResult<()> {
        let mut tx = self.ctx.review_store().begin().await?;

        match self.delete_in(&mut *tx, user_id, book_id).await {
            Ok(removed) => {
                tx.commit().await?;
                info!(
                    user_id = %user_id,
                    book_id = %book_id,
                    reaction = %removed.reaction,
                    rank = removed.rank,
                    "Review deleted"
                );
                Ok(())
            }
            Err(e) => Err(Self::abort(tx, e).await),
        }
    }

    async fn upsert_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        input: ReviewInput,
        comparison: Comparison,
    ) -> Result<Review, DomainError> {
        let (user_id, book_id) = (input.user_id, input.book_id);
        tx.lock_user(user_id).await?;

        let mut touched = vec![input.reaction];
        let existing = tx.find(user_id, book_id).await?;
        if let Some(existing) = &existing {
            ranking::remove_ranked(tx, existing).await?;
            if existing.reaction != input.reaction {
                touched.push(existing.reaction);
            }
        }

        let created_at = existing.map(|r| r.created_at);
        ranking::insert_ranked(tx, input, &comparison, created_at).await?;
        ranking::sync_hidden(tx, user_id, self.ctx.hide_rank_policy()).await?;

        if self.ctx.ranking().verify_partitions {
            ranking::verify(tx, user_id, &touched).await?;
        }

        tx.find(user_id, book_id).await?.ok_or_else(|| {
            DomainError::consistency(format!("review {user_id}/{book_id} missing after insert"))
        })
    }

    async fn delete_in(
        &self,
        tx: &mut dyn ReviewTransaction,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Review, DomainError> {
        tx.lock_user(user_id).await?;

        let review = tx
            .find(user_id, book_id)
            .await?
            .ok_or_else(|| DomainError::review_not_found(user_id, book_id))?;

        ranking::remove_ranked(tx, &review).await?;
        ranking::sync_hidden(tx, user_id, self.ctx.hide_rank_policy()).await?;

        if self.ctx.ranking().verify_partitions {
            ranking::verify(tx, user_id, &[review.reaction]).await?;
        }

        Ok(review)
    }

    async fn abort(tx: Box<dyn ReviewTransaction>, cause: DomainError) -> ServiceError {
        warn!(error = %cause, code = cause.code(), "Rolling back");
        if let Err(e) = tx.rollback().await {
            error!(error = %e, "Rollback failed");
        }
        cause.into()
    }
}
