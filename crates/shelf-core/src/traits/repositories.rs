//! Review store traits (ports) - the storage contract the ranking service needs
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Reads that feed a mutation must go through a
//! `ReviewTransaction` so they observe the same snapshot the writes land in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::{Reaction, Review};
use crate::error::DomainError;
use crate::ranking::RankUpdate;
use crate::value_objects::{BookId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Filter for review listings. Every field is optional; unset fields match
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFilter {
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,
    pub limit: Option<i64>,
}

impl ReviewFilter {
    /// All reviews by one user
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// All reviews of one book
    pub fn for_book(book_id: BookId) -> Self {
        Self {
            book_id: Some(book_id),
            ..Self::default()
        }
    }

    /// Cap the number of rows returned
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether a review passes the user/book part of the filter
    pub fn matches(&self, review: &Review) -> bool {
        self.user_id.is_none_or(|id| id == review.user_id)
            && self.book_id.is_none_or(|id| id == review.book_id)
    }
}

// ============================================================================
// Review Store
// ============================================================================

#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Open a unit of work. Dropping it without `commit` discards its writes.
    async fn begin(&self) -> RepoResult<Box<dyn ReviewTransaction>>;

    /// Find a review by its key
    async fn find(&self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>>;

    /// List reviews, highest rating first (ties broken by book id)
    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>>;

    /// Count reviews matching the filter (limit is ignored)
    async fn count(&self, filter: &ReviewFilter) -> RepoResult<i64>;

    /// All reviews in one partition, lowest rank first
    async fn find_partition(&self, user_id: UserId, reaction: Reaction)
        -> RepoResult<Vec<Review>>;
}

// ============================================================================
// Review Transaction
// ============================================================================

#[async_trait]
pub trait ReviewTransaction: Send {
    /// Serialize against every other transaction touching this user's reviews.
    /// Held until commit or rollback.
    async fn lock_user(&mut self, user_id: UserId) -> RepoResult<()>;

    /// Find a review by its key
    async fn find(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>>;

    /// All reviews in one partition, lowest rank first
    async fn find_partition(
        &mut self,
        user_id: UserId,
        reaction: Reaction,
    ) -> RepoResult<Vec<Review>>;

    /// Highest rank in a partition, 0 when empty
    async fn max_rank(&mut self, user_id: UserId, reaction: Reaction) -> RepoResult<i32>;

    /// Number of reviews by a user across all reactions
    async fn count_by_user(&mut self, user_id: UserId) -> RepoResult<i64>;

    /// Insert a new review. The key must be free.
    async fn insert(&mut self, review: &Review) -> RepoResult<()>;

    /// Apply new rank/rating pairs to existing reviews of one user
    async fn update_rankings(&mut self, user_id: UserId, updates: &[RankUpdate])
        -> RepoResult<()>;

    /// Delete a review, returning whether it existed
    async fn delete(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<bool>;

    /// Set `hide_rank` on every review of a user whose flag differs.
    /// Returns the number of rows changed.
    async fn set_hide_rank(&mut self, user_id: UserId, hide_rank: bool) -> RepoResult<u64>;

    /// Make every write visible
    async fn commit(self: Box<Self>) -> RepoResult<()>;

    /// Discard every write
    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}
