//! In-process implementation of ReviewStore
//!
//! Backs the service tests and embedded use. A transaction owns the table lock
//! from `begin` until it is committed, rolled back or dropped, so transactions
//! run one at a time. Writes go to a staged copy that replaces the table on
//! commit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::instrument;

use shelf_core::entities::{Reaction, Review};
use shelf_core::error::DomainError;
use shelf_core::ranking::RankUpdate;
use shelf_core::traits::{RepoResult, ReviewFilter, ReviewStore, ReviewTransaction};
use shelf_core::value_objects::{BookId, UserId};

type Table = BTreeMap<(UserId, BookId), Review>;

/// Review store kept in process memory
#[derive(Clone, Default)]
pub struct InMemoryReviewStore {
    table: Arc<Mutex<Table>>,
}

impl InMemoryReviewStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored review, in key order
    pub async fn snapshot(&self) -> Vec<Review> {
        self.table.lock().await.values().cloned().collect()
    }
}

fn partition_of(table: &Table, user_id: UserId, reaction: Reaction) -> Vec<Review> {
    let mut partition: Vec<Review> = table
        .range((user_id, BookId::new(i64::MIN))..=(user_id, BookId::new(i64::MAX)))
        .map(|(_, review)| review)
        .filter(|review| review.reaction == reaction)
        .cloned()
        .collect();
    partition.sort_by_key(|review| (review.rank, review.book_id));
    partition
}

fn user_rows(table: &Table, user_id: UserId) -> impl Iterator<Item = &Review> {
    table
        .range((user_id, BookId::new(i64::MIN))..=(user_id, BookId::new(i64::MAX)))
        .map(|(_, review)| review)
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn ReviewTransaction>> {
        let guard = Arc::clone(&self.table).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction { guard, staged }))
    }

    async fn find(&self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>> {
        Ok(self.table.lock().await.get(&(user_id, book_id)).cloned())
    }

    async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let table = self.table.lock().await;
        let mut reviews: Vec<Review> = table
            .values()
            .filter(|review| filter.matches(review))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.book_id.cmp(&b.book_id))
        });
        if let Some(limit) = filter.limit {
            reviews.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(reviews)
    }

    async fn count(&self, filter: &ReviewFilter) -> RepoResult<i64> {
        let table = self.table.lock().await;
        let count = table.values().filter(|review| filter.matches(review)).count();
        Ok(count as i64)
    }

    async fn find_partition(
        &self,
        user_id: UserId,
        reaction: Reaction,
    ) -> RepoResult<Vec<Review>> {
        Ok(partition_of(&*self.table.lock().await, user_id, reaction))
    }
}

/// Open in-memory transaction
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Table>,
    staged: Table,
}

#[async_trait]
impl ReviewTransaction for InMemoryTransaction {
    async fn lock_user(&mut self, _user_id: UserId) -> RepoResult<()> {
        // The table lock taken in `begin` already excludes every other writer
        Ok(())
    }

    async fn find(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<Option<Review>> {
        Ok(self.staged.get(&(user_id, book_id)).cloned())
    }

    async fn find_partition(
        &mut self,
        user_id: UserId,
        reaction: Reaction,
    ) -> RepoResult<Vec<Review>> {
        Ok(partition_of(&self.staged, user_id, reaction))
    }

    async fn max_rank(&mut self, user_id: UserId, reaction: Reaction) -> RepoResult<i32> {
        Ok(user_rows(&self.staged, user_id)
            .filter(|review| review.reaction == reaction)
            .map(|review| review.rank)
            .max()
            .unwrap_or(0))
    }

    async fn count_by_user(&mut self, user_id: UserId) -> RepoResult<i64> {
        Ok(user_rows(&self.staged, user_id).count() as i64)
    }

    #[instrument(skip(self, review), fields(user_id = %review.user_id, book_id = %review.book_id))]
    async fn insert(&mut self, review: &Review) -> RepoResult<()> {
        let key = (review.user_id, review.book_id);
        if self.staged.contains_key(&key) {
            return Err(DomainError::ConcurrentModification(format!(
                "review {}/{} already exists",
                review.user_id, review.book_id
            )));
        }
        self.staged.insert(key, review.clone());
        Ok(())
    }

    async fn update_rankings(
        &mut self,
        user_id: UserId,
        updates: &[RankUpdate],
    ) -> RepoResult<()> {
        let now = Utc::now();
        for update in updates {
            if let Some(review) = self.staged.get_mut(&(user_id, update.book_id)) {
                review.rank = update.rank;
                review.rating = update.rating;
                review.updated_at = now;
            }
        }
        Ok(())
    }

    async fn delete(&mut self, user_id: UserId, book_id: BookId) -> RepoResult<bool> {
        Ok(self.staged.remove(&(user_id, book_id)).is_some())
    }

    async fn set_hide_rank(&mut self, user_id: UserId, hide_rank: bool) -> RepoResult<u64> {
        let now = Utc::now();
        let mut changed = 0;
        for review in self
            .staged
            .range_mut((user_id, BookId::new(i64::MIN))..=(user_id, BookId::new(i64::MAX)))
            .map(|(_, review)| review)
            .filter(|review| review.hide_rank != hide_rank)
        {
            review.hide_rank = hide_rank;
            review.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}
