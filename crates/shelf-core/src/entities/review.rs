//! Review entity - one user's ranked reaction to one book

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Reaction;
use crate::value_objects::{BookId, UserId};

/// Review entity, unique per (user_id, book_id).
///
/// `rank` is only meaningful inside the (user_id, reaction) partition.
/// `rating` and `hide_rank` are derived by the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub user_id: UserId,
    pub book_id: BookId,
    pub reaction: Reaction,
    pub rank: i32,
    pub rating: f64,
    pub hide_rank: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Check if this review belongs to the same partition as another
    #[inline]
    pub fn shares_partition(&self, other: &Review) -> bool {
        self.user_id == other.user_id && self.reaction == other.reaction
    }

    /// Rating suitable for display, `None` while the user's ranks are hidden
    pub fn visible_rating(&self) -> Option<f64> {
        (!self.hide_rank).then_some(self.rating)
    }
}

/// Caller-supplied part of a review; rank, rating, and visibility are filled in
/// by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewInput {
    pub user_id: UserId,
    pub book_id: BookId,
    pub reaction: Reaction,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ReviewInput {
    /// Create a new ReviewInput without notes
    pub fn new(user_id: UserId, book_id: BookId, reaction: Reaction) -> Self {
        Self {
            user_id,
            book_id,
            reaction,
            notes: None,
        }
    }

    /// Attach notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Build the stored review once its ranking fields are known
    pub fn into_review(
        self,
        rank: i32,
        rating: f64,
        hide_rank: bool,
        created_at: Option<DateTime<Utc>>,
    ) -> Review {
        let now = Utc::now();
        Review {
            user_id: self.user_id,
            book_id: self.book_id,
            reaction: self.reaction,
            rank,
            rating,
            hide_rank,
            notes: self.notes,
            created_at: created_at.unwrap_or(now),
            updated_at: now,
        }
    }
}
