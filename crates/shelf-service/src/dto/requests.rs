//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

use shelf_core::entities::{Comparison, Reaction, ReviewInput};
use shelf_core::traits::ReviewFilter;
use shelf_core::value_objects::{BookId, UserId};

/// Create or replace a review
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertReviewRequest {
    pub user_id: UserId,
    pub book_id: BookId,
    pub reaction: Reaction,

    #[validate(length(max = 5000, message = "Notes must be at most 5000 characters"))]
    #[serde(default)]
    pub notes: Option<String>,

    /// Position relative to the user's other reviews. Omit for the first
    /// review of a reaction.
    #[serde(default)]
    pub comparison: Comparison,
}

impl UpsertReviewRequest {
    /// Split into the stored part and the positioning part
    pub fn into_parts(self) -> (ReviewInput, Comparison) {
        let input = ReviewInput {
            user_id: self.user_id,
            book_id: self.book_id,
            reaction: self.reaction,
            notes: self.notes,
        };
        (input, self.comparison)
    }
}

/// Query parameters for review listings
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListReviewsQuery {
    pub user_id: Option<UserId>,
    pub book_id: Option<BookId>,

    #[validate(range(min = 1, max = 500, message = "Limit must be between 1 and 500"))]
    pub limit: Option<i64>,
}

impl From<ListReviewsQuery> for ReviewFilter {
    fn from(query: ListReviewsQuery) -> Self {
        Self {
            user_id: query.user_id,
            book_id: query.book_id,
            limit: query.limit,
        }
    }
}
