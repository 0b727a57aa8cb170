//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use shelf_core::entities::Review;

use super::responses::ReviewResponse;

impl From<&Review> for ReviewResponse {
    fn from(review: &Review) -> Self {
        Self {
            user_id: review.user_id,
            book_id: review.book_id,
            reaction: review.reaction,
            rank: review.rank,
            rating: review.rating,
            hide_rank: review.hide_rank,
            notes: review.notes.clone(),
            created_at: review.created_at,
            updated_at: review.updated_at,
        }
    }
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self::from(&review)
    }
}
