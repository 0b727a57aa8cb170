//! Review entity <-> model mapper

use shelf_core::entities::{Reaction, Review};
use shelf_core::error::DomainError;
use shelf_core::value_objects::{BookId, UserId};

use crate::models::ReviewModel;

/// Convert ReviewModel to Review entity. Fails on an unknown reaction string,
/// which the table's check constraint should make impossible.
impl TryFrom<ReviewModel> for Review {
    type Error = DomainError;

    fn try_from(model: ReviewModel) -> Result<Self, Self::Error> {
        let reaction = Reaction::parse(&model.reaction).ok_or_else(|| {
            DomainError::consistency(format!(
                "review {}/{} has unknown reaction {:?}",
                model.user_id, model.book_id, model.reaction
            ))
        })?;

        Ok(Review {
            user_id: UserId::new(model.user_id),
            book_id: BookId::new(model.book_id),
            reaction,
            rank: model.rank,
            rating: model.rating,
            hide_rank: model.hide_rank,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

/// Convert a batch of rows, failing on the first bad one
pub fn reviews_from_models(models: Vec<ReviewModel>) -> Result<Vec<Review>, DomainError> {
    models.into_iter().map(Review::try_from).collect()
}

/// Convert Review entity reference to values for database insertion
pub struct ReviewInsert<'a> {
    pub user_id: i64,
    pub book_id: i64,
    pub reaction: &'static str,
    pub rank: i32,
    pub rating: f64,
    pub hide_rank: bool,
    pub notes: Option<&'a str>,
}

impl<'a> ReviewInsert<'a> {
    pub fn new(review: &'a Review) -> Self {
        Self {
            user_id: review.user_id.into_inner(),
            book_id: review.book_id.into_inner(),
            reaction: review.reaction.as_str(),
            rank: review.rank,
            rating: review.rating,
            hide_rank: review.hide_rank,
            notes: review.notes.as_deref(),
        }
    }
}
