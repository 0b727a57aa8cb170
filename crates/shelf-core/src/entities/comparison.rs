//! Comparison - the relative judgment that positions a review

use serde::{Deserialize, Serialize};

use crate::entities::Review;
use crate::value_objects::BookId;

/// Up to three references to other books the same user has already reviewed.
///
/// `equal_to_id` asks for a tie. `less_than_id` / `greater_than_id` ask for a strict
/// position: the new review is better than `less_than_id` and worse than
/// `greater_than_id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub less_than_id: Option<BookId>,
    #[serde(default)]
    pub equal_to_id: Option<BookId>,
    #[serde(default)]
    pub greater_than_id: Option<BookId>,
}

impl Comparison {
    /// No comparison (only valid for the first review of a partition)
    pub fn none() -> Self {
        Self::default()
    }

    /// Tie with an existing review
    pub fn equal_to(book_id: BookId) -> Self {
        Self {
            equal_to_id: Some(book_id),
            ..Self::default()
        }
    }

    /// Better than an existing review
    pub fn better_than(book_id: BookId) -> Self {
        Self {
            less_than_id: Some(book_id),
            ..Self::default()
        }
    }

    /// Worse than an existing review
    pub fn worse_than(book_id: BookId) -> Self {
        Self {
            greater_than_id: Some(book_id),
            ..Self::default()
        }
    }

    /// Between two existing reviews
    pub fn between(less_than: BookId, greater_than: BookId) -> Self {
        Self {
            less_than_id: Some(less_than),
            greater_than_id: Some(greater_than),
            equal_to_id: None,
        }
    }

    /// Check if no reference is set
    pub fn is_empty(&self) -> bool {
        self.less_than_id.is_none() && self.equal_to_id.is_none() && self.greater_than_id.is_none()
    }
}

/// A comparison with each reference resolved against the user's reviews.
/// A reference that does not name one of the user's reviews is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTargets {
    pub less_than: Option<Review>,
    pub equal_to: Option<Review>,
    pub greater_than: Option<Review>,
}

impl ComparisonTargets {
    /// Check if nothing resolved
    pub fn is_empty(&self) -> bool {
        self.less_than.is_none() && self.equal_to.is_none() && self.greater_than.is_none()
    }
}
