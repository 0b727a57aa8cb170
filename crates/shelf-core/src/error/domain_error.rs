//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::entities::Reaction;
use crate::value_objects::{BookId, UserId};

/// Reasons a comparison is rejected against the current partition state.
///
/// Variants follow the order in which the rules are checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidComparison {
    #[error("a tie cannot be combined with a strict bound")]
    TieWithBound,

    #[error("comparison target has reaction {found}, expected {expected}")]
    ReactionMismatch { expected: Reaction, found: Reaction },

    #[error("bounds must be adjacent: less_than rank {lower}, greater_than rank {upper}")]
    NotAdjacent { lower: i32, upper: i32 },

    #[error("less_than target must be the top of the partition: rank {rank}, max rank {max_rank}")]
    NotTop { rank: i32, max_rank: i32 },

    #[error("greater_than target must be the bottom of the partition: rank {rank}")]
    NotBottom { rank: i32 },

    #[error("a comparison is required once the partition has reviews (max rank {max_rank})")]
    MissingComparison { max_rank: i32 },
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Review not found: user {user_id}, book {book_id}")]
    ReviewNotFound { user_id: UserId, book_id: BookId },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid comparison: {0}")]
    InvalidComparison(#[from] InvalidComparison),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Concurrent modification: {0}")]
    ConcurrentModification(String),

    // =========================================================================
    // Invariant Violations
    // =========================================================================
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReviewNotFound { .. } => "UNKNOWN_REVIEW",
            Self::InvalidComparison(_) => "INVALID_COMPARISON",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::ConsistencyViolation(_) => "CONSISTENCY_VIOLATION",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for a missing review
    pub fn review_not_found(user_id: UserId, book_id: BookId) -> Self {
        Self::ReviewNotFound { user_id, book_id }
    }

    /// Shorthand for a broken invariant
    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::ConsistencyViolation(msg.into())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ReviewNotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidComparison(_) | Self::ValidationError(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }

    /// Check if a fresh attempt of the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }
}
