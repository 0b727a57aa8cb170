//! Partition checks run after a write, before commit

use crate::entities::{Reaction, Review};
use crate::error::DomainError;

const TOLERANCE: f64 = 1e-9;

/// Check that one (user, reaction) partition is internally consistent:
///
/// - every member carries `reaction`
/// - the distinct ranks are exactly `1..=max_rank`
/// - every rating lies inside the reaction's interval
/// - ratings never decrease as rank grows, and tied reviews share a rating
///
/// `partition` may be in any order.
pub fn verify_partition(reaction: Reaction, partition: &[Review]) -> Result<(), DomainError> {
    if let Some(stray) = partition.iter().find(|r| r.reaction != reaction) {
        return Err(DomainError::consistency(format!(
            "book {} is {} but sits in the {reaction} partition",
            stray.book_id, stray.reaction
        )));
    }

    let mut sorted: Vec<&Review> = partition.iter().collect();
    sorted.sort_by_key(|r| r.rank);

    let mut expected_rank = 1;
    for review in &sorted {
        if review.rank == expected_rank {
            expected_rank += 1;
        } else if expected_rank == 1 || review.rank != expected_rank - 1 {
            return Err(DomainError::consistency(format!(
                "{reaction} partition skips rank {expected_rank} (next is {})",
                review.rank
            )));
        }
    }

    let interval = reaction.interval();
    for review in &sorted {
        if review.rating < interval.low - TOLERANCE || review.rating > interval.high + TOLERANCE {
            return Err(DomainError::consistency(format!(
                "book {} has rating {} outside [{}, {}]",
                review.book_id, review.rating, interval.low, interval.high
            )));
        }
    }

    for pair in sorted.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        let broken = if lower.rank == upper.rank {
            (lower.rating - upper.rating).abs() > TOLERANCE
        } else {
            lower.rating > upper.rating + TOLERANCE
        };
        if broken {
            return Err(DomainError::consistency(format!(
                "ratings out of order: book {} (rank {}, {}) vs book {} (rank {}, {})",
                lower.book_id, lower.rank, lower.rating, upper.book_id, upper.rank, upper.rating
            )));
        }
    }

    Ok(())
}
