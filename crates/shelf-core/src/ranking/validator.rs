//! Comparison validator
//!
//! Decides whether a resolved comparison is well-formed relative to the
//! partition the new review is about to join. Rules are checked in order and
//! the first one that fails is reported.

use crate::entities::{ComparisonTargets, Reaction, Review};
use crate::error::InvalidComparison;

/// Validate a comparison for a review with `new_reaction` entering a partition
/// whose current highest rank is `max_rank` (0 when empty).
///
/// 1. A tie cannot be combined with a strict bound.
/// 2. A tie must share the new review's reaction.
/// 3. Two bounds must be adjacent (`greater_than.rank - less_than.rank == 1`)
///    and both share the reaction.
/// 4. A lone `less_than` must be the current top (`rank == max_rank`).
/// 5. A lone `greater_than` must be the current bottom (`rank == 1`).
/// 6. No comparison is only allowed for an empty partition.
pub fn validate(
    new_reaction: Reaction,
    max_rank: i32,
    targets: &ComparisonTargets,
) -> Result<(), InvalidComparison> {
    let ComparisonTargets {
        less_than,
        equal_to,
        greater_than,
    } = targets;

    if equal_to.is_some() && (less_than.is_some() || greater_than.is_some()) {
        return Err(InvalidComparison::TieWithBound);
    }

    match (less_than, equal_to, greater_than) {
        (_, Some(equal_to), _) => same_reaction(new_reaction, equal_to),
        (Some(lower), None, Some(upper)) => {
            if upper.rank - lower.rank != 1 {
                return Err(InvalidComparison::NotAdjacent {
                    lower: lower.rank,
                    upper: upper.rank,
                });
            }
            same_reaction(new_reaction, lower)?;
            same_reaction(new_reaction, upper)
        }
        (Some(lower), None, None) => {
            same_reaction(new_reaction, lower)?;
            if lower.rank != max_rank {
                return Err(InvalidComparison::NotTop {
                    rank: lower.rank,
                    max_rank,
                });
            }
            Ok(())
        }
        (None, None, Some(upper)) => {
            same_reaction(new_reaction, upper)?;
            if upper.rank != 1 {
                return Err(InvalidComparison::NotBottom { rank: upper.rank });
            }
            Ok(())
        }
        (None, None, None) => {
            if max_rank != 0 {
                return Err(InvalidComparison::MissingComparison { max_rank });
            }
            Ok(())
        }
    }
}

fn same_reaction(expected: Reaction, target: &Review) -> Result<(), InvalidComparison> {
    if target.reaction != expected {
        return Err(InvalidComparison::ReactionMismatch {
            expected,
            found: target.reaction,
        });
    }
    Ok(())
}
