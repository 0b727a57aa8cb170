//! Rank allocator
//!
//! Turns a validated comparison into a rank for the incoming review and works
//! out which partition members shift. Everything here is pure: the service
//! reads the partition, asks for a plan, and writes the plan back inside the
//! same transaction.

use serde::Serialize;

use crate::entities::{ComparisonTargets, Review};
use crate::error::DomainError;
use crate::value_objects::{BookId, RatingInterval};

use super::synthesizer::rating;

/// Where a new review goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Join the tie-group of an existing review; nothing else moves.
    Tie {
        rank: i32,
        rating: f64,
        hide_rank: bool,
    },
    /// Take `rank`, pushing every member at or above it up by one.
    Insert { rank: i32 },
}

/// New ranking fields for one existing partition member
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankUpdate {
    pub book_id: BookId,
    pub rank: i32,
    pub rating: f64,
}

/// Result of planning an insertion
#[derive(Debug, Clone, PartialEq)]
pub struct InsertionPlan {
    /// Rank assigned to the new review
    pub rank: i32,
    /// Rating of the new review
    pub rating: f64,
    /// Partition max rank after the insert
    pub new_max_rank: i32,
    /// Members whose rank or rating changes
    pub updates: Vec<RankUpdate>,
}

/// Result of planning a removal
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// Delete the review and leave the rest of the partition alone. Used when
    /// the review shares its rank with others, or is the last one left.
    Detach,
    /// Delete the review, close the gap it leaves, and rescale.
    Collapse {
        new_max_rank: i32,
        updates: Vec<RankUpdate>,
    },
}

/// Pick the placement for a comparison that already passed validation.
pub fn place(max_rank: i32, targets: &ComparisonTargets) -> Placement {
    if let Some(equal_to) = &targets.equal_to {
        return Placement::Tie {
            rank: equal_to.rank,
            rating: equal_to.rating,
            hide_rank: equal_to.hide_rank,
        };
    }

    match &targets.greater_than {
        Some(greater_than) => Placement::Insert {
            rank: greater_than.rank,
        },
        None => Placement::Insert { rank: max_rank + 1 },
    }
}

/// Plan a strict insertion at `rank` into `partition`, whose highest rank
/// before the insert is `max_rank`.
///
/// Every member at or above `rank` moves up one; every member is rescaled
/// against `max_rank + 1`.
pub fn plan_insertion(
    partition: &[Review],
    rank: i32,
    max_rank: i32,
    interval: RatingInterval,
) -> InsertionPlan {
    let new_max_rank = max_rank + 1;

    let updates = partition
        .iter()
        .filter_map(|member| {
            let new_rank = if member.rank >= rank {
                member.rank + 1
            } else {
                member.rank
            };
            changed(member, new_rank, rating(new_rank, new_max_rank, interval))
        })
        .collect();

    InsertionPlan {
        rank,
        rating: rating(rank, new_max_rank, interval),
        new_max_rank,
        updates,
    }
}

/// Plan the removal of `target` from `partition` (which still contains it).
///
/// The tie-group is every member sharing the target's rank. A group of one
/// that is not the last review in the partition collapses the gap; anything
/// else detaches without renumbering. Detaching from a tie leaves the
/// remaining ratings untouched.
pub fn plan_removal(partition: &[Review], target: &Review) -> Result<Removal, DomainError> {
    let tie_group = partition.iter().filter(|r| r.rank == target.rank).count();

    if tie_group == 0 {
        return Err(DomainError::consistency(format!(
            "review for book {} has rank {} but no partition member holds it",
            target.book_id, target.rank
        )));
    }

    if tie_group > 1 || partition.len() == 1 {
        return Ok(Removal::Detach);
    }

    let max_rank = partition.iter().map(|r| r.rank).max().unwrap_or(0);
    let new_max_rank = max_rank - 1;
    let interval = target.reaction.interval();

    let updates = partition
        .iter()
        .filter(|member| member.book_id != target.book_id)
        .filter_map(|member| {
            let new_rank = if member.rank > target.rank {
                member.rank - 1
            } else {
                member.rank
            };
            changed(member, new_rank, rating(new_rank, new_max_rank, interval))
        })
        .collect();

    Ok(Removal::Collapse {
        new_max_rank,
        updates,
    })
}

fn changed(member: &Review, rank: i32, rating: f64) -> Option<RankUpdate> {
    (member.rank != rank || member.rating != rating).then_some(RankUpdate {
        book_id: member.book_id,
        rank,
        rating,
    })
}
