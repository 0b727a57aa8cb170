//! Test fixtures and data generators
//!
//! Provides unique ids and comparison builders for integration tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rand::Rng;
use shelf_core::entities::{Comparison, Reaction, Review};
use shelf_core::value_objects::{BookId, UserId};

/// Counter for unique test users
static COUNTER: AtomicI64 = AtomicI64::new(0);

/// Per-process offset so rows left in a shared database never collide
fn run_base() -> i64 {
    static BASE: OnceLock<i64> = OnceLock::new();
    *BASE.get_or_init(|| {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        millis * 1000
    })
}

/// Get a user id no other test in this run uses
pub fn unique_user_id() -> UserId {
    UserId::new(run_base() + COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Book id shorthand
pub fn book(id: i64) -> BookId {
    BookId::new(id)
}

/// Highest rank in a partition, 0 when empty
pub fn max_rank(partition: &[Review]) -> i32 {
    partition.iter().map(|r| r.rank).max().unwrap_or(0)
}

/// Members of `partition` holding `rank`
pub fn members_at(partition: &[Review], rank: i32) -> Vec<&Review> {
    partition.iter().filter(|r| r.rank == rank).collect()
}

/// Pick one of the three reactions
pub fn random_reaction<R: Rng>(rng: &mut R) -> Reaction {
    Reaction::ALL[rng.gen_range(0..Reaction::ALL.len())]
}

/// A comparison the ranking engine accepts, with the rank it should produce
#[derive(Debug, Clone, Copy)]
pub struct PlannedComparison {
    pub comparison: Comparison,
    pub expected_rank: i32,
    pub tie: bool,
}

/// Build a valid comparison against `partition`.
///
/// Ties are chosen with probability `tie_chance`; otherwise a uniformly
/// random slot between existing ranks is targeted.
pub fn random_comparison<R: Rng>(
    rng: &mut R,
    partition: &[Review],
    tie_chance: f64,
) -> PlannedComparison {
    let max = max_rank(partition);
    if max == 0 {
        return PlannedComparison {
            comparison: Comparison::none(),
            expected_rank: 1,
            tie: false,
        };
    }

    if rng.gen_bool(tie_chance) {
        if let Some(target) = partition.choose(rng) {
            return PlannedComparison {
                comparison: Comparison::equal_to(target.book_id),
                expected_rank: target.rank,
                tie: true,
            };
        }
    }

    let slot = rng.gen_range(1..=max + 1);
    let pick = |rng: &mut R, rank: i32| {
        members_at(partition, rank)
            .choose(rng)
            .map(|r| r.book_id)
            .unwrap_or_else(|| panic!("rank {rank} is empty in a contiguous partition"))
    };

    let comparison = if slot == 1 {
        Comparison::worse_than(pick(rng, 1))
    } else if slot == max + 1 {
        Comparison::better_than(pick(rng, max))
    } else {
        let lower = pick(rng, slot - 1);
        let upper = pick(rng, slot);
        Comparison::between(lower, upper)
    };

    PlannedComparison {
        comparison,
        expected_rank: slot,
        tie: false,
    }
}
