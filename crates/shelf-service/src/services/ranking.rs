//! Ranking steps
//!
//! Each step runs inside the caller's transaction and leaves the touched
//! partition contiguous. `ReviewService` strings them together; nothing here
//! commits or rolls back.

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use shelf_core::entities::{Comparison, ComparisonTargets, Reaction, Review, ReviewInput};
use shelf_core::error::DomainError;
use shelf_core::ranking::{self, HideRankPolicy, Placement, Removal};
use shelf_core::traits::{RepoResult, ReviewTransaction};
use shelf_core::value_objects::{BookId, UserId};

/// Resolve each comparison reference against the user's reviews.
/// References that name nothing resolve to `None`.
pub(crate) async fn resolve_targets(
    tx: &mut dyn ReviewTransaction,
    user_id: UserId,
    comparison: &Comparison,
) -> RepoResult<ComparisonTargets> {
    Ok(ComparisonTargets {
        less_than: resolve(tx, user_id, comparison.less_than_id).await?,
        equal_to: resolve(tx, user_id, comparison.equal_to_id).await?,
        greater_than: resolve(tx, user_id, comparison.greater_than_id).await?,
    })
}

async fn resolve(
    tx: &mut dyn ReviewTransaction,
    user_id: UserId,
    book_id: Option<BookId>,
) -> RepoResult<Option<Review>> {
    match book_id {
        Some(book_id) => tx.find(user_id, book_id).await,
        None => Ok(None),
    }
}

/// Validate `comparison`, place the new review, shift its partition and
/// insert it. `created_at` carries over the timestamp of a replaced review.
pub(crate) async fn insert_ranked(
    tx: &mut dyn ReviewTransaction,
    input: ReviewInput,
    comparison: &Comparison,
    created_at: Option<DateTime<Utc>>,
) -> RepoResult<Review> {
    let (user_id, reaction) = (input.user_id, input.reaction);

    let targets = resolve_targets(tx, user_id, comparison).await?;
    let max_rank = tx.max_rank(user_id, reaction).await?;

    if let Err(rejected) = ranking::validate(reaction, max_rank, &targets) {
        warn!(
            user_id = %user_id,
            book_id = %input.book_id,
            %reaction,
            max_rank,
            reason = %rejected,
            "Comparison rejected"
        );
        return Err(rejected.into());
    }

    let review = match ranking::place(max_rank, &targets) {
        Placement::Tie {
            rank,
            rating,
            hide_rank,
        } => {
            debug!(rank, "Joining tie group");
            input.into_review(rank, rating, hide_rank, created_at)
        }
        Placement::Insert { rank } => {
            let partition = tx.find_partition(user_id, reaction).await?;
            let plan = ranking::plan_insertion(&partition, rank, max_rank, reaction.interval());
            debug!(
                rank,
                new_max_rank = plan.new_max_rank,
                shifted = plan.updates.len(),
                "Inserting into partition"
            );
            tx.update_rankings(user_id, &plan.updates).await?;
            input.into_review(plan.rank, plan.rating, false, created_at)
        }
    };

    tx.insert(&review).await?;
    Ok(review)
}

/// Delete `review` and close the gap it leaves in its partition
pub(crate) async fn remove_ranked(
    tx: &mut dyn ReviewTransaction,
    review: &Review,
) -> RepoResult<()> {
    let partition = tx.find_partition(review.user_id, review.reaction).await?;
    let removal = ranking::plan_removal(&partition, review).inspect_err(|e| {
        error!(user_id = %review.user_id, book_id = %review.book_id, error = %e, "Partition corrupt");
    })?;

    if !tx.delete(review.user_id, review.book_id).await? {
        return Err(DomainError::consistency(format!(
            "review {}/{} vanished inside its own transaction",
            review.user_id, review.book_id
        )));
    }

    match removal {
        Removal::Detach => debug!(rank = review.rank, "Detached without renumbering"),
        Removal::Collapse {
            new_max_rank,
            updates,
        } => {
            debug!(new_max_rank, shifted = updates.len(), "Collapsed partition");
            tx.update_rankings(review.user_id, &updates).await?;
        }
    }
    Ok(())
}

/// Bring every `hide_rank` flag of a user in line with their review count
pub(crate) async fn sync_hidden(
    tx: &mut dyn ReviewTransaction,
    user_id: UserId,
    policy: HideRankPolicy,
) -> RepoResult<u64> {
    let total = tx.count_by_user(user_id).await?;
    let hide = policy.should_hide(total);
    let changed = tx.set_hide_rank(user_id, hide).await?;
    if changed > 0 {
        debug!(user_id = %user_id, total, hide, changed, "Rank visibility changed");
    }
    Ok(changed)
}

/// Re-read the given partitions and check them
pub(crate) async fn verify(
    tx: &mut dyn ReviewTransaction,
    user_id: UserId,
    reactions: &[Reaction],
) -> RepoResult<()> {
    for &reaction in reactions {
        let partition = tx.find_partition(user_id, reaction).await?;
        ranking::verify_partition(reaction, &partition).inspect_err(|e| {
            error!(user_id = %user_id, %reaction, error = %e, "Partition check failed");
        })?;
    }
    Ok(())
}
