//! Ranking engine - pure functions over one (user, reaction) partition
//!
//! Nothing here touches storage. The service layer reads state through a
//! `ReviewTransaction`, feeds it to these functions, and writes the results
//! back in the same transaction.

mod allocator;
mod synthesizer;
mod validator;
mod verify;
mod visibility;

pub use allocator::{
    InsertionPlan, Placement, RankUpdate, Removal, place, plan_insertion, plan_removal,
};
pub use synthesizer::rating;
pub use validator::validate;
pub use verify::verify_partition;
pub use visibility::{DEFAULT_HIDE_RANK_THRESHOLD, HideRankPolicy};
