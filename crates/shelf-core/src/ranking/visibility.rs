//! Rank visibility - whether a user's ratings are trustworthy enough to show

use serde::{Deserialize, Serialize};

/// Review count below which a user's ranks are hidden
pub const DEFAULT_HIDE_RANK_THRESHOLD: i64 = 10;

/// Hides every rating of a user until they have reviewed `threshold` books
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HideRankPolicy {
    pub threshold: i64,
}

impl HideRankPolicy {
    pub const fn new(threshold: i64) -> Self {
        Self { threshold }
    }

    /// `true` when a user with `total_reviews` reviews should have ranks hidden
    #[inline]
    pub fn should_hide(&self, total_reviews: i64) -> bool {
        total_reviews < self.threshold
    }
}

impl Default for HideRankPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_RANK_THRESHOLD)
    }
}
