//! Reaction - the category a review belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{RatingInterval, RATING_SCALE_MAX};

/// One of three mutually exclusive reaction categories.
///
/// Each reaction owns a fixed third of the score axis, so a rating alone
/// tells which reaction produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Negative,
    Neutral,
    Positive,
}

impl Reaction {
    /// All reactions, lowest interval first
    pub const ALL: [Reaction; 3] = [Self::Negative, Self::Neutral, Self::Positive];

    /// Rating interval for this reaction
    pub fn interval(self) -> RatingInterval {
        let third = RATING_SCALE_MAX / 3.0;
        match self {
            Self::Negative => RatingInterval::new(0.0, third),
            Self::Neutral => RatingInterval::new(third, 2.0 * third),
            Self::Positive => RatingInterval::new(2.0 * third, RATING_SCALE_MAX),
        }
    }

    /// Recover the reaction that produced a rating.
    ///
    /// Synthesized ratings never sit on an interval's lower bound (rank starts at 1),
    /// so intervals are treated as `(low, high]`.
    pub fn from_rating(rating: f64) -> Option<Self> {
        if !(0.0..=RATING_SCALE_MAX).contains(&rating) {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|reaction| rating <= reaction.interval().high)
    }

    /// Wire/storage representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }

    /// Parse from the wire/storage representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "negative" => Some(Self::Negative),
            "neutral" => Some(Self::Neutral),
            "positive" => Some(Self::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
