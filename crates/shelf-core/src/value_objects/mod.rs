//! Value objects - immutable types that represent domain concepts

mod ids;
mod interval;

pub use ids::{BookId, IdParseError, UserId};
pub use interval::{RatingInterval, RATING_SCALE_MAX};
