//! Rating synthesizer - maps a rank to a score inside the reaction's interval

use crate::value_objects::RatingInterval;

/// Linear interpolation of `rank` over `1..=max_rank` into `interval`:
///
/// `rating = rank * (high - low) / max_rank + low`
///
/// The top rank always lands on `interval.high`. A non-positive `max_rank`
/// (empty partition) yields `interval.low`.
pub fn rating(rank: i32, max_rank: i32, interval: RatingInterval) -> f64 {
    if max_rank <= 0 {
        return interval.low;
    }
    let raw = f64::from(rank) * interval.width() / f64::from(max_rank) + interval.low;
    interval.clamp(raw)
}
