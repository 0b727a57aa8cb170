//! Rating interval - the slice of the score axis owned by one reaction

use serde::Serialize;

/// Upper end of the global score axis. Ratings live in `[0, RATING_SCALE_MAX]`.
pub const RATING_SCALE_MAX: f64 = 10.0;

/// Closed sub-range `[low, high]` of the score axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingInterval {
    pub low: f64,
    pub high: f64,
}

impl RatingInterval {
    /// Create a new interval
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Distance between the bounds
    #[inline]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    /// Check if a rating falls inside the interval (bounds inclusive)
    #[inline]
    pub fn contains(&self, rating: f64) -> bool {
        rating >= self.low && rating <= self.high
    }

    /// Clamp a value into the interval
    #[inline]
    pub fn clamp(&self, rating: f64) -> f64 {
        rating.clamp(self.low, self.high)
    }
}
