//! Domain entities - core business objects

mod comparison;
mod reaction;
mod review;

pub use comparison::{Comparison, ComparisonTargets};
pub use reaction::Reaction;
pub use review::{Review, ReviewInput};
