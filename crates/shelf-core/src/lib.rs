//! # shelf-core
//!
//! Domain layer containing entities, value objects, the ranking engine, and
//! review store traits. This crate has zero dependencies on infrastructure
//! (database, runtime, etc.).

pub mod entities;
pub mod error;
pub mod ranking;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Comparison, ComparisonTargets, Reaction, Review, ReviewInput};
pub use error::{DomainError, InvalidComparison};
pub use ranking::{HideRankPolicy, Placement, RankUpdate, Removal};
pub use traits::{RepoResult, ReviewFilter, ReviewStore, ReviewTransaction};
pub use value_objects::{BookId, IdParseError, RATING_SCALE_MAX, RatingInterval, UserId};
