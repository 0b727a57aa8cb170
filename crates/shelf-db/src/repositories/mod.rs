//! Repository implementations
//!
//! Review store backends implementing the traits defined in shelf-core.

mod error;
mod memory;
mod review;

pub use error::map_db_error;
pub use memory::{InMemoryReviewStore, InMemoryTransaction};
pub use review::{PgReviewStore, PgReviewTransaction};
