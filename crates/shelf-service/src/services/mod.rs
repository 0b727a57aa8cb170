//! Business logic services
//!
//! Service layer implementations that validate input, orchestrate the
//! ranking engine, and own transaction boundaries.

pub mod context;
pub mod error;
mod ranking;
pub mod review;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use review::{ReviewService, MAX_LIST_LIMIT};
