//! Data transfer objects for requests and responses
//!
//! This module provides:
//! - Request DTOs with validation
//! - Response DTOs for serialized output
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{ListReviewsQuery, UpsertReviewRequest};
pub use responses::{ReviewListResponse, ReviewResponse};
