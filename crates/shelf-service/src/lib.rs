//! # shelf-service
//!
//! Application layer containing the review ranking service and DTOs.

pub mod dto;
pub mod services;

pub use services::{ReviewService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
