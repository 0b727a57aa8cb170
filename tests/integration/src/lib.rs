//! Integration test utilities for the review ranking engine
//!
//! This crate provides a harness that drives `ReviewService` against the
//! in-memory store (or PostgreSQL when `DATABASE_URL` is set), plus
//! helpers that check every partition of a user after each mutation.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
