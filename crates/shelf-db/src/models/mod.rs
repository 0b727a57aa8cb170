//! Database models - SQLx-compatible structs for PostgreSQL tables

mod review;

pub use review::ReviewModel;
