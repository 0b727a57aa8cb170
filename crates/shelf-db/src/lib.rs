//! # shelf-db
//!
//! Storage layer implementing the review store traits.
//!
//! ## Overview
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - `PgReviewStore` (PostgreSQL) and `InMemoryReviewStore` (in-process)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shelf_db::pool::{create_pool, DatabaseConfig};
//! use shelf_db::PgReviewStore;
//! use shelf_core::traits::ReviewStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     let store = PgReviewStore::new(pool);
//!
//!     let mut tx = store.begin().await?;
//!     // ...
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{InMemoryReviewStore, PgReviewStore};
