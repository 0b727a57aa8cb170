//! Review database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reviews table
#[derive(Debug, Clone, FromRow)]
pub struct ReviewModel {
    pub user_id: i64,
    pub book_id: i64,
    pub reaction: String,
    pub rank: i32,
    pub rating: f64,
    pub hide_rank: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
