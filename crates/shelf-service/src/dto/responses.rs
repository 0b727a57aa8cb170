//! Response DTOs
//!
//! All response DTOs implement `Serialize` for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shelf_core::entities::Reaction;
use shelf_core::value_objects::{BookId, UserId};

/// A review as shown to clients
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub user_id: UserId,
    pub book_id: BookId,
    pub reaction: Reaction,
    pub rank: i32,
    pub rating: f64,
    pub hide_rank: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A page of reviews plus the total they were drawn from
#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub reviews: Vec<ReviewResponse>,
    pub total: i64,
}
