use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A receiver's rating of a collected donation.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct Feedback {
    pub id: i64,
    pub donation_id: i64,
    pub receiver_id: i64,

    /// 1 (poor) to 5 (excellent).
    pub rating: i64,

    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
