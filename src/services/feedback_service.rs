//! Ratings left by receivers on donations they collected.

use chrono::Utc;
use tracing::info;

use crate::models::{feedback::Feedback, status::RequestStatus};

use super::{
    database::Database,
    error::{ServiceError, ServiceResult},
};

const FEEDBACK_FIELDS: &str = "id, donation_id, receiver_id, rating, comment, created_at";

#[derive(Clone, Debug)]
pub struct FeedbackService {
    db: Database,
}

impl FeedbackService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record (or replace) a receiver's rating for a donation.
    ///
    /// Only receivers with a completed pickup of the donation may rate it.
    pub async fn submit_feedback(
        &self,
        donation_id: i64,
        receiver_id: i64,
        rating: i64,
        comment: Option<String>,
    ) -> ServiceResult<Feedback> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::invalid("rating", "must be between 1 and 5"));
        }
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut tx = self.db.begin_write().await?;

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE id = ?")
            .bind(donation_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(ServiceError::not_found("donation", donation_id));
        }

        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pickup_requests
             WHERE donation_id = ? AND receiver_id = ? AND status = ?",
        )
        .bind(donation_id)
        .bind(receiver_id)
        .bind(RequestStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;
        if completed == 0 {
            return Err(ServiceError::invalid(
                "donation_id",
                format!("receiver {receiver_id} has not collected donation {donation_id}"),
            ));
        }

        let sql = format!(
            "INSERT INTO feedback (donation_id, receiver_id, rating, comment, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(donation_id, receiver_id) DO UPDATE SET
                 rating = excluded.rating,
                 comment = excluded.comment,
                 created_at = excluded.created_at
             RETURNING {FEEDBACK_FIELDS}"
        );
        let feedback = sqlx::query_as::<_, Feedback>(&sql)
            .bind(donation_id)
            .bind(receiver_id)
            .bind(rating)
            .bind(comment)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "receiver {} rated donation {} with {}",
            receiver_id, donation_id, rating
        );
        Ok(feedback)
    }

    /// All feedback for a donation, newest first.
    pub async fn list_feedback_for_donation(
        &self,
        donation_id: i64,
    ) -> ServiceResult<Vec<Feedback>> {
        let sql = format!(
            "SELECT {FEEDBACK_FIELDS} FROM feedback WHERE donation_id = ?
             ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, Feedback>(&sql)
            .bind(donation_id)
            .fetch_all(self.db.reader())
            .await?;
        Ok(rows)
    }
}
