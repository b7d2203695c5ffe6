//! Represents a receiver's claim on a donation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::status::{DonationStatus, RequestStatus};

/// A row of the `pickup_requests` table.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct PickupRequest {
    pub id: i64,
    pub donation_id: i64,
    pub receiver_id: i64,

    /// When the receiver intends to collect.
    pub pickup_time: DateTime<Utc>,

    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Receiver-facing view of a request, joined with the donation and donor.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct ReceiverRequest {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: PickupRequest,
    pub food_type: String,
    pub description: String,
    pub quantity: String,
    pub expiry: DateTime<Utc>,
    pub address: Option<String>,
    pub donation_status: DonationStatus,
    pub donor_name: String,
    pub donor_phone: Option<String>,
}
