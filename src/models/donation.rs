//! Represents a posted quantity of surplus food.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::DonationStatus;

/// A single donation as stored in the `donations` table.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Donation {
    pub id: i64,

    /// User who posted the donation.
    pub donor_id: i64,

    /// Category used by the search filter (stored lowercase).
    pub food_type: String,

    pub description: String,

    /// Free-form amount, e.g. "20 meals" or "5 kg".
    pub quantity: String,

    /// Freshness category used by the search filter (stored lowercase).
    pub freshness: String,

    pub latitude: f64,
    pub longitude: f64,

    pub address: Option<String>,
    pub pickup_instructions: Option<String>,

    /// After this instant the donation may be swept to `expired`.
    pub expiry: DateTime<Utc>,

    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
}

/// Donation joined with its donor's contact details.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct DonationWithDonor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub donation: Donation,
    pub donor_name: String,
    pub donor_phone: Option<String>,
}

/// A search hit: the donation plus its great-circle distance from the origin.
#[derive(Serialize, Clone, Debug)]
pub struct NearbyDonation {
    #[serde(flatten)]
    pub listing: DonationWithDonor,
    pub distance_km: f64,
}

/// A donor's own donation with the number of requests it has received.
#[derive(Serialize, Clone, FromRow, Debug)]
pub struct DonorDonation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub donation: Donation,
    pub request_count: i64,
}

/// Validated input for creating a donation.
#[derive(Deserialize, Clone, Debug)]
pub struct NewDonation {
    pub food_type: String,
    pub description: String,
    pub quantity: String,
    pub freshness: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub pickup_instructions: Option<String>,
    pub expiry: DateTime<Utc>,
}
