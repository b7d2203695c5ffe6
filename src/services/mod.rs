//! Service layer: the proximity search, the donation lifecycle manager and
//! the small account/feedback services around them. Every service receives
//! a [`database::Database`] handle at construction.

pub mod account_service;
pub mod database;
pub mod error;
pub mod feedback_service;
pub mod geo;
pub mod lifecycle_service;
pub mod search_service;

/// Column list for [`crate::models::donation::Donation`] over alias `d`.
pub(crate) const DONATION_COLUMNS: &str = "d.id, d.donor_id, d.food_type, d.description, \
     d.quantity, d.freshness, d.latitude, d.longitude, d.address, d.pickup_instructions, \
     d.expiry, d.status, d.created_at";

/// Column list for [`crate::models::pickup_request::PickupRequest`] over alias `r`.
pub(crate) const REQUEST_COLUMNS: &str =
    "r.id, r.donation_id, r.receiver_id, r.pickup_time, r.status, r.created_at, r.updated_at";

/// Unqualified request columns for `RETURNING` clauses.
pub(crate) const REQUEST_FIELDS: &str =
    "id, donation_id, receiver_id, pickup_time, status, created_at, updated_at";
