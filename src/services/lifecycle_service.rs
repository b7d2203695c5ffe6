//! Donation lifecycle manager: the only code that changes donation or
//! pickup-request status.
//!
//! Each mutating operation runs in one immediate transaction on the
//! single-connection writer pool, and every status flip is a compare-and-set
//! `UPDATE ... WHERE status = ?`, so a stale read can never be written back.
//! Any early return drops the transaction, which rolls it back; callers never
//! observe half of a transition.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::{error, info, warn};

use crate::models::{
    donation::{Donation, DonorDonation, NewDonation},
    pickup_request::{PickupRequest, ReceiverRequest},
    status::{DonationEffect, DonationStatus, EXPIRY, RESERVATION, RequestStatus},
    user::Role,
};

use super::{
    DONATION_COLUMNS, REQUEST_COLUMNS, REQUEST_FIELDS,
    database::Database,
    error::{ServiceError, ServiceResult, is_unique_violation},
    geo::GeoPoint,
};

#[derive(Clone, Debug)]
pub struct LifecycleManager {
    db: Database,
}

impl LifecycleManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Post a new donation in `available` state.
    ///
    /// Text fields must be non-blank, coordinates valid and the expiry in
    /// the future. Category fields are stored lowercase so search filters
    /// compare case-insensitively.
    pub async fn create_donation(
        &self,
        donor_id: i64,
        payload: NewDonation,
    ) -> ServiceResult<Donation> {
        let location = GeoPoint::new(payload.latitude, payload.longitude)?;
        let food_type = required_text("food_type", &payload.food_type)?.to_lowercase();
        let freshness = required_text("freshness", &payload.freshness)?.to_lowercase();
        let description = required_text("description", &payload.description)?.to_string();
        let quantity = required_text("quantity", &payload.quantity)?.to_string();
        let now = Utc::now();
        if payload.expiry <= now {
            return Err(ServiceError::invalid("expiry", "must be in the future"));
        }

        let mut tx = self.db.begin_write().await?;
        match user_role(&mut tx, donor_id).await? {
            None => return Err(ServiceError::not_found("user", donor_id)),
            Some(Role::Donor) => {}
            Some(role) => {
                return Err(ServiceError::invalid(
                    "donor_id",
                    format!("user {donor_id} is a {role}, not a donor"),
                ));
            }
        }

        let donation = sqlx::query_as::<_, Donation>(
            r#"
            INSERT INTO donations (
                donor_id, food_type, description, quantity, freshness,
                latitude, longitude, address, pickup_instructions,
                expiry, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, donor_id, food_type, description, quantity, freshness,
                      latitude, longitude, address, pickup_instructions,
                      expiry, status, created_at
            "#,
        )
        .bind(donor_id)
        .bind(food_type)
        .bind(description)
        .bind(quantity)
        .bind(freshness)
        .bind(location.lat)
        .bind(location.lng)
        .bind(optional_text(payload.address))
        .bind(optional_text(payload.pickup_instructions))
        .bind(payload.expiry)
        .bind(DonationStatus::Available)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            "donation {} posted by donor {} at ({}, {})",
            donation.id, donor_id, donation.latitude, donation.longitude
        );
        Ok(donation)
    }

    pub async fn get_donation(&self, donation_id: i64) -> ServiceResult<Donation> {
        let sql = format!("SELECT {DONATION_COLUMNS} FROM donations d WHERE d.id = ?");
        sqlx::query_as::<_, Donation>(&sql)
            .bind(donation_id)
            .fetch_optional(self.db.reader())
            .await?
            .ok_or_else(|| ServiceError::not_found("donation", donation_id))
    }

    pub async fn get_request(&self, request_id: i64) -> ServiceResult<PickupRequest> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM pickup_requests r WHERE r.id = ?");
        sqlx::query_as::<_, PickupRequest>(&sql)
            .bind(request_id)
            .fetch_optional(self.db.reader())
            .await?
            .ok_or_else(|| ServiceError::not_found("pickup request", request_id))
    }

    /// Reserve an available donation for a receiver.
    ///
    /// The reservation flip is the first statement of the transaction. If it
    /// matches no row the donation is either unknown (`NotFound`) or already
    /// claimed (`Conflict`); the caller should re-query availability rather
    /// than retry.
    pub async fn create_request(
        &self,
        donation_id: i64,
        receiver_id: i64,
        pickup_time: DateTime<Utc>,
    ) -> ServiceResult<PickupRequest> {
        let mut tx = self.db.begin_write().await?;

        if !apply_donation_effect(&mut tx, donation_id, RESERVATION).await? {
            let current = donation_status(&mut tx, donation_id).await?;
            tx.rollback().await?;
            return Err(match current {
                None => ServiceError::not_found("donation", donation_id),
                Some(status) => {
                    warn!(
                        "receiver {} lost reservation race for donation {} (now {})",
                        receiver_id, donation_id, status
                    );
                    ServiceError::Conflict(donation_id)
                }
            });
        }

        match user_role(&mut tx, receiver_id).await? {
            None => return Err(ServiceError::not_found("user", receiver_id)),
            Some(role) if !role.can_request_pickup() => {
                return Err(ServiceError::invalid(
                    "receiver_id",
                    format!("user {receiver_id} is a {role} and cannot request pickups"),
                ));
            }
            Some(_) => {}
        }

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO pickup_requests \
                 (donation_id, receiver_id, pickup_time, status, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING {REQUEST_FIELDS}"
        );
        let request = sqlx::query_as::<_, PickupRequest>(&sql)
            .bind(donation_id)
            .bind(receiver_id)
            .bind(pickup_time)
            .bind(RequestStatus::Pending)
            .bind(now)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ServiceError::Conflict(donation_id)
                } else {
                    ServiceError::StorageUnavailable(err)
                }
            })?;
        tx.commit().await?;

        info!(
            "request {} reserved donation {} for receiver {}",
            request.id, donation_id, receiver_id
        );
        Ok(request)
    }

    /// Move a request along its graph and apply the matching donation edge
    /// in the same transaction.
    pub async fn update_request_status(
        &self,
        request_id: i64,
        next: RequestStatus,
    ) -> ServiceResult<PickupRequest> {
        let mut tx = self.db.begin_write().await?;

        let sql = format!("SELECT {REQUEST_COLUMNS} FROM pickup_requests r WHERE r.id = ?");
        let current = sqlx::query_as::<_, PickupRequest>(&sql)
            .bind(request_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("pickup request", request_id))?;

        if !current.status.can_transition_to(next) {
            return Err(ServiceError::transition(
                "pickup request",
                current.status,
                next,
            ));
        }

        let sql = format!(
            "UPDATE pickup_requests SET status = ?, updated_at = ? \
             WHERE id = ? AND status = ? \
             RETURNING {REQUEST_FIELDS}"
        );
        let updated = sqlx::query_as::<_, PickupRequest>(&sql)
            .bind(next)
            .bind(Utc::now())
            .bind(request_id)
            .bind(current.status)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::transition("pickup request", current.status, next))?;

        if let Some(effect) = next.donation_effect() {
            if !apply_donation_effect(&mut tx, current.donation_id, effect).await? {
                let actual = donation_status(&mut tx, current.donation_id).await?;
                error!(
                    "request {} -> {} found donation {} in {:?}, expected {}",
                    request_id, next, current.donation_id, actual, effect.from
                );
                return Err(ServiceError::transition(
                    "donation",
                    actual.map_or("missing", |s| s.as_str()),
                    effect.to,
                ));
            }
        }
        tx.commit().await?;

        info!(
            "request {} moved {} -> {} (donation {})",
            request_id, current.status, next, current.donation_id
        );
        Ok(updated)
    }

    /// Receiver withdraws a pending request; the donation becomes available.
    ///
    /// A request owned by someone else is reported as not found.
    pub async fn cancel_request(
        &self,
        request_id: i64,
        receiver_id: i64,
    ) -> ServiceResult<PickupRequest> {
        let request = self.get_request(request_id).await?;
        if request.receiver_id != receiver_id {
            return Err(ServiceError::not_found("pickup request", request_id));
        }
        self.update_request_status(request_id, RequestStatus::Rejected)
            .await
    }

    /// Receiver's requests with donation and donor details, newest first.
    pub async fn list_requests_for_receiver(
        &self,
        receiver_id: i64,
    ) -> ServiceResult<Vec<ReceiverRequest>> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS}, d.food_type, d.description, d.quantity, d.expiry, \
                    d.address, d.status AS donation_status, \
                    u.username AS donor_name, u.phone AS donor_phone \
             FROM pickup_requests r \
             JOIN donations d ON d.id = r.donation_id \
             JOIN users u ON u.id = d.donor_id \
             WHERE r.receiver_id = ? \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        let rows = sqlx::query_as::<_, ReceiverRequest>(&sql)
            .bind(receiver_id)
            .fetch_all(self.db.reader())
            .await?;
        Ok(rows)
    }

    /// Donor's donations with how many requests each has drawn, newest first.
    pub async fn list_donations_for_donor(
        &self,
        donor_id: i64,
    ) -> ServiceResult<Vec<DonorDonation>> {
        let sql = format!(
            "SELECT {DONATION_COLUMNS}, COUNT(r.id) AS request_count \
             FROM donations d \
             LEFT JOIN pickup_requests r ON r.donation_id = d.id \
             WHERE d.donor_id = ? \
             GROUP BY d.id \
             ORDER BY d.created_at DESC, d.id DESC"
        );
        let rows = sqlx::query_as::<_, DonorDonation>(&sql)
            .bind(donor_id)
            .fetch_all(self.db.reader())
            .await?;
        Ok(rows)
    }

    /// Mark every still-available donation whose expiry is at or before
    /// `now` as expired. Reserved donations are left to their request.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        check_donation_edge(EXPIRY)?;
        let result =
            sqlx::query("UPDATE donations SET status = ? WHERE status = ? AND expiry <= ?")
                .bind(EXPIRY.to)
                .bind(EXPIRY.from)
                .bind(now)
                .execute(self.db.writer())
                .await?;

        let expired = result.rows_affected();
        if expired > 0 {
            info!("expired {} overdue donations", expired);
        }
        Ok(expired)
    }
}

/// Compare-and-set a donation edge. Returns false if the donation was not in
/// `effect.from`.
async fn apply_donation_effect(
    conn: &mut SqliteConnection,
    donation_id: i64,
    effect: DonationEffect,
) -> ServiceResult<bool> {
    check_donation_edge(effect)?;
    let result = sqlx::query("UPDATE donations SET status = ? WHERE id = ? AND status = ?")
        .bind(effect.to)
        .bind(donation_id)
        .bind(effect.from)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Reject an edge the donation graph does not allow.
fn check_donation_edge(effect: DonationEffect) -> ServiceResult<()> {
    if effect.from.can_transition_to(effect.to) {
        Ok(())
    } else {
        Err(ServiceError::transition("donation", effect.from, effect.to))
    }
}

async fn donation_status(
    conn: &mut SqliteConnection,
    donation_id: i64,
) -> ServiceResult<Option<DonationStatus>> {
    let status =
        sqlx::query_scalar::<_, DonationStatus>("SELECT status FROM donations WHERE id = ?")
            .bind(donation_id)
            .fetch_optional(conn)
            .await?;
    Ok(status)
}

async fn user_role(conn: &mut SqliteConnection, user_id: i64) -> ServiceResult<Option<Role>> {
    let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(role)
}

fn required_text<'a>(field: &'static str, value: &'a str) -> ServiceResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::invalid(field, "must not be empty"));
    }
    Ok(trimmed)
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
