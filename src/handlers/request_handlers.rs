//! HTTP handlers for pickup requests.

use crate::{
    errors::AppError,
    handlers::identity::Caller,
    models::{
        pickup_request::{PickupRequest, ReceiverRequest},
        status::RequestStatus,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `POST /requests`.
#[derive(Debug, Deserialize)]
pub struct CreatePickupReq {
    pub donation_id: i64,
    pub pickup_time: DateTime<Utc>,
}

/// Body of `PUT /requests/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusReq {
    pub status: RequestStatus,
}

/// POST `/requests` — claim an available donation.
///
/// A lost reservation race answers 409 so the client re-runs its search.
pub async fn create_request(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<CreatePickupReq>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    if !caller.role.can_request_pickup() {
        return Err(AppError::forbidden(
            "only receivers and NGOs can request pickups",
        ));
    }
    let Json(payload) = payload?;

    let request = state
        .lifecycle
        .create_request(payload.donation_id, caller.user_id, payload.pickup_time)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// PUT `/requests/{id}/status` — the donation's donor accepts, rejects or
/// completes a request.
pub async fn update_request_status(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<i64>,
    payload: Result<Json<UpdateStatusReq>, JsonRejection>,
) -> Result<Json<PickupRequest>, AppError> {
    let Json(payload) = payload?;

    let request = state.lifecycle.get_request(request_id).await?;
    let donation = state.lifecycle.get_donation(request.donation_id).await?;
    if !caller.is_admin() && caller.user_id != donation.donor_id {
        return Err(AppError::forbidden(
            "only the donor of this donation can change the request",
        ));
    }

    let updated = state
        .lifecycle
        .update_request_status(request_id, payload.status)
        .await?;
    Ok(Json(updated))
}

/// POST `/requests/{id}/cancel` — the receiver withdraws a pending request.
pub async fn cancel_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<i64>,
) -> Result<Json<PickupRequest>, AppError> {
    let cancelled = state
        .lifecycle
        .cancel_request(request_id, caller.user_id)
        .await?;
    Ok(Json(cancelled))
}

/// GET `/receivers/{id}/requests` — request history, newest first.
pub async fn list_receiver_requests(
    State(state): State<AppState>,
    caller: Caller,
    Path(receiver_id): Path<i64>,
) -> Result<Json<Vec<ReceiverRequest>>, AppError> {
    caller.require_self_or_admin(receiver_id)?;
    Ok(Json(
        state
            .lifecycle
            .list_requests_for_receiver(receiver_id)
            .await?,
    ))
}
