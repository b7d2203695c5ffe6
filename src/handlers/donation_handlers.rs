//! HTTP handlers for donation search, posting and feedback.
//! Payloads are decoded into typed structs here and handed to the services.

use crate::{
    errors::AppError,
    handlers::identity::Caller,
    models::{
        donation::{Donation, DonorDonation, NearbyDonation, NewDonation},
        feedback::Feedback,
        user::Role,
    },
    services::{
        geo::GeoPoint,
        search_service::{NearbyQuery, SearchFilters},
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Query params accepted by `GET /donations/nearby`.
#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(alias = "distance", alias = "radius_km")]
    pub radius: Option<f64>,
    #[serde(alias = "foodType")]
    pub food_type: Option<String>,
    pub freshness: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub count: usize,
    pub donations: Vec<NearbyDonation>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackReq {
    pub rating: i64,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExpireResponse {
    pub expired: u64,
}

/// GET `/donations/nearby?lat=&lng=&radius=&food_type=&freshness=&limit=`
pub async fn search_nearby(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> Result<Json<NearbyResponse>, AppError> {
    let Query(params) = params?;
    let (Some(lat), Some(lng)) = (params.lat, params.lng) else {
        return Err(AppError::bad_request("lat and lng are required"));
    };

    let query = NearbyQuery {
        origin: GeoPoint::new(lat, lng)?,
        radius_km: params.radius,
        filters: SearchFilters {
            food_type: params.food_type,
            freshness: params.freshness,
        },
        limit: params.limit,
    };

    let donations = state.search.find_nearby(&query).await?;
    Ok(Json(NearbyResponse {
        count: donations.len(),
        donations,
    }))
}

/// POST `/donations` — donor posts surplus food.
pub async fn create_donation(
    State(state): State<AppState>,
    caller: Caller,
    payload: Result<Json<NewDonation>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    caller.require(Role::Donor)?;
    let Json(payload) = payload?;

    let donation = state
        .lifecycle
        .create_donation(caller.user_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(donation)))
}

/// GET `/donations/{id}`
pub async fn get_donation(
    State(state): State<AppState>,
    Path(donation_id): Path<i64>,
) -> Result<Json<Donation>, AppError> {
    Ok(Json(state.lifecycle.get_donation(donation_id).await?))
}

/// GET `/donors/{id}/donations` — the donor's own donations, newest first.
pub async fn list_donor_donations(
    State(state): State<AppState>,
    caller: Caller,
    Path(donor_id): Path<i64>,
) -> Result<Json<Vec<DonorDonation>>, AppError> {
    caller.require_self_or_admin(donor_id)?;
    Ok(Json(state.lifecycle.list_donations_for_donor(donor_id).await?))
}

/// POST `/donations/{id}/feedback`
pub async fn submit_feedback(
    State(state): State<AppState>,
    caller: Caller,
    Path(donation_id): Path<i64>,
    payload: Result<Json<FeedbackReq>, JsonRejection>,
) -> Result<Json<Feedback>, AppError> {
    if !caller.role.can_request_pickup() {
        return Err(AppError::forbidden("only receivers can rate donations"));
    }
    let Json(payload) = payload?;

    let feedback = state
        .feedback
        .submit_feedback(donation_id, caller.user_id, payload.rating, payload.comment)
        .await?;
    Ok(Json(feedback))
}

/// GET `/donations/{id}/feedback`
pub async fn list_feedback(
    State(state): State<AppState>,
    Path(donation_id): Path<i64>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    Ok(Json(
        state.feedback.list_feedback_for_donation(donation_id).await?,
    ))
}

/// POST `/admin/expire` — sweep overdue available donations.
pub async fn expire_overdue(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ExpireResponse>, AppError> {
    caller.require(Role::Admin)?;
    let expired = state.lifecycle.expire_overdue(Utc::now()).await?;
    Ok(Json(ExpireResponse { expired }))
}
