//! Profile registration and lookup.

use crate::{
    errors::AppError,
    models::user::{NewUser, User},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

/// POST `/users`
pub async fn register_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let user = state.accounts.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.accounts.get_user(user_id).await?))
}
