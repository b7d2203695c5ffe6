//! Caller identity supplied by the upstream authentication gateway.
//!
//! The gateway verifies credentials and forwards the caller as two headers,
//! `x-user-id` and `x-user-role`. They are trusted as-is here.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{errors::AppError, models::user::Role};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Reject unless the caller has `role`.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "this action requires the {} role",
                role
            )))
        }
    }

    /// Reject unless the caller is `user_id` or an admin.
    pub fn require_self_or_admin(&self, user_id: i64) -> Result<(), AppError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::forbidden("not allowed to act for another user"))
        }
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header_value(parts, USER_ID_HEADER)?
            .parse::<i64>()
            .map_err(|_| AppError::unauthorized(format!("malformed `{}` header", USER_ID_HEADER)))?;
        let role = header_value(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(AppError::unauthorized)?;

        Ok(Caller { user_id, role })
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::unauthorized(format!("missing `{}` header", name)))
}
