//! User profiles. Credentials live with the identity gateway.

use chrono::Utc;
use tracing::info;

use crate::models::user::{NewUser, User};

use super::{
    database::Database,
    error::{ServiceError, ServiceResult, is_unique_violation},
};

#[derive(Clone, Debug)]
pub struct AccountService {
    db: Database,
}

impl AccountService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a profile. Username and email must be unused.
    pub async fn register_user(&self, payload: NewUser) -> ServiceResult<User> {
        let username = payload.username.trim();
        if username.is_empty() {
            return Err(ServiceError::invalid("username", "must not be empty"));
        }
        let email = payload.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(ServiceError::invalid("email", "must be an email address"));
        }
        let phone = payload
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, phone, role, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, username, email, phone, role, created_at",
        )
        .bind(username)
        .bind(&email)
        .bind(phone)
        .bind(payload.role)
        .bind(Utc::now())
        .fetch_one(self.db.writer())
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::AlreadyExists(format!("user `{username}` or `{email}`"))
            } else {
                ServiceError::StorageUnavailable(err)
            }
        })?;

        info!("registered {} {} as user {}", user.role, user.username, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> ServiceResult<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, phone, role, created_at FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.db.reader())
        .await?
        .ok_or_else(|| ServiceError::not_found("user", user_id))
    }
}
