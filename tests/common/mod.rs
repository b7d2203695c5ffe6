#![allow(dead_code)]

use chrono::{TimeDelta, Utc};
use food_share::{
    models::{
        donation::{Donation, NewDonation},
        user::{NewUser, Role, User},
    },
    services::database::Database,
    state::AppState,
};
use sqlx::sqlite::SqliteConnectOptions;
use tempfile::TempDir;

/// Hyderabad, used as the default donation location.
pub const ORIGIN: (f64, f64) = (17.39, 78.48);

/// Helper function to create a migrated database and service state
pub async fn create_test_state() -> (TempDir, AppState) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect_with(SqliteConnectOptions::new().filename(&db_path))
        .await
        .expect("Failed to open database");
    db.migrate().await.expect("Failed to run migrations");
    (temp_dir, AppState::new(db, 10.0, 50))
}

pub async fn create_user(state: &AppState, username: &str, role: Role) -> User {
    state
        .accounts
        .register_user(NewUser {
            username: username.to_string(),
            email: format!("{username}@example.org"),
            phone: Some("+91 90000 00000".to_string()),
            role,
        })
        .await
        .expect("Failed to register user")
}

pub fn donation_at(lat: f64, lng: f64) -> NewDonation {
    NewDonation {
        food_type: "cooked".to_string(),
        description: "Vegetable biryani".to_string(),
        quantity: "20 meals".to_string(),
        freshness: "fresh".to_string(),
        latitude: lat,
        longitude: lng,
        address: Some("Banjara Hills".to_string()),
        pickup_instructions: None,
        expiry: Utc::now() + TimeDelta::hours(6),
    }
}

pub async fn post_donation(state: &AppState, donor_id: i64, lat: f64, lng: f64) -> Donation {
    state
        .lifecycle
        .create_donation(donor_id, donation_at(lat, lng))
        .await
        .expect("Failed to create donation")
}

pub fn pickup_time() -> chrono::DateTime<Utc> {
    Utc::now() + TimeDelta::hours(1)
}
