//! Core data models for the food-share service.
//!
//! These entities map to database tables via `sqlx::FromRow` and serialize
//! as JSON via `serde`. Status enums and their transition tables live in
//! [`status`].

pub mod donation;
pub mod feedback;
pub mod pickup_request;
pub mod status;
pub mod user;
