//! Food donation matching service.
//!
//! Donors post surplus food; receivers and NGOs find nearby donations and
//! reserve them for pickup. [`services::search_service`] answers proximity
//! queries and [`services::lifecycle_service`] owns every status change.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
