//! Defines routes for donation search, posting and pickup requests.
//!
//! ## Structure
//! - **Health**
//!   - `GET  /healthz`, `GET /readyz`
//!
//! - **Donations**
//!   - `GET  /donations/nearby` — proximity search (lat, lng, radius, filters)
//!   - `POST /donations` — donor posts a donation
//!   - `GET  /donations/{id}`
//!   - `GET|POST /donations/{id}/feedback`
//!   - `GET  /donors/{id}/donations` — donor dashboard
//!
//! - **Pickup requests**
//!   - `POST /requests` — reserve a donation
//!   - `PUT  /requests/{id}/status` — accept / reject / complete
//!   - `POST /requests/{id}/cancel` — receiver withdraws
//!   - `GET  /receivers/{id}/requests` — receiver history
//!
//! - **Users / admin**
//!   - `POST /users`, `GET /users/{id}`
//!   - `POST /admin/expire` — sweep overdue donations

use crate::{
    handlers::{
        donation_handlers::{
            create_donation, expire_overdue, get_donation, list_donor_donations, list_feedback,
            search_nearby, submit_feedback,
        },
        health_handlers::{healthz, readyz},
        request_handlers::{
            cancel_request, create_request, list_receiver_requests, update_request_status,
        },
        user_handlers::{get_user, register_user},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build and return the router for all routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // donations
        .route("/donations", post(create_donation))
        .route("/donations/nearby", get(search_nearby))
        .route("/donations/{id}", get(get_donation))
        .route(
            "/donations/{id}/feedback",
            get(list_feedback).post(submit_feedback),
        )
        .route("/donors/{id}/donations", get(list_donor_donations))
        // pickup requests
        .route("/requests", post(create_request))
        .route("/requests/{id}/status", put(update_request_status))
        .route("/requests/{id}/cancel", post(cancel_request))
        .route("/receivers/{id}/requests", get(list_receiver_requests))
        // users / admin
        .route("/users", post(register_user))
        .route("/users/{id}", get(get_user))
        .route("/admin/expire", post(expire_overdue))
}

/// Routes bound to `state`, with request tracing and permissive CORS for
/// the browser dashboards.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
