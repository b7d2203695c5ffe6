//! HTTP handlers. Each one decodes a typed payload, checks the caller and
//! delegates to a service.

pub mod donation_handlers;
pub mod health_handlers;
pub mod identity;
pub mod request_handlers;
pub mod user_handlers;
