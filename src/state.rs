use crate::{
    config::AppConfig,
    services::{
        account_service::AccountService, database::Database, feedback_service::FeedbackService,
        lifecycle_service::LifecycleManager, search_service::ProximitySearch,
    },
};

/// Shared handler state. Every service holds its own clone of the
/// [`Database`] handle; nothing else is shared between requests.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Database,
    pub search: ProximitySearch,
    pub lifecycle: LifecycleManager,
    pub accounts: AccountService,
    pub feedback: FeedbackService,
}

impl AppState {
    pub fn new(db: Database, default_radius_km: f64, max_results: usize) -> Self {
        Self {
            search: ProximitySearch::new(db.clone(), default_radius_km, max_results),
            lifecycle: LifecycleManager::new(db.clone()),
            accounts: AccountService::new(db.clone()),
            feedback: FeedbackService::new(db.clone()),
            db,
        }
    }

    pub fn from_config(db: Database, cfg: &AppConfig) -> Self {
        Self::new(db, cfg.default_radius_km, cfg.max_results)
    }
}
