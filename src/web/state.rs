use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::session::SessionStore;
use crate::types::UniverseOptions;

/// Shared state for the web server.
///
/// The universe is loaded once and never written; per-user form state lives
/// in the session store.
#[derive(Clone)]
pub struct AppState {
    pub universe: Arc<UniverseOptions>,
    pub sessions: SessionStore,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(universe: UniverseOptions, sessions: SessionStore) -> Self {
        Self {
            universe: Arc::new(universe),
            sessions,
            started_at: Utc::now(),
        }
    }
}
