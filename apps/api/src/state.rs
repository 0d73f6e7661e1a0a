use std::sync::Arc;

use crate::config::Config;
use crate::matching::matcher::{JobMatcher, WeightedJobMatcher};
use crate::session::{MemorySessionStore, SessionManager, SystemClock};
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn Store>,
    /// Pluggable job matcher. Default: WeightedJobMatcher.
    pub matcher: Arc<dyn JobMatcher>,
    pub sessions: Arc<SessionManager>,
    pub config: Config,
}

impl AppState {
    /// Wires the default matcher and an in-process session manager around `store`.
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        let sessions = SessionManager::new(
            Arc::new(SystemClock),
            Arc::new(MemorySessionStore::new()),
            config.session.idle_timeout(),
            config.session.max_lifetime(),
        );
        Self {
            store,
            matcher: Arc::new(WeightedJobMatcher),
            sessions: Arc::new(sessions),
            config,
        }
    }
}
