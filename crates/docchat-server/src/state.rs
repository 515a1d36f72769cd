use docchat::agent::Agent;
use docchat::tool::ChatbotDeps;
use docchat::translate::HistoryTranslator;
use std::sync::Arc;

use crate::store::SqliteStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: SqliteStore,
    pub agent: Arc<Agent>,
    pub deps: ChatbotDeps,
    pub translator: HistoryTranslator,
}

impl AppState {
    pub fn new(store: SqliteStore, agent: Agent, deps: ChatbotDeps) -> Self {
        Self {
            store,
            agent: Arc::new(agent),
            deps,
            translator: HistoryTranslator::new(),
        }
    }
}
