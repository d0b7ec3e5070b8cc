use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::analysis::AnalysisOrchestrator;
use crate::call::CallSessionStore;
use crate::live::LiveCall;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Session records and lifecycle state machine
    pub store: Arc<CallSessionStore>,

    /// Live buffers for active calls (session id -> buffer)
    pub live: Arc<RwLock<HashMap<Uuid, Arc<LiveCall>>>>,

    /// Analysis pipeline driver
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(store: Arc<CallSessionStore>, orchestrator: Arc<AnalysisOrchestrator>) -> Self {
        Self {
            store,
            live: Arc::new(RwLock::new(HashMap::new())),
            orchestrator,
        }
    }
}
