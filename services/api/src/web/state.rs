//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use stylo_core::ports::{CompletionService, DatabaseService, IdentityService};
use stylo_core::{ConversationOrchestrator, RecommendationService};

/// The shared application state, created once at startup and passed to all handlers.
///
/// Every external client is injected here; handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityService>,
    pub conversation: ConversationOrchestrator,
    pub recommender: RecommendationService,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        ai: Arc<dyn CompletionService>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        let conversation = ConversationOrchestrator::new(db.clone(), ai.clone())
            .with_history_window(config.chat_history_limit);
        let recommender = RecommendationService::new(db.clone(), ai);
        Self {
            db,
            config,
            identity,
            conversation,
            recommender,
        }
    }
}
