//! crates/stylo_core/src/recommendation.rs
//!
//! One-shot outfit recommendation over the user's wardrobe and profile.
//! Nothing is persisted; the model's raw text is returned trimmed.

use crate::domain::ChatTurn;
use crate::ports::{CompletionService, DatabaseService, PortResult};
use crate::prompts::build_recommendation_prompt;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct RecommendationService {
    db: Arc<dyn DatabaseService>,
    ai: Arc<dyn CompletionService>,
}

impl RecommendationService {
    pub fn new(db: Arc<dyn DatabaseService>, ai: Arc<dyn CompletionService>) -> Self {
        Self { db, ai }
    }

    pub async fn recommend(&self, user_id: &str) -> PortResult<String> {
        let wardrobe = self.db.list_wardrobe(user_id).await?;
        let profile = self.db.find_questionnaire(user_id).await?;
        info!(
            "Recommending outfits for user {} from {} wardrobe items",
            user_id,
            wardrobe.len()
        );

        let prompt = build_recommendation_prompt(profile.as_ref(), &wardrobe);
        let reply = self.ai.complete(&[ChatTurn::user(prompt)]).await;
        Ok(reply.trim().to_string())
    }
}
