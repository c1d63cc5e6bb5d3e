//! crates/stylo_core/src/conversation.rs
//!
//! The conversation orchestrator. Each call is stateless; the history lives in
//! the store. One turn runs:
//!
//! 1. read the most recent history window (newest first) and restore chronological order,
//! 2. drop malformed records,
//! 3. load the wardrobe (as styling views) and the questionnaire profile, if any,
//! 4. prepend a system message carrying both, append the new user turn,
//! 5. ask the completion service,
//! 6. persist the user turn and the reply together, and return the trimmed reply.
//!
//! A store failure aborts the turn. Nothing already written is rolled back.

use crate::domain::{ChatTurn, StoredMessage, WardrobeItem};
use crate::ports::{CompletionService, DatabaseService, PortResult};
use crate::prompts::{build_stylist_system_prompt, build_voice_prompt};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Number of stored messages replayed to the model on each turn.
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

#[derive(Clone)]
pub struct ConversationOrchestrator {
    db: Arc<dyn DatabaseService>,
    ai: Arc<dyn CompletionService>,
    history_window: usize,
}

impl ConversationOrchestrator {
    pub fn new(db: Arc<dyn DatabaseService>, ai: Arc<dyn CompletionService>) -> Self {
        Self {
            db,
            ai,
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    pub fn with_history_window(mut self, history_window: usize) -> Self {
        self.history_window = history_window;
        self
    }

    /// Builds the ordered message list for one turn without calling the model.
    pub async fn assemble_context(&self, user_id: &str, text: &str) -> PortResult<Vec<ChatTurn>> {
        let mut history = self.db.recent_messages(user_id, self.history_window).await?;
        history.reverse();
        let history: Vec<ChatTurn> = history.iter().filter_map(StoredMessage::to_turn).collect();

        let wardrobe = self.db.list_wardrobe(user_id).await?;
        let views: Vec<_> = wardrobe.iter().map(WardrobeItem::styling_view).collect();
        let profile = self.db.find_questionnaire(user_id).await?;

        info!(
            "Assembling context for user {}: {} history turns, {} wardrobe items, profile: {}",
            user_id,
            history.len(),
            views.len(),
            profile.is_some()
        );

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatTurn::system(build_stylist_system_prompt(
            &views,
            profile.as_ref(),
        )));
        messages.extend(history);
        messages.push(ChatTurn::user(text));
        Ok(messages)
    }

    /// Runs one conversation turn and returns the assistant's reply, trimmed.
    pub async fn respond(&self, user_id: &str, text: &str) -> PortResult<String> {
        let messages = self.assemble_context(user_id, text).await?;
        let reply = self.ai.complete(&messages).await;

        self.db
            .append_exchange(user_id, text, &reply, Utc::now())
            .await?;

        Ok(reply.trim().to_string())
    }

    /// Answers without history or persistence, using the short voice persona.
    pub async fn respond_once(&self, text: &str) -> String {
        let reply = self
            .ai
            .complete(&[ChatTurn::user(build_voice_prompt(text))])
            .await;
        reply.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChatRole;
    use crate::testing::{sample_item, sample_profile, MemoryStore, ScriptedCompletion};

    fn orchestrator(store: &Arc<MemoryStore>, ai: &Arc<ScriptedCompletion>) -> ConversationOrchestrator {
        ConversationOrchestrator::new(store.clone(), ai.clone())
    }

    #[tokio::test]
    async fn first_turn_persists_user_and_assistant() {
        let store = Arc::new(MemoryStore::default());
        let ai = Arc::new(ScriptedCompletion::replying("  Try the navy blazer.\n"));

        let reply = orchestrator(&store, &ai).respond("u1", "hello").await.unwrap();
        assert_eq!(reply, "Try the navy blazer.");

        let history = store.messages_for("u1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, "assistant");
        assert_eq!(history[1].content, "  Try the navy blazer.\n");
        assert_eq!(history[0].created_at, history[1].created_at);
        assert!(history[0].id < history[1].id);

        let sent = ai.last_request();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].role, ChatRole::System);
        assert!(sent[0].content.contains("profile: null"));
        assert_eq!(sent[1], ChatTurn::user("hello"));
    }

    #[tokio::test]
    async fn window_keeps_ten_most_recent_in_order() {
        let store = Arc::new(MemoryStore::default());
        for n in 0..15 {
            let role = if n % 2 == 0 { "user" } else { "assistant" };
            store.push_raw("u1", role, &format!("m{}", n));
        }
        let ai = Arc::new(ScriptedCompletion::replying("ok"));

        orchestrator(&store, &ai).respond("u1", "next").await.unwrap();

        let sent = ai.last_request();
        let replayed: Vec<&str> = sent[1..sent.len() - 1]
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        let expected: Vec<String> = (5..15).map(|n| format!("m{}", n)).collect();
        assert_eq!(replayed, expected);
        assert_eq!(sent.last().unwrap(), &ChatTurn::user("next"));
    }

    #[tokio::test]
    async fn ties_on_timestamp_are_ordered_by_insertion() {
        let store = Arc::new(MemoryStore::default());
        let ai = Arc::new(ScriptedCompletion::replying("first answer"));
        let orchestrator = orchestrator(&store, &ai);

        orchestrator.respond("u1", "first question").await.unwrap();
        orchestrator.respond("u1", "second question").await.unwrap();

        let sent = ai.last_request();
        assert_eq!(sent[1], ChatTurn::user("first question"));
        assert_eq!(sent[2], ChatTurn::assistant("first answer"));
        assert_eq!(sent[3], ChatTurn::user("second question"));
    }

    #[tokio::test]
    async fn malformed_history_is_skipped() {
        let store = Arc::new(MemoryStore::default());
        store.push_raw("u1", "user", "kept");
        store.push_raw("u1", "", "no role");
        store.push_raw("u1", "assistant", "");
        let ai = Arc::new(ScriptedCompletion::replying("ok"));

        let messages = orchestrator(&store, &ai)
            .assemble_context("u1", "now")
            .await
            .unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1], ChatTurn::user("kept"));
    }

    #[tokio::test]
    async fn system_message_carries_wardrobe_and_profile() {
        let store = Arc::new(MemoryStore::default());
        store.insert_item(sample_item("u1"));
        store.insert_profile(sample_profile("u1"));
        let ai = Arc::new(ScriptedCompletion::replying("ok"));

        let messages = orchestrator(&store, &ai)
            .assemble_context("u1", "what should I wear?")
            .await
            .unwrap();
        let system = &messages[0].content;
        assert!(system.contains(r#""type":"shirt""#));
        assert!(!system.contains("imageUrl"));
        assert!(!system.contains("createdAt"));
        assert!(system.contains(r#""skinTone":"warm""#));
    }

    #[tokio::test]
    async fn other_users_history_is_invisible() {
        let store = Arc::new(MemoryStore::default());
        store.push_raw("u2", "user", "secret");
        let ai = Arc::new(ScriptedCompletion::replying("ok"));

        let messages = orchestrator(&store, &ai)
            .assemble_context("u1", "hi")
            .await
            .unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn store_failure_aborts_before_the_model_call() {
        let store = Arc::new(MemoryStore::default());
        store.fail_reads(true);
        let ai = Arc::new(ScriptedCompletion::replying("ok"));

        let result = orchestrator(&store, &ai).respond("u1", "hi").await;
        assert!(result.is_err());
        assert_eq!(ai.calls(), 0);
        assert!(store.messages_for("u1").is_empty());
    }

    #[tokio::test]
    async fn one_shot_reply_uses_voice_persona_and_stores_nothing() {
        let store = Arc::new(MemoryStore::default());
        let ai = Arc::new(ScriptedCompletion::replying(" sure \n"));

        let reply = orchestrator(&store, &ai).respond_once("brunch outfit?").await;
        assert_eq!(reply, "sure");

        let sent = ai.last_request();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].content.contains(r#"The user said: "brunch outfit?""#));
        assert!(store.messages_for("u1").is_empty());
    }
}
