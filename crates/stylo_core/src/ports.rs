//! crates/stylo_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: the document
//! store, the language-model gateway and the identity provider are injected
//! as trait objects so the core never touches a concrete client.

use crate::domain::{ChatTurn, NewWardrobeItem, QuestionnaireProfile, StoredMessage, WardrobeItem};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Questionnaire ---

    /// Stores the profile. Fails with `PortError::Conflict` if the user already has one.
    async fn create_questionnaire(&self, profile: &QuestionnaireProfile) -> PortResult<()>;

    async fn find_questionnaire(&self, user_id: &str) -> PortResult<Option<QuestionnaireProfile>>;

    // --- Wardrobe ---

    /// Stores the item under a freshly generated id and returns it.
    async fn add_wardrobe_item(&self, item: NewWardrobeItem) -> PortResult<WardrobeItem>;

    async fn list_wardrobe(&self, user_id: &str) -> PortResult<Vec<WardrobeItem>>;

    async fn get_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<WardrobeItem>;

    /// Removes the item if present. Deleting a missing item is not an error.
    async fn delete_wardrobe_item(&self, user_id: &str, item_id: &str) -> PortResult<()>;

    // --- Chat History ---

    /// Up to `limit` of the user's most recent messages, newest first.
    async fn recent_messages(&self, user_id: &str, limit: usize) -> PortResult<Vec<StoredMessage>>;

    /// Appends the user turn and the assistant reply as one atomic write.
    /// Both records carry `captured_at`; the user turn receives the lower ordinal.
    async fn append_exchange(
        &self,
        user_id: &str,
        user_text: &str,
        assistant_text: &str,
        captured_at: DateTime<Utc>,
    ) -> PortResult<()>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends the ordered messages to the language model and returns its reply.
    ///
    /// Never fails: transport errors, error statuses and malformed bodies are
    /// turned into a readable placeholder reply that names the failure.
    async fn complete(&self, messages: &[ChatTurn]) -> String;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Verifies a bearer token and returns the user id it was issued to.
    async fn verify_token(&self, token: &str) -> PortResult<String>;
}
