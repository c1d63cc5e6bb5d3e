//! services/api/src/web/assistant.rs
//!
//! Handlers for the language-model endpoints: outfit recommendation and the
//! conversational stylist.

use crate::error::ApiError;
use crate::web::state::AppState;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub user_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct RecommendResponse {
    pub recommendation: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRequest {
    /// Without a user the reply is one-shot: no history is read or written.
    #[serde(default)]
    pub user_id: Option<String>,
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct VoiceResponse {
    pub response: String,
}

/// POST /api/recommend - Outfit suggestions from the user's wardrobe and profile.
#[utoipa::path(
    post,
    path = "/api/recommend",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Raw recommendation text (an AI outage yields an apology text, not an error)", body = RecommendResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn recommend_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let recommendation = state
        .recommender
        .recommend(&req.user_id)
        .await
        .map_err(|e| ApiError::Internal(format!("AI recommendation failed: {}", e)))?;

    Ok(Json(RecommendResponse { recommendation }))
}

/// POST /api/voice - One conversational turn with the stylist.
#[utoipa::path(
    post,
    path = "/api/voice",
    request_body = VoiceRequest,
    responses(
        (status = 200, description = "The assistant's reply, trimmed", body = VoiceResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn voice_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoiceRequest>,
) -> Result<Json<VoiceResponse>, ApiError> {
    let user_id = req.user_id.as_deref().map(str::trim).filter(|u| !u.is_empty());

    let response = match user_id {
        Some(user_id) => state
            .conversation
            .respond(user_id, &req.text)
            .await
            .map_err(|e| ApiError::Internal(format!("AI generation failed: {}", e)))?,
        None => {
            info!("Answering anonymous voice request without history");
            state.conversation.respond_once(&req.text).await
        }
    };

    Ok(Json(VoiceResponse { response }))
}
