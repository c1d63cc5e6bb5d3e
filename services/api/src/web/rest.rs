//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the shared
//! response payloads and the root status endpoint.

use crate::web::{assistant, questionnaire, wardrobe};
use axum::response::Json;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        questionnaire::save_questionnaire_handler,
        questionnaire::get_questionnaire_handler,
        wardrobe::add_wardrobe_item_handler,
        wardrobe::get_wardrobe_handler,
        wardrobe::delete_wardrobe_item_handler,
        assistant::recommend_handler,
        assistant::voice_handler,
    ),
    components(
        schemas(
            StatusResponse,
            SuccessResponse,
            questionnaire::QuestionnaireRequest,
            questionnaire::QuestionnaireResponse,
            wardrobe::AddWardrobeItemRequest,
            wardrobe::WardrobeItemResponse,
            wardrobe::WardrobeListResponse,
            assistant::RecommendRequest,
            assistant::RecommendResponse,
            assistant::VoiceRequest,
            assistant::VoiceResponse,
        )
    ),
    tags(
        (name = "Stylo API", description = "Wardrobe, style questionnaire and AI stylist endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Response Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
}

/// GET / - Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "The service is up", body = StatusResponse)
    )
)]
pub async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Stylo AI backend is running".to_string(),
        status: "ok".to_string(),
    })
}
