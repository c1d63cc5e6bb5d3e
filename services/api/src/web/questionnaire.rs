//! services/api/src/web/questionnaire.rs
//!
//! Handlers for submitting and reading the one-per-user style questionnaire.

use crate::error::ApiError;
use crate::web::middleware::AuthenticatedUser;
use crate::web::rest::SuccessResponse;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylo_core::domain::{ClosedSet, ColorPreferences, QuestionnaireAnswers, QuestionnaireProfile};
use stylo_core::ports::PortError;
use stylo_core::validation::normalize_questionnaire;
use tracing::info;
use utoipa::ToSchema;

//=========================================================================================
// Payload Structs
//=========================================================================================

/// The questionnaire as submitted by the client. Enumerated fields are normalized on save.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireRequest {
    pub user_id: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub age: String,
    #[serde(default, alias = "skinColor")]
    pub skin_tone: String,
    #[serde(default)]
    pub face_type: String,
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub hair_style: String,
    #[serde(default)]
    pub favorite_brand: String,
    #[serde(default)]
    pub nationality: String,
    /// A single color or a list of colors.
    #[serde(default, alias = "favoriteColors")]
    #[schema(value_type = Vec<String>)]
    pub color_preferences: ColorPreferences,
    #[serde(default)]
    pub favorite_accessories: String,
    #[serde(default)]
    pub favorite_style: String,
    #[serde(default)]
    pub occupation: String,
}

impl QuestionnaireRequest {
    fn into_answers(self) -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            user_id: self.user_id,
            gender: self.gender,
            age: self.age,
            skin_tone: self.skin_tone,
            face_type: self.face_type,
            body_type: self.body_type,
            hair_style: self.hair_style,
            favorite_brand: self.favorite_brand,
            nationality: self.nationality,
            color_preferences: self.color_preferences,
            favorite_accessories: self.favorite_accessories,
            favorite_style: self.favorite_style,
            occupation: self.occupation,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub user_id: String,
    pub gender: String,
    pub age: String,
    pub skin_tone: String,
    pub face_type: String,
    pub body_type: String,
    pub hair_style: String,
    pub favorite_brand: String,
    pub nationality: String,
    pub color_preferences: Vec<String>,
    pub favorite_accessories: String,
    pub favorite_style: String,
    pub occupation: String,
}

impl From<QuestionnaireProfile> for QuestionnaireResponse {
    fn from(p: QuestionnaireProfile) -> Self {
        Self {
            user_id: p.user_id,
            gender: p.gender,
            age: p.age,
            skin_tone: p.skin_tone.as_str().to_string(),
            face_type: p.face_type.as_str().to_string(),
            body_type: p.body_type.as_str().to_string(),
            hair_style: p.hair_style,
            favorite_brand: p.favorite_brand,
            nationality: p.nationality,
            color_preferences: p.color_preferences,
            favorite_accessories: p.favorite_accessories,
            favorite_style: p.favorite_style,
            occupation: p.occupation,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/questionnaire - Submit the style questionnaire (once per user).
#[utoipa::path(
    post,
    path = "/api/questionnaire",
    request_body = QuestionnaireRequest,
    responses(
        (status = 200, description = "Questionnaire saved", body = SuccessResponse),
        (status = 400, description = "Missing userId"),
        (status = 409, description = "Questionnaire already submitted for this user"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn save_questionnaire_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionnaireRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }

    let profile = normalize_questionnaire(req.into_answers());
    state
        .db
        .create_questionnaire(&profile)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => {
                ApiError::Conflict("Questionnaire already submitted for this user.".to_string())
            }
            other => ApiError::with_context("Error saving questionnaire", other),
        })?;

    info!("Saved questionnaire for user {}", profile.user_id);
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/questionnaire/{user_id} - Read the caller's own questionnaire.
#[utoipa::path(
    get,
    path = "/api/questionnaire/{user_id}",
    params(
        ("user_id" = String, Path, description = "The user whose questionnaire is requested; must be the caller.")
    ),
    responses(
        (status = 200, description = "The stored questionnaire", body = QuestionnaireResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token belongs to another user"),
        (status = 404, description = "No questionnaire submitted")
    )
)]
pub async fn get_questionnaire_handler(
    State(state): State<Arc<AppState>>,
    Extension(AuthenticatedUser(caller)): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
) -> Result<Json<QuestionnaireResponse>, ApiError> {
    if caller != user_id {
        return Err(ApiError::Forbidden("Unauthorized".to_string()));
    }

    let profile = state
        .db
        .find_questionnaire(&user_id)
        .await
        .map_err(|e| ApiError::with_context("Error fetching questionnaire", e))?
        .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    Ok(Json(profile.into()))
}
