//! services/api/src/web/wardrobe.rs
//!
//! Handlers for adding, listing, reading and deleting wardrobe items.

use crate::error::ApiError;
use crate::web::middleware::{authenticate, bearer_token};
use crate::web::rest::SuccessResponse;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stylo_core::domain::{ClosedSet, WardrobeItem, WardrobeItemDraft};
use stylo_core::ports::PortError;
use stylo_core::validation::validate_wardrobe_item;
use tracing::{debug, info};
use utoipa::ToSchema;

//=========================================================================================
// Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddWardrobeItemRequest {
    pub user_id: String,
    /// One of shirt, pants, dress, skirt, jacket, sweater, shoes, accessory (default).
    #[serde(rename = "type", default)]
    pub garment_type: String,
    #[serde(default)]
    pub color: String,
    /// One of casual (default), formal, business, party, sport, elegant.
    #[serde(default)]
    pub nature: String,
    /// Must be an absolute http(s) link.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub size: String,
}

impl From<AddWardrobeItemRequest> for WardrobeItemDraft {
    fn from(req: AddWardrobeItemRequest) -> Self {
        Self {
            user_id: req.user_id,
            garment_type: req.garment_type,
            color: req.color,
            nature: req.nature,
            image_url: req.image_url,
            material: req.material,
            brand: req.brand,
            size: req.size,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItemResponse {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub garment_type: String,
    pub color: String,
    pub nature: String,
    pub image_url: String,
    pub material: String,
    pub brand: String,
    pub size: String,
    pub created_at: DateTime<Utc>,
}

impl From<WardrobeItem> for WardrobeItemResponse {
    fn from(item: WardrobeItem) -> Self {
        Self {
            id: item.id,
            user_id: item.user_id,
            garment_type: item.garment_type.as_str().to_string(),
            color: item.color,
            nature: item.nature.as_str().to_string(),
            image_url: item.image_url,
            material: item.material,
            brand: item.brand,
            size: item.size,
            created_at: item.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct WardrobeListResponse {
    pub items: Vec<WardrobeItemResponse>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/wardrobe - Add a garment to a user's wardrobe.
#[utoipa::path(
    post,
    path = "/api/wardrobe",
    request_body = AddWardrobeItemRequest,
    responses(
        (status = 200, description = "Item stored", body = WardrobeItemResponse),
        (status = 400, description = "Missing userId or invalid image URL"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_wardrobe_item_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddWardrobeItemRequest>,
) -> Result<Json<WardrobeItemResponse>, ApiError> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    }

    let item = validate_wardrobe_item(req.into())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let stored = state
        .db
        .add_wardrobe_item(item)
        .await
        .map_err(|e| ApiError::with_context("Error adding wardrobe item", e))?;

    info!("Added wardrobe item {} for user {}", stored.id, stored.user_id);
    Ok(Json(stored.into()))
}

/// GET /api/wardrobe/{id} - List a wardrobe, or read one item of the caller's wardrobe.
///
/// The path segment is ambiguous between a user id and an item id. It is read
/// as an item id only when a valid bearer token names a caller other than `id`
/// and that caller owns an item with this id. In every other case `id` is the
/// user whose wardrobe is listed.
#[utoipa::path(
    get,
    path = "/api/wardrobe/{id}",
    params(
        ("id" = String, Path, description = "A user id (listing) or, for an authenticated caller, the id of one of their items.")
    ),
    responses(
        (status = 200, description = "The wardrobe listing, or a single `WardrobeItemResponse` for an item read", body = WardrobeListResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_wardrobe_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let caller = match bearer_token(&headers) {
        Some(_) => authenticate(&state, &headers)
            .await
            .map_err(|e| debug!("Ignoring unusable token on wardrobe read: {}", e))
            .ok(),
        None => None,
    };

    if let Some(caller) = caller.filter(|caller| *caller != id) {
        match state.db.get_wardrobe_item(&caller, &id).await {
            Ok(item) => return Ok(Json(WardrobeItemResponse::from(item)).into_response()),
            Err(PortError::NotFound(_)) => {
                debug!("No item {} for caller {}, listing wardrobe of {}", id, caller, id);
            }
            Err(other) => return Err(ApiError::with_context("Error fetching wardrobe item", other)),
        }
    }

    let items = state
        .db
        .list_wardrobe(&id)
        .await
        .map_err(|e| ApiError::with_context("Error fetching wardrobe", e))?;
    let response = WardrobeListResponse {
        items: items.into_iter().map(Into::into).collect(),
    };
    Ok(Json(response).into_response())
}

/// DELETE /api/wardrobe/{user_id}/{item_id} - Remove an item. Deleting a missing item succeeds.
#[utoipa::path(
    delete,
    path = "/api/wardrobe/{user_id}/{item_id}",
    params(
        ("user_id" = String, Path, description = "Owner of the item."),
        ("item_id" = String, Path, description = "The item to delete.")
    ),
    responses(
        (status = 200, description = "Item deleted", body = SuccessResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_wardrobe_item_handler(
    State(state): State<Arc<AppState>>,
    Path((user_id, item_id)): Path<(String, String)>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state
        .db
        .delete_wardrobe_item(&user_id, &item_id)
        .await
        .map_err(|e| ApiError::with_context("Error deleting wardrobe item", e))?;

    info!("Deleted wardrobe item {} for user {}", item_id, user_id);
    Ok(Json(SuccessResponse::ok()))
}
