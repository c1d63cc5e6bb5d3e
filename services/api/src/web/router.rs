//! services/api/src/web/router.rs
//!
//! Assembles the complete HTTP application: public and protected routes,
//! CORS, request tracing and the Swagger UI.

use crate::web::{
    assistant::{recommend_handler, voice_handler},
    middleware::require_auth,
    questionnaire::{get_questionnaire_handler, save_questionnaire_handler},
    rest::{root_handler, ApiDoc},
    state::AppState,
    wardrobe::{add_wardrobe_item_handler, delete_wardrobe_item_handler, get_wardrobe_handler},
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// CORS restricted to the configured origins. Unparseable origins are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);

    // Public routes (no auth enforced)
    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/api/questionnaire", post(save_questionnaire_handler))
        .route("/api/wardrobe", post(add_wardrobe_item_handler))
        .route("/api/wardrobe/{id}", get(get_wardrobe_handler))
        .route(
            "/api/wardrobe/{user_id}/{item_id}",
            delete(delete_wardrobe_item_handler),
        )
        .route("/api/recommend", post(recommend_handler))
        .route("/api/voice", post(voice_handler));

    // Protected routes (bearer token required)
    let protected_routes = Router::new()
        .route("/api/questionnaire/{user_id}", get(get_questionnaire_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
