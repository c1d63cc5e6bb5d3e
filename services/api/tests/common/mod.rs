//! Shared fixtures for the HTTP integration tests: in-memory ports and a router builder.

#![allow(dead_code)]

use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use stylo_core::ports::{IdentityService, PortError, PortResult};
use stylo_core::testing::{MemoryStore, ScriptedCompletion};

const BODY_LIMIT: usize = 1_048_576;

/// Accepts exactly one real token.
pub struct StaticIdentity {
    pub token: String,
    pub user_id: String,
}

#[async_trait]
impl IdentityService for StaticIdentity {
    async fn verify_token(&self, token: &str) -> PortResult<String> {
        if token == self.token {
            Ok(self.user_id.clone())
        } else {
            Err(PortError::Unauthorized("unknown token".to_string()))
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub ai: Arc<ScriptedCompletion>,
}

pub fn test_app(ai_reply: &str) -> TestApp {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused".to_string()),
        "ALLOW_MOCK_TOKENS" => Some("true".to_string()),
        _ => None,
    })
    .expect("test config");

    let store = Arc::new(MemoryStore::default());
    let ai = Arc::new(ScriptedCompletion::replying(ai_reply));
    let identity = Arc::new(StaticIdentity {
        token: "real-token-for-u9".to_string(),
        user_id: "u9".to_string(),
    });

    let state = AppState::new(Arc::new(config), store.clone(), ai.clone(), identity);
    TestApp {
        router: build_router(Arc::new(state)),
        store,
        ai,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("build request")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("build request")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}
