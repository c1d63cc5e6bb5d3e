//! services/api/src/adapters/identity.rs
//!
//! Verifies client ID tokens against the identity provider's account lookup
//! endpoint. Implements the `IdentityService` port from the `core` crate.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use stylo_core::ports::{IdentityService, PortError, PortResult};
use tracing::warn;

const LOOKUP_URL: &str = "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

/// An adapter that implements `IdentityService` using the Firebase account lookup API.
#[derive(Clone)]
pub struct FirebaseIdentityAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    lookup_url: String,
}

impl FirebaseIdentityAdapter {
    /// Without an API key every token is rejected.
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            lookup_url: LOOKUP_URL.to_string(),
        }
    }

    pub fn with_lookup_url(mut self, lookup_url: impl Into<String>) -> Self {
        self.lookup_url = lookup_url.into();
        self
    }
}

#[async_trait]
impl IdentityService for FirebaseIdentityAdapter {
    async fn verify_token(&self, token: &str) -> PortResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PortError::Unauthorized("identity verification is not configured".to_string())
        })?;

        let response = self
            .http
            .post(&self.lookup_url)
            .query(&[("key", api_key)])
            .json(&json!({ "idToken": token }))
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Token lookup rejected with status {}: {}", status, body);
            return Err(PortError::Unauthorized(format!("token rejected ({})", status)));
        }

        let lookup: LookupResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        lookup
            .users
            .into_iter()
            .next()
            .map(|u| u.local_id)
            .ok_or_else(|| PortError::Unauthorized("token does not belong to any user".to_string()))
    }
}
