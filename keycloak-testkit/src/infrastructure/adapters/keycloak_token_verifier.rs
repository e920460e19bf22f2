use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::ports::auth::*;
use crate::domain::errors::AuthError;

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    preferred_username: Option<String>,
}

/// Verifies bearer tokens by presenting them to the realm's userinfo endpoint
pub struct KeycloakTokenVerifier {
    keycloak_url: String,
    client: reqwest::Client,
}

impl KeycloakTokenVerifier {
    pub fn new(keycloak_url: impl Into<String>) -> Self {
        Self::new_with_client(keycloak_url, reqwest::Client::new())
    }

    pub fn new_with_client(keycloak_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            keycloak_url: keycloak_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl TokenVerifier for KeycloakTokenVerifier {
    #[instrument(skip(self, token))]
    async fn verify(&self, realm: &str, token: &str) -> Result<Option<VerifiedUser>, AuthError> {
        let url = format!(
            "{}/realms/{}/protocol/openid-connect/userinfo",
            self.keycloak_url, realm
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::VerificationFailed {
                reason: format!("HTTP request failed: {}", e),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            debug!("Keycloak rejected token with {}", status);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::VerificationFailed {
                reason: format!("HTTP error: {}", status),
            });
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::VerificationFailed {
                reason: format!("Failed to parse userinfo: {}", e),
            })?;

        Ok(Some(VerifiedUser {
            username: info.preferred_username.unwrap_or_else(|| info.sub.clone()),
            id: info.sub,
        }))
    }
}
