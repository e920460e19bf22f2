use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::application::ports::auth::*;
use crate::domain::errors::*;

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

fn acquisition_failed(reason: String) -> AuthError {
    AuthError::TokenAcquisitionFailed { reason }
}

/// Obtains admin tokens from `<url>/realms/<realm>/protocol/openid-connect/token`
pub struct KeycloakTokenManager {
    keycloak_url: String,
    client: reqwest::Client,
}

impl KeycloakTokenManager {
    pub fn new(keycloak_url: impl Into<String>) -> Self {
        Self::new_with_client(keycloak_url, reqwest::Client::new())
    }

    pub fn new_with_client(keycloak_url: impl Into<String>, client: reqwest::Client) -> Self {
        let keycloak_url = keycloak_url.into();
        Self {
            keycloak_url: keycloak_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn token_endpoint(&self, realm: &str) -> String {
        format!("{}/realms/{realm}/protocol/openid-connect/token", self.keycloak_url)
    }
}

#[async_trait]
impl TokenManager for KeycloakTokenManager {
    #[instrument(
        skip(self, credentials),
        fields(realm = %credentials.realm, client_id = %credentials.client_id)
    )]
    async fn acquire_token(&self, credentials: &AdminCredentials) -> Result<AuthToken, AuthError> {
        let response = self
            .client
            .post(self.token_endpoint(&credentials.realm))
            .form(&credentials.token_form())
            .send()
            .await
            .map_err(|e| acquisition_failed(format!("Token endpoint unreachable: {e}")))?;

        match response.status() {
            // Keycloak answers 400 invalid_grant for a wrong password
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => {
                return Err(AuthError::InvalidCredentials)
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(acquisition_failed(format!("Token endpoint returned {status}: {body}")));
            }
            _ => {}
        }

        let token: TokenEndpointResponse = response
            .json()
            .await
            .map_err(|e| acquisition_failed(format!("Unreadable token response: {e}")))?;

        debug!("Admin token valid for {}s", token.expires_in);
        Ok(AuthToken::new(
            token.access_token,
            token.expires_in,
            token.refresh_token,
            token.token_type,
        ))
    }
}
