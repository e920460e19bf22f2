use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::application::ports::*;
use crate::domain::{entities::*, errors::*};
use crate::infrastructure::adapters::KeycloakTokenManager;

// Refresh the admin token when it has less than this many seconds left.
const TOKEN_REFRESH_MARGIN_SECONDS: i64 = 10;

/// Keycloak admin REST API adapter implementing the KeycloakAdminPort port
pub struct KeycloakAdminClient {
    config: KeycloakConfig,
    client: reqwest::Client,
    token_manager: Arc<dyn TokenManager>,
    token: Mutex<Option<AuthToken>>,
}

impl KeycloakAdminClient {
    pub fn new(config: KeycloakConfig) -> Self {
        let client = reqwest::Client::new();
        let token_manager = Arc::new(KeycloakTokenManager::new_with_client(
            config.url.clone(),
            client.clone(),
        ));
        Self::with_token_manager(config, client, token_manager)
    }

    pub fn with_token_manager(
        config: KeycloakConfig,
        client: reqwest::Client,
        token_manager: Arc<dyn TokenManager>,
    ) -> Self {
        Self {
            config,
            client,
            token_manager,
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &KeycloakConfig {
        &self.config
    }

    fn credentials(&self) -> AdminCredentials {
        AdminCredentials::new(
            self.config.admin_username.clone(),
            self.config.admin_password.clone(),
            self.config.admin_realm.clone(),
            self.config.admin_client_id.clone(),
        )
    }

    /// Cached admin token, renewed shortly before it expires
    async fn bearer(&self) -> AdminResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expiring_soon(TOKEN_REFRESH_MARGIN_SECONDS) {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Acquiring admin token for realm '{}'", self.config.admin_realm);
        let token = self.token_manager.acquire_token(&self.credentials()).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    fn realms_url(&self) -> String {
        format!("{}/admin/realms", self.config.url.trim_end_matches('/'))
    }

    fn realm_url(&self, realm: &str, path: &str) -> String {
        format!("{}{}", self.config.admin_url(realm), path)
    }

    async fn send(&self, request: RequestBuilder) -> AdminResult<Response> {
        let token = self.bearer().await?;
        send_with_token(request, &token).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AdminResult<T> {
        let response = self.send(self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| AdminError::InvalidResponse {
                message: format!("Failed to parse {}: {}", url, e),
            })
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &T,
    ) -> AdminResult<Response> {
        self.send(self.client.request(method, url).json(body)).await
    }

    async fn delete(&self, url: &str) -> AdminResult<()> {
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

async fn send_with_token(request: RequestBuilder, token: &str) -> AdminResult<Response> {
    let response = request.bearer_auth(token).send().await?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AdminError::NotFound {
            resource: response.url().path().to_string(),
        });
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AdminError::Http {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Id at the end of a `Location` header, as returned on resource creation
fn id_from_location(location: &str) -> Option<&str> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

#[async_trait]
impl KeycloakAdminPort for KeycloakAdminClient {
    #[instrument(skip(self, realm), fields(realm = ?realm.name()))]
    async fn import_realm(&self, realm: &RealmDefinition) -> AdminResult<()> {
        self.send_json(Method::POST, &self.realms_url(), realm.as_json())
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_realm(&self, realm: &str) -> AdminResult<()> {
        self.delete(&self.config.admin_url(realm)).await
    }

    async fn get_realm(&self, realm: &str) -> AdminResult<Value> {
        self.get_json(&self.config.admin_url(realm)).await
    }

    async fn update_realm(&self, realm: &str, representation: &Value) -> AdminResult<()> {
        self.send_json(Method::PUT, &self.config.admin_url(realm), representation)
            .await?;
        Ok(())
    }

    async fn search_users(
        &self,
        realm: &str,
        username: &str,
    ) -> AdminResult<Vec<UserRepresentation>> {
        let request = self
            .client
            .get(self.realm_url(realm, "/users"))
            .query(&[("username", username), ("exact", "true")]);
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| AdminError::InvalidResponse {
                message: format!("Failed to parse users: {}", e),
            })
    }

    async fn get_user(&self, realm: &str, user_id: &str) -> AdminResult<UserRepresentation> {
        self.get_json(&self.realm_url(realm, &format!("/users/{user_id}")))
            .await
    }

    async fn get_user_as(
        &self,
        realm: &str,
        user_id: &str,
        bearer: &str,
    ) -> AdminResult<UserRepresentation> {
        let url = self.realm_url(realm, &format!("/users/{user_id}"));
        let response = send_with_token(self.client.get(&url), bearer).await?;
        response
            .json()
            .await
            .map_err(|e| AdminError::InvalidResponse {
                message: format!("Failed to parse {}: {}", url, e),
            })
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn create_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<String> {
        let response = self
            .send_json(Method::POST, &self.realm_url(realm, "/users"), user)
            .await?;

        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AdminError::InvalidResponse {
                message: "User created without Location header".to_string(),
            })?;

        id_from_location(location)
            .map(str::to_string)
            .ok_or_else(|| AdminError::InvalidResponse {
                message: format!("Cannot read user id from Location: {location}"),
            })
    }

    async fn update_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<()> {
        let user_id = user.id.as_deref().ok_or_else(|| AdminError::InvalidResponse {
            message: format!("User '{}' has no id", user.username),
        })?;
        self.send_json(
            Method::PUT,
            &self.realm_url(realm, &format!("/users/{user_id}")),
            user,
        )
        .await?;
        Ok(())
    }

    async fn user_credentials(
        &self,
        realm: &str,
        user_id: &str,
    ) -> AdminResult<Vec<CredentialRepresentation>> {
        self.get_json(&self.realm_url(realm, &format!("/users/{user_id}/credentials")))
            .await
    }

    async fn list_clients(&self, realm: &str) -> AdminResult<Vec<ClientRepresentation>> {
        self.get_json(&self.realm_url(realm, "/clients")).await
    }

    async fn get_identity_provider(&self, realm: &str, alias: &str) -> AdminResult<Value> {
        self.get_json(&self.realm_url(realm, &format!("/identity-provider/instances/{alias}")))
            .await
    }

    async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        representation: &Value,
    ) -> AdminResult<()> {
        self.send_json(
            Method::PUT,
            &self.realm_url(realm, &format!("/identity-provider/instances/{alias}")),
            representation,
        )
        .await?;
        Ok(())
    }

    async fn unregistered_required_actions(
        &self,
        realm: &str,
    ) -> AdminResult<Vec<RequiredActionProvider>> {
        self.get_json(&self.realm_url(realm, "/authentication/unregistered-required-actions"))
            .await
    }

    async fn register_required_action(
        &self,
        realm: &str,
        action: &RequiredActionProvider,
    ) -> AdminResult<()> {
        self.send_json(
            Method::POST,
            &self.realm_url(realm, "/authentication/register-required-action"),
            action,
        )
        .await?;
        Ok(())
    }

    async fn events_config(&self, realm: &str) -> AdminResult<RealmEventsConfig> {
        self.get_json(&self.realm_url(realm, "/events/config")).await
    }

    async fn update_events_config(
        &self,
        realm: &str,
        config: &RealmEventsConfig,
    ) -> AdminResult<()> {
        self.send_json(Method::PUT, &self.realm_url(realm, "/events/config"), config)
            .await?;
        Ok(())
    }

    async fn login_events(&self, realm: &str) -> AdminResult<Vec<LoginEvent>> {
        self.get_json(&self.realm_url(realm, "/events")).await
    }

    async fn clear_login_events(&self, realm: &str) -> AdminResult<()> {
        self.delete(&self.realm_url(realm, "/events")).await
    }

    async fn admin_events(&self, realm: &str) -> AdminResult<Vec<AdminEvent>> {
        self.get_json(&self.realm_url(realm, "/admin-events")).await
    }

    async fn clear_admin_events(&self, realm: &str) -> AdminResult<()> {
        self.delete(&self.realm_url(realm, "/admin-events")).await
    }
}
