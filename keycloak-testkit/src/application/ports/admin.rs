use crate::domain::entities::*;
use crate::domain::errors::AdminError;
use async_trait::async_trait;
use serde_json::Value;

/// Result type for admin API calls
pub type AdminResult<T> = Result<T, AdminError>;

/// Admin API port used by fixtures, event sources and the extension API.
///
/// Realms and identity providers are exchanged as raw JSON so tests can touch
/// any attribute without this crate modelling the whole representation.
#[async_trait]
pub trait KeycloakAdminPort: Send + Sync {
    // Realm operations
    async fn import_realm(&self, realm: &RealmDefinition) -> AdminResult<()>;
    async fn delete_realm(&self, realm: &str) -> AdminResult<()>;
    async fn get_realm(&self, realm: &str) -> AdminResult<Value>;
    async fn update_realm(&self, realm: &str, representation: &Value) -> AdminResult<()>;

    // User operations
    /// Exact username match
    async fn search_users(&self, realm: &str, username: &str)
        -> AdminResult<Vec<UserRepresentation>>;
    async fn get_user(&self, realm: &str, user_id: &str) -> AdminResult<UserRepresentation>;
    /// The user as seen by the holder of `bearer` instead of the toolkit's
    /// admin account. Keycloak applies that caller's permissions and fills
    /// `access` for them.
    async fn get_user_as(
        &self,
        realm: &str,
        user_id: &str,
        bearer: &str,
    ) -> AdminResult<UserRepresentation>;
    /// Returns the id of the created user
    async fn create_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<String>;
    async fn update_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<()>;
    async fn user_credentials(
        &self,
        realm: &str,
        user_id: &str,
    ) -> AdminResult<Vec<CredentialRepresentation>>;

    // Client operations
    async fn list_clients(&self, realm: &str) -> AdminResult<Vec<ClientRepresentation>>;

    // Identity providers
    async fn get_identity_provider(&self, realm: &str, alias: &str) -> AdminResult<Value>;
    async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        representation: &Value,
    ) -> AdminResult<()>;

    // Required actions
    async fn unregistered_required_actions(
        &self,
        realm: &str,
    ) -> AdminResult<Vec<RequiredActionProvider>>;
    async fn register_required_action(
        &self,
        realm: &str,
        action: &RequiredActionProvider,
    ) -> AdminResult<()>;

    // Events
    async fn events_config(&self, realm: &str) -> AdminResult<RealmEventsConfig>;
    async fn update_events_config(&self, realm: &str, config: &RealmEventsConfig)
        -> AdminResult<()>;
    async fn login_events(&self, realm: &str) -> AdminResult<Vec<LoginEvent>>;
    async fn clear_login_events(&self, realm: &str) -> AdminResult<()>;
    async fn admin_events(&self, realm: &str) -> AdminResult<Vec<AdminEvent>>;
    async fn clear_admin_events(&self, realm: &str) -> AdminResult<()>;
}
