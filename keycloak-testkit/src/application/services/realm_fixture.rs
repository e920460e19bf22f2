use crate::{
    application::ports::*,
    application::services::EventsManager,
    domain::{
        entities::*,
        errors::{DomainError, DomainResult},
        wait::{pause_until_async, DEFAULT_POLL_INTERVAL},
    },
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Password given to users created by [`RealmFixture::create_user`] unless changed.
pub const DEFAULT_USER_PASSWORD: &str = "password+";

/// Test helpers around the Keycloak admin API.
///
/// The first realm imported becomes the default realm of the fixture.
pub struct RealmFixture {
    admin: Arc<dyn KeycloakAdminPort>,
    events: EventsManager<LoginEvent>,
    admin_events: EventsManager<AdminEvent>,
    default_realm: Option<String>,
    default_password: String,
}

impl RealmFixture {
    pub fn new(
        admin: Arc<dyn KeycloakAdminPort>,
        events: EventsManager<LoginEvent>,
        admin_events: EventsManager<AdminEvent>,
    ) -> Self {
        Self {
            admin,
            events,
            admin_events,
            default_realm: None,
            default_password: DEFAULT_USER_PASSWORD.to_string(),
        }
    }

    /// Random realm name, handy to keep concurrent tests apart
    pub fn unique_name(prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4().simple())
    }

    pub fn admin(&self) -> &Arc<dyn KeycloakAdminPort> {
        &self.admin
    }

    pub fn events(&self) -> &EventsManager<LoginEvent> {
        &self.events
    }

    pub fn admin_events(&self) -> &EventsManager<AdminEvent> {
        &self.admin_events
    }

    pub fn default_realm(&self) -> Option<&str> {
        self.default_realm.as_deref()
    }

    pub fn default_password(&self) -> &str {
        &self.default_password
    }

    pub fn set_default_password(&mut self, password: impl Into<String>) {
        self.default_password = password.into();
    }

    /// Import a realm export file, replacing any realm with the same name
    pub async fn create_realm_from_file(
        &mut self,
        path: impl AsRef<Path>,
        name: Option<&str>,
    ) -> DomainResult<String> {
        let definition = RealmDefinition::from_file(path)?;
        self.create_realm(definition, name).await
    }

    #[instrument(skip(self, definition))]
    pub async fn create_realm(
        &mut self,
        definition: RealmDefinition,
        name: Option<&str>,
    ) -> DomainResult<String> {
        let definition = match name {
            Some(name) => definition.with_name(name),
            None => definition,
        };
        let realm = definition
            .name()
            .ok_or_else(|| DomainError::Validation {
                field: "realm".to_string(),
                message: "Realm definition has no name".to_string(),
            })?
            .to_string();

        debug!("Creating realm {}", realm);
        self.events.on_realm_removed(&realm);
        self.admin_events.on_realm_removed(&realm);

        if let Err(e) = self.admin.delete_realm(&realm).await {
            if !e.is_not_found() {
                warn!("Could not remove previous realm '{}': {}", realm, e);
            }
        }

        self.admin.import_realm(&definition).await?;
        if self.default_realm.is_none() {
            self.default_realm = Some(realm.clone());
        }

        info!("Realm '{}' imported", realm);
        Ok(realm)
    }

    /// Remove a realm; `false` when Keycloak refused or the realm does not exist
    pub async fn delete_realm(&self, realm: &str) -> bool {
        debug!("Removing realm {}", realm);
        match self.admin.delete_realm(realm).await {
            Ok(()) => {
                self.events.on_realm_removed(realm);
                self.admin_events.on_realm_removed(realm);
                true
            }
            Err(e) => {
                debug!("Realm '{}' not removed: {}", realm, e);
                false
            }
        }
    }

    pub async fn update_realm(
        &self,
        realm: &str,
        updater: impl FnOnce(&mut Value),
    ) -> DomainResult<()> {
        let mut representation = self.admin.get_realm(realm).await?;
        updater(&mut representation);
        self.admin.update_realm(realm, &representation).await?;
        Ok(())
    }

    pub async fn set_browser_flow(&self, realm: &str, flow: &str) -> DomainResult<()> {
        self.update_realm(realm, |representation| {
            if let Some(fields) = representation.as_object_mut() {
                fields.insert("browserFlow".to_string(), Value::String(flow.to_string()));
            }
        })
        .await
    }

    pub async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        updater: impl FnOnce(&mut Value),
    ) -> DomainResult<()> {
        let mut representation = self.admin.get_identity_provider(realm, alias).await?;
        updater(&mut representation);
        self.admin
            .update_identity_provider(realm, alias, &representation)
            .await?;
        Ok(())
    }

    pub async fn search_users(
        &self,
        realm: &str,
        username: &str,
    ) -> DomainResult<Vec<UserRepresentation>> {
        Ok(self.admin.search_users(realm, username).await?)
    }

    pub async fn get_user_by_name(
        &self,
        realm: &str,
        username: &str,
    ) -> DomainResult<Option<UserRepresentation>> {
        Ok(self.search_users(realm, username).await?.into_iter().next())
    }

    async fn require_user(&self, realm: &str, username: &str) -> DomainResult<UserRepresentation> {
        self.get_user_by_name(realm, username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound {
                username: username.to_string(),
                realm: realm.to_string(),
            })
    }

    pub async fn get_user_attributes(
        &self,
        realm: &str,
        username: &str,
    ) -> DomainResult<HashMap<String, Vec<String>>> {
        let user = self.require_user(realm, username).await?;
        Ok(user.attributes.unwrap_or_default())
    }

    /// Values of an attribute, empty when the user does not have it
    pub async fn get_user_attribute(
        &self,
        realm: &str,
        username: &str,
        attribute: &str,
    ) -> DomainResult<Vec<String>> {
        let user = self.require_user(realm, username).await?;
        Ok(user.attribute(attribute).to_vec())
    }

    pub async fn get_user_attribute_as_string(
        &self,
        realm: &str,
        username: &str,
        attribute: &str,
    ) -> DomainResult<Option<String>> {
        let user = self.require_user(realm, username).await?;
        Ok(user.first_attribute(attribute).map(str::to_string))
    }

    /// First value parsed as an integer; 0 when absent or not a number
    pub async fn get_user_attribute_as_int(
        &self,
        realm: &str,
        username: &str,
        attribute: &str,
    ) -> DomainResult<i64> {
        let value = self
            .get_user_attribute_as_string(realm, username, attribute)
            .await?;
        Ok(value.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    pub async fn set_user_attribute(
        &self,
        realm: &str,
        username: &str,
        attribute: &str,
        values: Vec<String>,
    ) -> DomainResult<()> {
        let mut user = self.require_user(realm, username).await?;
        user.set_attribute(attribute, values);
        self.admin.update_user(realm, &user).await?;
        Ok(())
    }

    pub async fn remove_user_attribute(
        &self,
        realm: &str,
        username: &str,
        attribute: &str,
    ) -> DomainResult<()> {
        let mut user = self.require_user(realm, username).await?;
        user.remove_attribute(attribute);
        self.admin.update_user(realm, &user).await?;
        Ok(())
    }

    /// Create an enabled user with email `<username>@test.com` and the default
    /// password, customised by `updater`. Returns the new user id.
    #[instrument(skip(self, updater))]
    pub async fn create_user(
        &self,
        realm: &str,
        username: &str,
        updater: impl FnOnce(&mut UserRepresentation),
    ) -> DomainResult<String> {
        let mut user = UserRepresentation::for_test(username, &self.default_password);
        updater(&mut user);
        let id = self.admin.create_user(realm, &user).await?;
        info!("Created user '{}' ({}) in realm '{}'", username, id, realm);
        Ok(id)
    }

    pub async fn get_user_credentials(
        &self,
        realm: &str,
        username: &str,
        predicate: impl Fn(&CredentialRepresentation) -> bool,
    ) -> DomainResult<Vec<CredentialRepresentation>> {
        let user = self.require_user(realm, username).await?;
        let user_id = user.id.ok_or_else(|| DomainError::Validation {
            field: "id".to_string(),
            message: format!("User '{username}' has no id"),
        })?;
        let credentials = self.admin.user_credentials(realm, &user_id).await?;
        Ok(credentials.into_iter().filter(|c| predicate(c)).collect())
    }

    /// Register the listed required actions that the realm does not know yet
    pub async fn register_required_actions(
        &self,
        realm: &str,
        provider_ids: &[&str],
    ) -> DomainResult<()> {
        let unregistered = self.admin.unregistered_required_actions(realm).await?;
        for action in unregistered
            .iter()
            .filter(|action| provider_ids.contains(&action.provider_id.as_str()))
        {
            self.admin.register_required_action(realm, action).await?;
            debug!("Registered required action '{}'", action.provider_id);
        }
        Ok(())
    }

    pub async fn find_client_by_client_id(
        &self,
        realm: &str,
        client_id: &str,
    ) -> DomainResult<Option<ClientRepresentation>> {
        let clients = self.admin.list_clients(realm).await?;
        Ok(clients.into_iter().find(|c| c.client_id == client_id))
    }

    pub async fn find_client_by_id(
        &self,
        realm: &str,
        id: &str,
    ) -> DomainResult<Option<ClientRepresentation>> {
        let clients = self.admin.list_clients(realm).await?;
        Ok(clients.into_iter().find(|c| c.id.as_deref() == Some(id)))
    }

    /// Sleep up to `max_duration`, checking `should_stop` every 100ms.
    /// Yields to the runtime between checks, so other tasks keep running.
    pub async fn pause(&self, max_duration: Duration, should_stop: impl FnMut() -> bool) -> bool {
        self.pause_every(max_duration, DEFAULT_POLL_INTERVAL, should_stop)
            .await
    }

    pub async fn pause_every(
        &self,
        max_duration: Duration,
        interval: Duration,
        mut should_stop: impl FnMut() -> bool,
    ) -> bool {
        pause_until_async(max_duration, interval, || {
            std::future::ready(should_stop())
        })
        .await
    }
}
