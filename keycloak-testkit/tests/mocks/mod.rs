#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use keycloak_testkit::{
    application::ports::{
        AdminResult, KeycloakAdminPort, ThemeProvider, TokenVerifier, VerifiedUser,
    },
    domain::{
        entities::*,
        errors::{AdminError, AuthError, DomainResult},
    },
};

/// In-memory Keycloak admin API
pub struct MockKeycloakAdmin {
    pub realms: Arc<Mutex<HashMap<String, Value>>>,
    pub users: Arc<Mutex<HashMap<String, Vec<UserRepresentation>>>>, // realm -> users
    // user id -> credentials
    pub credentials: Arc<Mutex<HashMap<String, Vec<CredentialRepresentation>>>>,
    pub clients: Arc<Mutex<HashMap<String, Vec<ClientRepresentation>>>>, // realm -> clients
    pub identity_providers: Arc<Mutex<HashMap<(String, String), Value>>>,
    pub unregistered_actions: Arc<Mutex<Vec<RequiredActionProvider>>>,
    pub registered_actions: Arc<Mutex<Vec<String>>>,
    pub events_configs: Arc<Mutex<HashMap<String, RealmEventsConfig>>>,
    pub login_events: Arc<Mutex<HashMap<String, Vec<LoginEvent>>>>,
    pub admin_events: Arc<Mutex<HashMap<String, Vec<AdminEvent>>>>,
    pub config_updates: Arc<Mutex<u32>>,
    pub user_counter: Arc<Mutex<u32>>,
    pub should_fail: Arc<Mutex<bool>>, // For testing error scenarios
}

impl MockKeycloakAdmin {
    pub fn new() -> Self {
        let mut realms = HashMap::new();
        // Add default master realm
        realms.insert("master".to_string(), json!({ "realm": "master", "enabled": true }));

        Self {
            realms: Arc::new(Mutex::new(realms)),
            users: Arc::new(Mutex::new(HashMap::new())),
            credentials: Arc::new(Mutex::new(HashMap::new())),
            clients: Arc::new(Mutex::new(HashMap::new())),
            identity_providers: Arc::new(Mutex::new(HashMap::new())),
            unregistered_actions: Arc::new(Mutex::new(Vec::new())),
            registered_actions: Arc::new(Mutex::new(Vec::new())),
            events_configs: Arc::new(Mutex::new(HashMap::new())),
            login_events: Arc::new(Mutex::new(HashMap::new())),
            admin_events: Arc::new(Mutex::new(HashMap::new())),
            config_updates: Arc::new(Mutex::new(0)),
            user_counter: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    fn check_should_fail(&self) -> AdminResult<()> {
        if *self.should_fail.lock().unwrap() {
            Err(AdminError::Http {
                status: 500,
                body: "Mock failure enabled".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn require_realm(&self, realm: &str) -> AdminResult<()> {
        if self.realms.lock().unwrap().contains_key(realm) {
            Ok(())
        } else {
            Err(AdminError::NotFound {
                resource: format!("realm {realm}"),
            })
        }
    }

    pub fn add_realm(&self, realm: &str) {
        self.realms
            .lock()
            .unwrap()
            .insert(realm.to_string(), json!({ "realm": realm, "enabled": true }));
    }

    pub fn add_client(&self, realm: &str, id: &str, client_id: &str) {
        self.clients
            .lock()
            .unwrap()
            .entry(realm.to_string())
            .or_default()
            .push(ClientRepresentation {
                id: Some(id.to_string()),
                client_id: client_id.to_string(),
                ..ClientRepresentation::default()
            });
    }

    pub fn add_credential(&self, user_id: &str, credential: CredentialRepresentation) {
        self.credentials
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(credential);
    }

    pub fn add_identity_provider(&self, realm: &str, alias: &str, representation: Value) {
        self.identity_providers
            .lock()
            .unwrap()
            .insert((realm.to_string(), alias.to_string()), representation);
    }

    pub fn push_login_event(&self, realm: &str, time: i64, event_type: &str) {
        self.login_events
            .lock()
            .unwrap()
            .entry(realm.to_string())
            .or_default()
            .push(LoginEvent {
                time,
                type_: Some(event_type.to_string()),
                realm_id: Some(realm.to_string()),
                ..LoginEvent::default()
            });
    }

    pub fn push_admin_event(&self, realm: &str, time: i64, operation: &str) {
        self.admin_events
            .lock()
            .unwrap()
            .entry(realm.to_string())
            .or_default()
            .push(AdminEvent {
                time,
                operation_type: Some(operation.to_string()),
                realm_id: Some(realm.to_string()),
                ..AdminEvent::default()
            });
    }

    pub fn user(&self, realm: &str, username: &str) -> Option<UserRepresentation> {
        self.users
            .lock()
            .unwrap()
            .get(realm)
            .and_then(|users| users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl KeycloakAdminPort for MockKeycloakAdmin {
    async fn import_realm(&self, realm: &RealmDefinition) -> AdminResult<()> {
        self.check_should_fail()?;
        let name = realm.name().unwrap_or_default().to_string();
        let mut realms = self.realms.lock().unwrap();
        if realms.contains_key(&name) {
            return Err(AdminError::Http {
                status: 409,
                body: format!("Realm {name} already exists"),
            });
        }
        realms.insert(name, realm.as_json().clone());
        Ok(())
    }

    async fn delete_realm(&self, realm: &str) -> AdminResult<()> {
        self.check_should_fail()?;
        match self.realms.lock().unwrap().remove(realm) {
            Some(_) => {
                self.users.lock().unwrap().remove(realm);
                Ok(())
            }
            None => Err(AdminError::NotFound {
                resource: format!("realm {realm}"),
            }),
        }
    }

    async fn get_realm(&self, realm: &str) -> AdminResult<Value> {
        self.check_should_fail()?;
        self.realms
            .lock()
            .unwrap()
            .get(realm)
            .cloned()
            .ok_or_else(|| AdminError::NotFound {
                resource: format!("realm {realm}"),
            })
    }

    async fn update_realm(&self, realm: &str, representation: &Value) -> AdminResult<()> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        self.realms
            .lock()
            .unwrap()
            .insert(realm.to_string(), representation.clone());
        Ok(())
    }

    async fn search_users(
        &self,
        realm: &str,
        username: &str,
    ) -> AdminResult<Vec<UserRepresentation>> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        Ok(self.user(realm, username).into_iter().collect())
    }

    async fn get_user(&self, realm: &str, user_id: &str) -> AdminResult<UserRepresentation> {
        self.check_should_fail()?;
        self.users
            .lock()
            .unwrap()
            .get(realm)
            .and_then(|users| users.iter().find(|u| u.id.as_deref() == Some(user_id)).cloned())
            .ok_or_else(|| AdminError::NotFound {
                resource: format!("user {user_id}"),
            })
    }

    async fn get_user_as(
        &self,
        realm: &str,
        user_id: &str,
        _bearer: &str,
    ) -> AdminResult<UserRepresentation> {
        self.get_user(realm, user_id).await
    }

    async fn create_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<String> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        if self.user(realm, &user.username).is_some() {
            return Err(AdminError::Http {
                status: 409,
                body: "User exists with same username".to_string(),
            });
        }

        let id = {
            let mut counter = self.user_counter.lock().unwrap();
            *counter += 1;
            format!("user-{}", counter)
        };

        let mut stored = user.clone();
        stored.id = Some(id.clone());
        if let Some(credentials) = stored.credentials.take() {
            for (index, mut credential) in credentials.into_iter().enumerate() {
                credential.id = Some(format!("{id}-cred-{index}"));
                credential.value = None;
                self.add_credential(&id, credential);
            }
        }
        self.users
            .lock()
            .unwrap()
            .entry(realm.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn update_user(&self, realm: &str, user: &UserRepresentation) -> AdminResult<()> {
        self.check_should_fail()?;
        let mut users = self.users.lock().unwrap();
        let existing = users
            .get_mut(realm)
            .and_then(|users| users.iter_mut().find(|u| u.id == user.id))
            .ok_or_else(|| AdminError::NotFound {
                resource: format!("user {}", user.username),
            })?;
        *existing = user.clone();
        Ok(())
    }

    async fn user_credentials(
        &self,
        _realm: &str,
        user_id: &str,
    ) -> AdminResult<Vec<CredentialRepresentation>> {
        self.check_should_fail()?;
        Ok(self
            .credentials
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_clients(&self, realm: &str) -> AdminResult<Vec<ClientRepresentation>> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        Ok(self
            .clients
            .lock()
            .unwrap()
            .get(realm)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_identity_provider(&self, realm: &str, alias: &str) -> AdminResult<Value> {
        self.check_should_fail()?;
        self.identity_providers
            .lock()
            .unwrap()
            .get(&(realm.to_string(), alias.to_string()))
            .cloned()
            .ok_or_else(|| AdminError::NotFound {
                resource: format!("identity provider {alias}"),
            })
    }

    async fn update_identity_provider(
        &self,
        realm: &str,
        alias: &str,
        representation: &Value,
    ) -> AdminResult<()> {
        self.check_should_fail()?;
        self.add_identity_provider(realm, alias, representation.clone());
        Ok(())
    }

    async fn unregistered_required_actions(
        &self,
        _realm: &str,
    ) -> AdminResult<Vec<RequiredActionProvider>> {
        self.check_should_fail()?;
        Ok(self.unregistered_actions.lock().unwrap().clone())
    }

    async fn register_required_action(
        &self,
        _realm: &str,
        action: &RequiredActionProvider,
    ) -> AdminResult<()> {
        self.check_should_fail()?;
        self.unregistered_actions
            .lock()
            .unwrap()
            .retain(|a| a.provider_id != action.provider_id);
        self.registered_actions
            .lock()
            .unwrap()
            .push(action.provider_id.clone());
        Ok(())
    }

    async fn events_config(&self, realm: &str) -> AdminResult<RealmEventsConfig> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        Ok(self
            .events_configs
            .lock()
            .unwrap()
            .get(realm)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_events_config(
        &self,
        realm: &str,
        config: &RealmEventsConfig,
    ) -> AdminResult<()> {
        self.check_should_fail()?;
        self.require_realm(realm)?;
        *self.config_updates.lock().unwrap() += 1;
        self.events_configs
            .lock()
            .unwrap()
            .insert(realm.to_string(), config.clone());
        Ok(())
    }

    async fn login_events(&self, realm: &str) -> AdminResult<Vec<LoginEvent>> {
        self.check_should_fail()?;
        // Keycloak lists the most recent event first
        let mut events = self
            .login_events
            .lock()
            .unwrap()
            .get(realm)
            .cloned()
            .unwrap_or_default();
        events.reverse();
        Ok(events)
    }

    async fn clear_login_events(&self, realm: &str) -> AdminResult<()> {
        self.check_should_fail()?;
        self.login_events.lock().unwrap().remove(realm);
        Ok(())
    }

    async fn admin_events(&self, realm: &str) -> AdminResult<Vec<AdminEvent>> {
        self.check_should_fail()?;
        let mut events = self
            .admin_events
            .lock()
            .unwrap()
            .get(realm)
            .cloned()
            .unwrap_or_default();
        events.reverse();
        Ok(events)
    }

    async fn clear_admin_events(&self, realm: &str) -> AdminResult<()> {
        self.check_should_fail()?;
        self.admin_events.lock().unwrap().remove(realm);
        Ok(())
    }
}

/// Token verifier accepting a fixed set of tokens
pub struct MockTokenVerifier {
    pub accepted: Arc<Mutex<HashMap<String, VerifiedUser>>>,
    pub calls: Arc<Mutex<u32>>,
}

impl MockTokenVerifier {
    pub fn new() -> Self {
        Self {
            accepted: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn accept(&self, token: &str, id: &str, username: &str) {
        self.accepted.lock().unwrap().insert(
            token.to_string(),
            VerifiedUser {
                id: id.to_string(),
                username: username.to_string(),
            },
        );
    }
}

#[async_trait]
impl TokenVerifier for MockTokenVerifier {
    async fn verify(&self, _realm: &str, token: &str) -> Result<Option<VerifiedUser>, AuthError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.accepted.lock().unwrap().get(token).cloned())
    }
}

/// Theme provider knowing a fixed set of themes
pub struct MockThemeProvider {
    pub themes: HashSet<(String, ThemeType)>,
}

impl MockThemeProvider {
    pub fn with_themes(themes: &[(&str, ThemeType)]) -> Self {
        Self {
            themes: themes
                .iter()
                .map(|(name, theme_type)| (name.to_string(), *theme_type))
                .collect(),
        }
    }
}

impl ThemeProvider for MockThemeProvider {
    fn has_theme(&self, name: &str, theme_type: ThemeType) -> bool {
        self.themes.contains(&(name.to_string(), theme_type))
    }

    fn get_theme(&self, name: &str, theme_type: ThemeType) -> DomainResult<Option<Theme>> {
        Ok(self.has_theme(name, theme_type).then(|| Theme {
            name: name.to_string(),
            theme_type,
        }))
    }
}

/// Unsigned JWT carrying the given claims; only the payload is ever read.
pub fn unsigned_token(claims: &Value) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    encode(&Header::default(), claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}
