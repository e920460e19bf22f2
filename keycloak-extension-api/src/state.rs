use crate::config::Config;
use keycloak_testkit::{
    application::{
        ports::{CredentialStore, KeycloakAdminPort, ThemeProvider, TokenVerifier},
        services::{RealmAdminAuthenticator, ThemeResolver},
    },
    infrastructure::adapters::{
        AdminCredentialStore, AdminRealmDirectory, DirectoryThemeProvider, KeycloakAdminClient,
        KeycloakTokenVerifier,
    },
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub admin: Arc<dyn KeycloakAdminPort>,
    pub authenticator: Arc<RealmAdminAuthenticator>,
    pub credentials: Arc<dyn CredentialStore>,
    pub themes: Arc<ThemeResolver>,
}

impl AppState {
    /// Wire the Keycloak adapters. No request is sent before the first API call.
    pub fn new(config: Config) -> Self {
        let admin: Arc<dyn KeycloakAdminPort> =
            Arc::new(KeycloakAdminClient::new(config.keycloak.clone()));
        let verifier: Arc<dyn TokenVerifier> =
            Arc::new(KeycloakTokenVerifier::new(config.keycloak.url.clone()));

        let providers: Vec<Arc<dyn ThemeProvider>> = config
            .themes_dir
            .iter()
            .map(|dir| Arc::new(DirectoryThemeProvider::new(dir.clone())) as Arc<dyn ThemeProvider>)
            .collect();

        Self::from_parts(config, admin, verifier, providers)
    }

    pub fn from_parts(
        config: Config,
        admin: Arc<dyn KeycloakAdminPort>,
        verifier: Arc<dyn TokenVerifier>,
        theme_providers: Vec<Arc<dyn ThemeProvider>>,
    ) -> Self {
        let authenticator = RealmAdminAuthenticator::new(
            Arc::new(AdminRealmDirectory::new(admin.clone())),
            verifier,
        );

        Self {
            config: Arc::new(config),
            credentials: Arc::new(AdminCredentialStore::new(admin.clone())),
            admin,
            authenticator: Arc::new(authenticator),
            themes: Arc::new(ThemeResolver::new(theme_providers)),
        }
    }

    pub fn admin_realm(&self) -> &str {
        self.config.admin_realm()
    }
}
