use keycloak_testkit::application::ports::{KeycloakConfig, LogFormat, LogLevel, LoggingConfig};
use keycloak_testkit::domain::errors::ConfigError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub keycloak: KeycloakConfig,
    pub port: u16,
    /// Keycloak-style themes folder; no theme is ever found when unset
    pub themes_dir: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let admin_password = lookup("KEYCLOAK_ADMIN_PASSWORD")
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                key: "KEYCLOAK_ADMIN_PASSWORD".to_string(),
            })?;

        let mut keycloak = KeycloakConfig::new(
            var("KEYCLOAK_URL", "http://localhost:8080"),
            var("KEYCLOAK_ADMIN_USERNAME", "admin"),
            admin_password,
        );
        keycloak.admin_realm = var("ADMIN_REALM", "master");
        keycloak.admin_client_id = var("KEYCLOAK_ADMIN_CLIENT_ID", "admin-cli");

        let port = var("PORT", "3000")
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "PORT".to_string(),
                message: "Must be a port number".to_string(),
            })?;

        Ok(Self {
            keycloak,
            port,
            themes_dir: lookup("THEMES_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            logging: LoggingConfig {
                level: var("LOG_LEVEL", "info").parse().unwrap_or(LogLevel::Info),
                format: var("LOG_FORMAT", "compact")
                    .parse()
                    .unwrap_or(LogFormat::Compact),
            },
        })
    }

    pub fn admin_realm(&self) -> &str {
        &self.keycloak.admin_realm
    }
}
