use crate::domain::errors::{ConfigError, DomainResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration port for accessing toolkit configuration
pub trait ConfigurationPort: Send + Sync {
    /// Get Keycloak server configuration
    fn get_keycloak_config(&self) -> &KeycloakConfig;

    /// Get container configuration
    fn get_container_config(&self) -> &ContainerConfig;

    /// Get browser configuration
    fn get_browser_config(&self) -> &BrowserConfig;

    /// Get logging configuration
    fn get_logging_config(&self) -> &LoggingConfig;

    /// Validate all configuration
    fn validate(&self) -> DomainResult<()>;

    /// Check if running in test mode
    fn is_test(&self) -> bool;
}

/// Keycloak server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeycloakConfig {
    pub url: String,
    pub admin_realm: String,
    pub admin_client_id: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl KeycloakConfig {
    pub fn new(
        url: impl Into<String>,
        admin_username: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            admin_realm: "master".to_string(),
            admin_client_id: "admin-cli".to_string(),
            admin_username: admin_username.into(),
            admin_password: admin_password.into(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "KEYCLOAK_URL".to_string(),
            }
            .into());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "KEYCLOAK_URL".to_string(),
                message: "Must start with http:// or https://".to_string(),
            }
            .into());
        }

        for (key, value) in [
            ("KEYCLOAK_ADMIN_USERNAME", &self.admin_username),
            ("KEYCLOAK_ADMIN_PASSWORD", &self.admin_password),
            ("KEYCLOAK_ADMIN_REALM", &self.admin_realm),
            ("KEYCLOAK_ADMIN_CLIENT_ID", &self.admin_client_id),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingRequired {
                    key: key.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    fn base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn admin_url(&self, realm: &str) -> String {
        format!("{}/admin/realms/{}", self.base(), realm)
    }

    pub fn token_url(&self, realm: &str) -> String {
        format!("{}/realms/{}/protocol/openid-connect/token", self.base(), realm)
    }
}

/// Keycloak container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub image: String,
    pub tag: String,
    pub http_port: u16,
    pub start_timeout_seconds: u64,
    pub admin_username: String,
    pub admin_password: String,
    pub env: HashMap<String, String>,
    pub start_args: Vec<String>,
    /// Provider jars, or directories holding them, installed into `providers/`
    #[serde(default)]
    pub providers: Vec<PathBuf>,
    /// Written to `conf/keycloak.conf` before the server starts
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: "quay.io/keycloak/keycloak".to_string(),
            tag: "25.0".to_string(),
            http_port: 8080,
            start_timeout_seconds: 120,
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            env: HashMap::new(),
            start_args: vec!["start-dev".to_string(), "--http-relative-path=/".to_string()],
            providers: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

impl ContainerConfig {
    pub fn validate(&self) -> DomainResult<()> {
        if self.image.is_empty() {
            return Err(ConfigError::MissingRequired {
                key: "KEYCLOAK_IMAGE".to_string(),
            }
            .into());
        }

        if self.start_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "KEYCLOAK_START_TIMEOUT_SECONDS".to_string(),
                message: "Must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    pub fn get_start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_seconds)
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_provider(mut self, path: impl Into<PathBuf>) -> Self {
        self.providers.push(path.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Browser selection for UI tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub browser: String,
    pub webdriver_url: String,
    pub ignore_patterns: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: String::new(),
            webdriver_url: "http://localhost:4444".to_string(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Resources the HtmlUnit driver does not need to fetch
pub fn default_ignore_patterns() -> Vec<String> {
    vec![
        "patternfly/dist/css".to_string(),
        "react-core/dist".to_string(),
        "keycloak.v2/public/layout.css".to_string(),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
        }
    }
}

/// Generates `as_str`, `Display` and case-insensitive `FromStr` for a
/// keyword enum. Extra spellings accepted by `from_str` follow `|`.
macro_rules! keyword_enum {
    ($name:ident, $what:literal { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(format!(concat!("Invalid ", $what, ": {}"), s)),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

keyword_enum!(LogLevel, "log level" {
    Trace => "trace",
    Debug => "debug",
    Info => "info",
    Warn => "warn" | "warning",
    Error => "error",
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
    Full,
}

keyword_enum!(LogFormat, "log format" {
    Compact => "compact",
    Pretty => "pretty",
    Json => "json",
    Full => "full",
});

/// Where the tests run; anything but development switches to test mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Ci,
}

keyword_enum!(Environment, "environment" {
    Development => "development" | "dev",
    Test => "test",
    Ci => "ci",
});

/// Complete toolkit configuration
#[derive(Debug, Clone)]
pub struct TestkitConfig {
    pub environment: Environment,
    pub keycloak: KeycloakConfig,
    pub container: ContainerConfig,
    pub browser: BrowserConfig,
    pub logging: LoggingConfig,
}

impl TestkitConfig {
    pub fn validate(&self) -> DomainResult<()> {
        self.keycloak.validate()?;
        self.container.validate()?;
        Ok(())
    }

    pub fn is_test(&self) -> bool {
        self.environment != Environment::Development
    }

    /// Load configuration from environment variables
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source (environment, map in tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment: Environment = var("ENVIRONMENT", "development")
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "ENVIRONMENT".to_string(),
                message: "Must be one of: development, test, ci".to_string(),
            })?;

        let container_defaults = ContainerConfig::default();
        let container = ContainerConfig {
            image: var("KEYCLOAK_IMAGE", &container_defaults.image),
            tag: var("KEYCLOAK_VERSION", &container_defaults.tag),
            http_port: var("KEYCLOAK_HTTP_PORT", "8080").parse().unwrap_or(8080),
            start_timeout_seconds: var("KEYCLOAK_START_TIMEOUT_SECONDS", "120")
                .parse()
                .unwrap_or(120),
            admin_username: var("KEYCLOAK_ADMIN_USERNAME", "admin"),
            admin_password: var("KEYCLOAK_ADMIN_PASSWORD", "admin"),
            env: HashMap::new(),
            start_args: lookup("KEYCLOAK_START_ARGS")
                .map(|args| args.split_whitespace().map(str::to_string).collect())
                .unwrap_or(container_defaults.start_args),
            providers: lookup("KEYCLOAK_PROVIDERS")
                .map(|paths| {
                    paths
                        .split(',')
                        .map(str::trim)
                        .filter(|path| !path.is_empty())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_default(),
            properties: BTreeMap::new(),
        };

        let keycloak = KeycloakConfig {
            url: var("KEYCLOAK_URL", "http://localhost:8080"),
            admin_realm: var("KEYCLOAK_ADMIN_REALM", "master"),
            admin_client_id: var("KEYCLOAK_ADMIN_CLIENT_ID", "admin-cli"),
            admin_username: container.admin_username.clone(),
            admin_password: container.admin_password.clone(),
        };

        let browser = BrowserConfig {
            browser: var("BROWSER", ""),
            webdriver_url: var("WEBDRIVER_URL", "http://localhost:4444"),
            ignore_patterns: lookup("BROWSER_IGNORE_PATTERNS")
                .map(|patterns| {
                    patterns
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(default_ignore_patterns),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL", "info").parse().unwrap_or(LogLevel::Info),
            format: var("LOG_FORMAT", "compact").parse().unwrap_or(LogFormat::Compact),
        };

        let config = TestkitConfig {
            environment,
            keycloak,
            container,
            browser,
            logging,
        };

        config.validate()?;
        Ok(config)
    }
}
