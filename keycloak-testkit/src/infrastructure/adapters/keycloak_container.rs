use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use testcontainers::{
    core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, GenericImage, ImageExt,
};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::application::ports::{ContainerConfig, KeycloakConfig};
use crate::domain::errors::ContainerError;
use crate::domain::wait::{evaluate_async, WaitSpec};
use crate::infrastructure::adapters::KeycloakAdminClient;

const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(500);
const PROVIDERS_DIR: &str = "/opt/keycloak/providers";
const KEYCLOAK_CONF: &str = "/opt/keycloak/conf/keycloak.conf";

/// Running Keycloak container. Dropping the handle removes the container.
pub struct KeycloakContainer {
    _container: ContainerAsync<GenericImage>,
    host: String,
    port: u16,
    base_url: String,
    version: String,
    admin_username: String,
    admin_password: String,
}

impl KeycloakContainer {
    /// Start Keycloak and wait until the master realm answers.
    #[instrument(skip(config), fields(image = %config.image, tag = %config.tag))]
    pub async fn start(config: &ContainerConfig) -> Result<Self, ContainerError> {
        info!("Starting Keycloak container {}:{}", config.image, config.tag);

        let request = GenericImage::new(config.image.clone(), config.tag.clone())
            .with_exposed_port(config.http_port.tcp())
            .with_env_var("KEYCLOAK_ADMIN", config.admin_username.clone())
            .with_env_var("KEYCLOAK_ADMIN_PASSWORD", config.admin_password.clone())
            .with_env_var("KC_BOOTSTRAP_ADMIN_USERNAME", config.admin_username.clone())
            .with_env_var("KC_BOOTSTRAP_ADMIN_PASSWORD", config.admin_password.clone())
            .with_cmd(config.start_args.clone());
        let request = config
            .env
            .iter()
            .fold(request, |request, (key, value)| request.with_env_var(key, value));
        let request = provider_copies(&config.providers)?
            .into_iter()
            .fold(request, |request, (source, target)| {
                info!("providers> {}", target);
                request.with_copy_to(target, source)
            });
        let request = match keycloak_conf(&config.properties) {
            Some(conf) => request.with_copy_to(KEYCLOAK_CONF, conf.into_bytes()),
            None => request,
        };

        let container = request.start().await.map_err(|e| ContainerError::Start {
            message: e.to_string(),
        })?;

        let port = container
            .get_host_port_ipv4(config.http_port)
            .await
            .map_err(|e| ContainerError::Start {
                message: format!("No host port for {}: {}", config.http_port, e),
            })?;
        let host = container
            .get_host()
            .await
            .map_err(|e| ContainerError::Start {
                message: e.to_string(),
            })?
            .to_string();
        let base_url = format!("http://{}:{}", host, port);

        let timeout = config.get_start_timeout();
        if !wait_until_ready(&base_url, timeout).await {
            return Err(ContainerError::NotReady {
                millis: timeout.as_millis(),
            });
        }

        info!("Keycloak started at: {}", base_url);
        Ok(Self {
            _container: container,
            host,
            port,
            base_url,
            version: config.tag.clone(),
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Image tag the container was started from
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn admin_console_url(&self) -> String {
        format!("{}/admin", self.base_url)
    }

    pub fn realm_url(&self, realm: &str) -> String {
        format!("{}/realms/{}", self.base_url, realm)
    }

    pub fn token_endpoint_url(&self, realm: &str) -> String {
        format!("{}/realms/{}/protocol/openid-connect/token", self.base_url, realm)
    }

    /// Connection settings for the bootstrap admin of the master realm
    pub fn keycloak_config(&self) -> KeycloakConfig {
        KeycloakConfig::new(
            self.base_url.clone(),
            self.admin_username.clone(),
            self.admin_password.clone(),
        )
    }

    pub fn admin_client(&self) -> KeycloakAdminClient {
        KeycloakAdminClient::new(self.keycloak_config())
    }
}

/// Host files to copy into the image for `providers`, paired with their
/// target path. Directories contribute the jars directly inside them.
pub fn provider_copies(providers: &[PathBuf]) -> Result<Vec<(PathBuf, String)>, ContainerError> {
    let mut copies = Vec::new();
    for path in providers {
        let error = |message: String| ContainerError::Provider {
            path: path.display().to_string(),
            message,
        };

        if path.is_dir() {
            let entries = fs::read_dir(path).map_err(|e| error(e.to_string()))?;
            let mut jars = Vec::new();
            for entry in entries {
                let jar = entry.map_err(|e| error(e.to_string()))?.path();
                if jar.is_file() && jar.extension().is_some_and(|ext| ext == "jar") {
                    jars.push(jar);
                }
            }
            jars.sort();
            for jar in jars {
                let target = provider_target(&jar).ok_or_else(|| error("bad file name".into()))?;
                copies.push((jar, target));
            }
        } else if path.to_string_lossy().ends_with(".tar.gz") {
            return Err(error("extract archives before installing them".to_string()));
        } else if path.is_file() {
            let target = provider_target(path).ok_or_else(|| error("bad file name".into()))?;
            copies.push((path.clone(), target));
        } else {
            return Err(error("no such file or directory".to_string()));
        }
    }
    Ok(copies)
}

fn provider_target(file: &Path) -> Option<String> {
    let name = file.file_name()?.to_str()?;
    Some(format!("{PROVIDERS_DIR}/{name}"))
}

/// `keycloak.conf` content for `properties`, `None` when there is nothing to set
pub fn keycloak_conf(properties: &BTreeMap<String, String>) -> Option<String> {
    if properties.is_empty() {
        return None;
    }
    let mut conf = String::from("# Added by keycloak-testkit\n");
    for (key, value) in properties {
        debug!("add property> {}={}", key, value);
        conf.push_str(&format!("{key}={value}\n"));
    }
    Some(conf)
}

/// Poll `GET /realms/master/` until it answers 200 or `timeout` elapses.
/// A request that hangs is cut off when the time left runs out.
pub async fn wait_until_ready(base_url: &str, timeout: Duration) -> bool {
    let client = reqwest::Client::new();
    let url = format!("{}/realms/master/", base_url.trim_end_matches('/'));
    let spec = WaitSpec::within_every(true, timeout, READINESS_POLL_INTERVAL);
    let deadline = Instant::now().checked_add(timeout);

    evaluate_async(
        || {
            let request = client.get(&url).send();
            let budget = deadline.map_or(timeout, |d| d.saturating_duration_since(Instant::now()));
            async move {
                match tokio::time::timeout(budget, request).await {
                    Ok(Ok(response)) => response.status() == reqwest::StatusCode::OK,
                    Ok(Err(e)) => {
                        debug!("Keycloak not ready yet: {}", e);
                        false
                    }
                    Err(_) => {
                        debug!("Keycloak did not answer within {:?}", budget);
                        false
                    }
                }
            }
        },
        &spec,
    )
    .await
}
