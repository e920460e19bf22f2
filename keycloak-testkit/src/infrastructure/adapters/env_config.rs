use crate::application::ports::{
    BrowserConfig, ConfigurationPort, ContainerConfig, KeycloakConfig, LoggingConfig,
    TestkitConfig,
};
use crate::domain::errors::DomainResult;

/// Environment-based configuration adapter
pub struct EnvConfigurationAdapter {
    config: TestkitConfig,
}

impl EnvConfigurationAdapter {
    pub fn new() -> DomainResult<Self> {
        let config = TestkitConfig::from_env()?;
        Ok(Self { config })
    }

    pub fn from_config(config: TestkitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TestkitConfig {
        &self.config
    }
}

impl ConfigurationPort for EnvConfigurationAdapter {
    fn get_keycloak_config(&self) -> &KeycloakConfig {
        &self.config.keycloak
    }

    fn get_container_config(&self) -> &ContainerConfig {
        &self.config.container
    }

    fn get_browser_config(&self) -> &BrowserConfig {
        &self.config.browser
    }

    fn get_logging_config(&self) -> &LoggingConfig {
        &self.config.logging
    }

    fn validate(&self) -> DomainResult<()> {
        self.config.validate()
    }

    fn is_test(&self) -> bool {
        self.config.is_test()
    }
}
