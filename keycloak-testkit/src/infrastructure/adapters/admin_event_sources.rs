use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::application::ports::*;
use crate::domain::entities::{AdminEvent, LoginEvent, RealmEventsConfig};

/// Read the realm's event settings, apply `enable` and `configure`, and write
/// them back when anything changed.
async fn update_events_config(
    admin: &dyn KeycloakAdminPort,
    realm: &str,
    enable: impl FnOnce(&mut RealmEventsConfig) -> bool + Send,
    configure: Option<&EventsConfigurer>,
) -> AdminResult<()> {
    let mut config = admin.events_config(realm).await?;
    let mut changed = enable(&mut config);
    if let Some(configure) = configure {
        configure(&mut config);
        changed = true;
    }
    if changed {
        admin.update_events_config(realm, &config).await?;
        info!("Updated events configuration of realm '{}'", realm);
    }
    Ok(())
}

/// User events (`/events`) of a realm
pub struct LoginEventSource {
    admin: Arc<dyn KeycloakAdminPort>,
}

impl LoginEventSource {
    pub fn new(admin: Arc<dyn KeycloakAdminPort>) -> Self {
        Self { admin }
    }
}

#[async_trait]
impl EventSource for LoginEventSource {
    type Event = LoginEvent;

    async fn enable(&self, realm: &str, configure: Option<&EventsConfigurer>) -> AdminResult<()> {
        update_events_config(
            self.admin.as_ref(),
            realm,
            |config| !std::mem::replace(&mut config.events_enabled, true),
            configure,
        )
        .await
    }

    async fn clear(&self, realm: &str) -> AdminResult<()> {
        self.admin.clear_login_events(realm).await
    }

    async fn fetch(&self, realm: &str) -> AdminResult<Vec<LoginEvent>> {
        self.admin.login_events(realm).await
    }
}

/// Admin events (`/admin-events`) of a realm
pub struct AdminEventSource {
    admin: Arc<dyn KeycloakAdminPort>,
}

impl AdminEventSource {
    pub fn new(admin: Arc<dyn KeycloakAdminPort>) -> Self {
        Self { admin }
    }
}

#[async_trait]
impl EventSource for AdminEventSource {
    type Event = AdminEvent;

    async fn enable(&self, realm: &str, configure: Option<&EventsConfigurer>) -> AdminResult<()> {
        update_events_config(
            self.admin.as_ref(),
            realm,
            |config| config.admin_events_enabled.replace(true) != Some(true),
            configure,
        )
        .await
    }

    async fn clear(&self, realm: &str) -> AdminResult<()> {
        self.admin.clear_admin_events(realm).await
    }

    async fn fetch(&self, realm: &str) -> AdminResult<Vec<AdminEvent>> {
        self.admin.admin_events(realm).await
    }
}
