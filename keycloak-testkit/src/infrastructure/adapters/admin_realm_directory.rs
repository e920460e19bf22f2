use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::*;
use crate::domain::{entities::ClientRepresentation, errors::AuthError};

/// Realm lookups answered by the admin API
pub struct AdminRealmDirectory {
    admin: Arc<dyn KeycloakAdminPort>,
}

impl AdminRealmDirectory {
    pub fn new(admin: Arc<dyn KeycloakAdminPort>) -> Self {
        Self { admin }
    }
}

fn lookup_failed(e: impl std::fmt::Display) -> AuthError {
    AuthError::VerificationFailed {
        reason: format!("Realm lookup failed: {e}"),
    }
}

#[async_trait]
impl RealmDirectory for AdminRealmDirectory {
    async fn realm_exists(&self, realm: &str) -> Result<bool, AuthError> {
        match self.admin.get_realm(realm).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(lookup_failed(e)),
        }
    }

    async fn find_client(
        &self,
        realm: &str,
        client_id: &str,
    ) -> Result<Option<ClientRepresentation>, AuthError> {
        let clients = self.admin.list_clients(realm).await.map_err(lookup_failed)?;
        Ok(clients.into_iter().find(|c| c.client_id == client_id))
    }
}
