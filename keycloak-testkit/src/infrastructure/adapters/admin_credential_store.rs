use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::*;
use crate::domain::{entities::CredentialRepresentation, errors::DomainResult};

/// Credential store reading user credentials through the admin API
pub struct AdminCredentialStore {
    admin: Arc<dyn KeycloakAdminPort>,
}

impl AdminCredentialStore {
    pub fn new(admin: Arc<dyn KeycloakAdminPort>) -> Self {
        Self { admin }
    }
}

#[async_trait]
impl CredentialStore for AdminCredentialStore {
    async fn stored_credentials_by_type(
        &self,
        realm: &str,
        user_id: &str,
        credential_type: &str,
    ) -> DomainResult<Vec<CredentialRepresentation>> {
        let credentials = self.admin.user_credentials(realm, user_id).await?;
        Ok(credentials
            .into_iter()
            .filter(|c| c.is_of_type(credential_type))
            .collect())
    }

    /// Lowest priority value wins, as in the account console ordering
    async fn default_credential(
        &self,
        realm: &str,
        user_id: &str,
        credential_type: &str,
    ) -> DomainResult<Option<CredentialRepresentation>> {
        let credentials = self
            .stored_credentials_by_type(realm, user_id, credential_type)
            .await?;
        Ok(credentials
            .into_iter()
            .min_by_key(|c| c.priority.unwrap_or(i64::MAX)))
    }
}
