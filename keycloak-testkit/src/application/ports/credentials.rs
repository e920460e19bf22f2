use crate::domain::entities::CredentialRepresentation;
use crate::domain::errors::DomainResult;
use async_trait::async_trait;

/// Read access to the credentials stored for a user
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn stored_credentials_by_type(
        &self,
        realm: &str,
        user_id: &str,
        credential_type: &str,
    ) -> DomainResult<Vec<CredentialRepresentation>>;

    /// Credential of `credential_type` with the highest priority, if the user has one
    async fn default_credential(
        &self,
        realm: &str,
        user_id: &str,
        credential_type: &str,
    ) -> DomainResult<Option<CredentialRepresentation>>;
}
