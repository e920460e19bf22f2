use crate::{
    application::ports::CredentialStore,
    domain::{
        entities::{AuthenticatorBean, CredentialRepresentation, DefaultCredential},
        errors::DomainResult,
    },
};
use tracing::{debug, instrument};

impl<T> AuthenticatorBean<T> {
    /// Build the bean for the credentials of one type stored for a user.
    ///
    /// When the user has not picked a credential yet (`selected` blank), the
    /// store's default credential is selected.
    #[instrument(skip(store, converter))]
    pub async fn from_store(
        store: &dyn CredentialStore,
        realm: &str,
        user_id: &str,
        selected: Option<&str>,
        credential_type: &str,
        converter: impl Fn(&CredentialRepresentation) -> T,
    ) -> DomainResult<Self> {
        let user_credentials = store
            .stored_credentials_by_type(realm, user_id, credential_type)
            .await?
            .iter()
            .map(converter)
            .collect();

        let selected_credential_id = match selected.filter(|s| !s.is_empty()) {
            Some(selected) => Some(selected.to_string()),
            None => {
                let default = store
                    .default_credential(realm, user_id, credential_type)
                    .await?;
                debug!(
                    "No credential selected, using default {:?}",
                    default.as_ref().map(|c| &c.id)
                );
                default.and_then(|credential| credential.id)
            }
        };

        Ok(Self::new(selected_credential_id, user_credentials))
    }
}

/// Bean exposing the id and label of each credential
pub async fn create_generic_bean(
    store: &dyn CredentialStore,
    realm: &str,
    user_id: &str,
    selected: Option<&str>,
    credential_type: &str,
) -> DomainResult<AuthenticatorBean<DefaultCredential>> {
    AuthenticatorBean::from_store(
        store,
        realm,
        user_id,
        selected,
        credential_type,
        |credential: &CredentialRepresentation| DefaultCredential::from(credential),
    )
    .await
}
