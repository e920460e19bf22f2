use crate::{application::ports::*, domain::errors::AuthError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Authenticates realm administrators calling extension endpoints with a bearer token.
///
/// The token is only read locally to find its realm and client; whether it is
/// still valid is decided by Keycloak itself through the token verifier.
pub struct RealmAdminAuthenticator {
    directory: Arc<dyn RealmDirectory>,
    verifier: Arc<dyn TokenVerifier>,
}

impl RealmAdminAuthenticator {
    pub fn new(directory: Arc<dyn RealmDirectory>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            directory,
            verifier,
        }
    }

    /// Authenticate the value of an `Authorization` header
    #[instrument(skip_all)]
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AdminAuth, AuthError> {
        let token = authorization
            .and_then(extract_bearer_token)
            .ok_or_else(|| AuthError::not_authorized("Bearer"))?;

        let claims = AccessTokenClaims::peek(token)
            .map_err(|_| AuthError::not_authorized("Bearer token format error"))?;
        let realm = claims.realm().to_string();

        if !self.directory.realm_exists(&realm).await? {
            return Err(AuthError::not_authorized("Unknown realm in token"));
        }

        let user = match self.verifier.verify(&realm, token).await? {
            Some(user) => user,
            None => {
                debug!("Token not valid");
                return Err(AuthError::not_authorized("Bearer"));
            }
        };

        let client_id = claims.azp.clone().unwrap_or_default();
        if self.directory.find_client(&realm, &client_id).await?.is_none() {
            return Err(AuthError::ClientNotFound { client_id });
        }

        debug!("authenticated admin access for: {}", user.username);
        Ok(AdminAuth {
            realm,
            user,
            client_id,
            token: token.to_string(),
        })
    }
}
