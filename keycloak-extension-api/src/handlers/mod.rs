pub mod auth;
pub mod authenticators;
pub mod health;
pub mod themes;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};
use keycloak_testkit::{
    application::ports::AdminAuth,
    domain::{entities::UserRepresentation, errors::AuthError},
};
use serde_json::Value;
use tracing::{info, warn};

/// Realm named in the request path, checked against the caller's rights
pub(crate) async fn require_realm(
    state: &AppState,
    auth: &AdminAuth,
    realm: &str,
) -> AppResult<Value> {
    let representation = match state.admin.get_realm(realm).await {
        Ok(representation) => representation,
        Err(e) if e.is_not_found() => {
            info!("Can't find realm {}", realm);
            return Err(AppError::NotFound("notFound.realm".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    auth.authorize_realm(realm, state.admin_realm())?;
    Ok(representation)
}

/// User named in the request path, fetched with the caller's own token so
/// that Keycloak applies the caller's user-management permissions.
pub(crate) async fn require_user(
    state: &AppState,
    auth: &AdminAuth,
    realm: &str,
    user_id: &str,
) -> AppResult<UserRepresentation> {
    let user = match state.admin.get_user_as(realm, user_id, &auth.token).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            info!("Can't find user {}", user_id);
            return Err(AppError::NotFound("notFound.user".to_string()));
        }
        Err(e) if e.is_access_denied() => {
            warn!("{} may not read user {}", auth.user.username, user_id);
            return Err(forbidden(realm));
        }
        Err(e) => return Err(e.into()),
    };

    if !user.can_manage() {
        warn!("{} may not manage user {}", auth.user.username, user_id);
        return Err(forbidden(realm));
    }
    Ok(user)
}

fn forbidden(realm: &str) -> AppError {
    AppError::Auth(AuthError::Forbidden {
        realm: realm.to_string(),
    })
}
