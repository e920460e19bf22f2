use crate::{
    error::AppResult,
    handlers::{require_realm, require_user},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use keycloak_testkit::{
    application::{ports::AdminAuth, services::create_generic_bean},
    domain::entities::{AuthenticatorBean, DefaultCredential},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AuthenticatorQuery {
    pub selected: Option<String>,
}

/// Credentials of one type offered to a user, with the one to preselect
pub async fn get_authenticator_bean(
    State(state): State<AppState>,
    Extension(auth): Extension<AdminAuth>,
    Path((realm, user_id, credential_type)): Path<(String, String, String)>,
    Query(query): Query<AuthenticatorQuery>,
) -> AppResult<Json<AuthenticatorBean<DefaultCredential>>> {
    require_realm(&state, &auth, &realm).await?;
    require_user(&state, &auth, &realm, &user_id).await?;

    let bean = create_generic_bean(
        state.credentials.as_ref(),
        &realm,
        &user_id,
        query.selected.as_deref(),
        &credential_type,
    )
    .await?;
    Ok(Json(bean))
}
