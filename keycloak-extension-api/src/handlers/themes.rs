use crate::{
    error::{AppError, AppResult},
    handlers::require_realm,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use keycloak_testkit::{
    application::ports::AdminAuth,
    domain::entities::{RealmThemes, Theme, ThemeType},
};

/// Theme the realm uses for `theme_type`, if one of the known providers has it
pub async fn get_realm_theme(
    State(state): State<AppState>,
    Extension(auth): Extension<AdminAuth>,
    Path((realm, theme_type)): Path<(String, String)>,
) -> AppResult<Json<Theme>> {
    let theme_type: ThemeType = theme_type.parse().map_err(AppError::BadRequest)?;
    let representation = require_realm(&state, &auth, &realm).await?;

    let realm_themes = RealmThemes::from_realm(&representation);
    state
        .themes
        .find_theme(&realm_themes, theme_type)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("notFound.theme".to_string()))
}
