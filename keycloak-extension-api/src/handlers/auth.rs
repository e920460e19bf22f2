use crate::{error::AppError, state::AppState};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Authenticate the realm administrator behind the bearer token and make the
/// resulting `AdminAuth` available to handlers as an extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Skip auth for health check
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let auth = state.authenticator.authenticate(authorization).await?;
    debug!("authenticated admin access for: {}", auth.user.username);

    request.extensions_mut().insert(auth);
    Ok(next.run(request).await)
}
