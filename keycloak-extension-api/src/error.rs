use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use keycloak_testkit::domain::errors::{AdminError, AuthError, DomainError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Keycloak error: {0}")]
    Admin(#[from] AdminError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(e) => match e {
                AuthError::NotAuthorized { .. } => StatusCode::UNAUTHORIZED,
                AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
                AuthError::ClientNotFound { .. } => StatusCode::NOT_FOUND,
                // Our own admin credentials or Keycloak itself failed
                AuthError::InvalidCredentials
                | AuthError::TokenAcquisitionFailed { .. }
                | AuthError::VerificationFailed { .. } => StatusCode::BAD_GATEWAY,
            },
            AppError::Admin(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Admin(_) => StatusCode::BAD_GATEWAY,
            AppError::Domain(e) => match e {
                DomainError::UserNotFound { .. }
                | DomainError::ClientNotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
                DomainError::ExternalService { .. } | DomainError::AuthenticationFailed { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Auth(AuthError::NotAuthorized { reason }) => reason.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.message(),
        }));

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }
        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
