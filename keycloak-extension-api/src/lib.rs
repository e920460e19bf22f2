//! Realm-admin REST endpoints mounted next to a Keycloak server.
//!
//! Every route except `/health` requires a bearer token issued by Keycloak to
//! a realm administrator. Administrators of the admin realm may address every
//! realm, all others only their own.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

use axum::{
    http::{header, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/realms/:realm/api/users/:user_id/authenticators/:credential_type",
            get(handlers::authenticators::get_authenticator_bean),
        )
        .route(
            "/realms/:realm/api/themes/:theme_type",
            get(handlers::themes::get_realm_theme),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::auth::auth_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
