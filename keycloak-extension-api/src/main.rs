use keycloak_extension_api::{build_router, AppState, Config};
use keycloak_testkit::init_tracing;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.logging);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        "Using Keycloak at {} (admin realm {})",
        config.keycloak.url,
        config.admin_realm()
    );

    let app = build_router(AppState::new(config));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
