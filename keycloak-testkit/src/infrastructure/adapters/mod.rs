pub mod admin_credential_store;
pub mod admin_event_sources;
pub mod admin_realm_directory;
pub mod directory_theme_provider;
pub mod env_config;
pub mod http_test_server;
pub mod keycloak_admin_client;
pub mod keycloak_container;
pub mod keycloak_token_manager;
pub mod keycloak_token_verifier;
pub mod logging;
pub mod web_driver;

pub use admin_credential_store::*;
pub use admin_event_sources::*;
pub use admin_realm_directory::*;
pub use directory_theme_provider::*;
pub use env_config::*;
pub use http_test_server::*;
pub use keycloak_admin_client::*;
pub use keycloak_container::*;
pub use keycloak_token_manager::*;
pub use keycloak_token_verifier::*;
pub use logging::*;
pub use web_driver::*;
