/*!
# Keycloak Testkit

Building blocks for integration tests against a Keycloak server, laid out
with hexagonal architecture principles.

This crate provides:
- A polling condition evaluator (`domain::wait`) used everywhere a test waits
  for Keycloak to reach some state
- Port definitions for the admin API, token handling, events, credentials and themes
- Application services: realm fixture, events manager, realm-admin bearer
  authentication, authenticator beans, theme lookup
- Infrastructure adapters: reqwest admin client, testcontainers harness,
  local HTTP test server, WebDriver session factory

## Architecture

```text
┌─────────────────────────────────────────────────────────────┐
│                    Test code / Extension API                │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                Application Layer                            │
├─────────────────────────────────────────────────────────────┤
│  • RealmFixture             • EventsManager                 │
│  • RealmAdminAuthenticator  • ThemeResolver                 │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│                 Domain Layer (Ports)                        │
├─────────────────────────────────────────────────────────────┤
│  • KeycloakAdminPort        • TokenManager / TokenVerifier  │
│  • EventSource              • CredentialStore               │
│  • RealmDirectory           • ThemeProvider                 │
└─────────────────────────────────────────────────────────────┘
                              │
┌─────────────────────────────────────────────────────────────┐
│              Infrastructure Layer (Adapters)                │
├─────────────────────────────────────────────────────────────┤
│  • KeycloakAdminClient      • KeycloakContainer             │
│  • KeycloakTokenManager     • HttpTestServer                │
│  • KeycloakTokenVerifier    • WebDriverFactory              │
└─────────────────────────────────────────────────────────────┘
```

## Usage

```rust,no_run
use std::sync::Arc;
use std::time::Duration;
use keycloak_testkit::{
    application::ports::ContainerConfig,
    infrastructure::adapters::{AdminEventSource, KeycloakContainer, LoginEventSource},
    EventsManager, RealmFixture,
};

# async fn run() -> Result<(), Box<dyn std::error::Error>> {
let keycloak = KeycloakContainer::start(&ContainerConfig::default()).await?;
let admin = Arc::new(keycloak.admin_client());

let mut fixture = RealmFixture::new(
    admin.clone(),
    EventsManager::new(Arc::new(LoginEventSource::new(admin.clone()))),
    EventsManager::new(Arc::new(AdminEventSource::new(admin))),
);
let realm = fixture.create_realm_from_file("tests/realms/test-realm.json", None).await?;
let user_id = fixture.create_user(&realm, "alice", |_| {}).await?;

assert!(fixture.pause(Duration::from_secs(1), || !user_id.is_empty()).await);
# Ok(())
# }
```
*/

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::ports::*;
pub use application::services::*;
pub use domain::entities::*;
pub use domain::errors::*;
pub use domain::wait::{
    evaluate, evaluate_async, evaluate_interruptible, pause_until, try_evaluate,
    try_evaluate_async, ConditionMatcher, Interrupter, WaitSpec, DEFAULT_POLL_INTERVAL,
    MIN_POLL_INTERVAL,
};
pub use infrastructure::adapters::init_tracing;
