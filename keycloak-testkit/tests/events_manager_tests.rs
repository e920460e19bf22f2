mod mocks;

use keycloak_testkit::{
    domain::errors::{AdminError, WaitError},
    infrastructure::adapters::{AdminEventSource, LoginEventSource},
    AdminEvent, EventsManager, LoginEvent, RealmEventsConfig, WaitSpec,
};
use mocks::MockKeycloakAdmin;
use std::sync::Arc;
use std::time::Duration;

fn login_events(admin: &Arc<MockKeycloakAdmin>) -> EventsManager<LoginEvent> {
    EventsManager::new(Arc::new(LoginEventSource::new(admin.clone())))
}

fn admin_events(admin: &Arc<MockKeycloakAdmin>) -> EventsManager<AdminEvent> {
    EventsManager::new(Arc::new(AdminEventSource::new(admin.clone())))
}

fn setup() -> Arc<MockKeycloakAdmin> {
    let admin = Arc::new(MockKeycloakAdmin::new());
    admin.add_realm("test");
    admin
}

// ============================================================================
// Activation
// ============================================================================

#[tokio::test]
async fn test_activate_enables_events_and_clears_history() {
    let admin = setup();
    admin.push_login_event("test", 1, "LOGIN");
    let events = login_events(&admin);

    events.activate("test").await.unwrap();

    assert!(events.is_active("test"));
    assert!(admin.events_configs.lock().unwrap()["test"].events_enabled);
    assert!(events.poll("test").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_activate_twice_is_a_noop() {
    let admin = setup();
    let events = login_events(&admin);

    events.activate("test").await.unwrap();
    admin.push_login_event("test", 1, "LOGIN");
    events.activate("test").await.unwrap();

    assert_eq!(*admin.config_updates.lock().unwrap(), 1);
    // The second activation must not clear the event recorded in between
    assert_eq!(events.poll("test").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_already_enabled_events_are_not_rewritten() {
    let admin = setup();
    admin.events_configs.lock().unwrap().insert(
        "test".to_string(),
        RealmEventsConfig {
            events_enabled: true,
            ..RealmEventsConfig::default()
        },
    );
    let events = login_events(&admin);

    events.activate("test").await.unwrap();

    assert_eq!(*admin.config_updates.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_configurer_is_applied() {
    let admin = setup();
    let events = login_events(&admin);

    let configure = |config: &mut RealmEventsConfig| {
        config.enabled_event_types = Some(vec!["LOGIN".to_string()]);
    };
    events.activate_with("test", Some(&configure)).await.unwrap();

    let config = admin.events_configs.lock().unwrap()["test"].clone();
    assert!(config.events_enabled);
    assert_eq!(config.enabled_event_types, Some(vec!["LOGIN".to_string()]));
}

#[tokio::test]
async fn test_admin_events_activation() {
    let admin = setup();
    let events = admin_events(&admin);

    events.activate("test").await.unwrap();

    let config = admin.events_configs.lock().unwrap()["test"].clone();
    assert_eq!(config.admin_events_enabled, Some(true));
    assert!(!config.events_enabled);
}

#[tokio::test]
async fn test_activation_failure_leaves_realm_inactive() {
    let admin = setup();
    let events = login_events(&admin);
    admin.set_should_fail(true);

    let result = events.activate("test").await;

    assert!(matches!(result, Err(AdminError::Http { status: 500, .. })));
    assert!(!events.is_active("test"));
}

#[tokio::test]
async fn test_realm_removal_forgets_activation() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();

    events.on_realm_removed("test");

    assert!(!events.is_active("test"));
}

// ============================================================================
// Polling
// ============================================================================

#[tokio::test]
async fn test_poll_returns_only_new_events_oldest_first() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();

    admin.push_login_event("test", 10, "LOGIN");
    admin.push_login_event("test", 20, "LOGOUT");
    let first = events.poll("test").await.unwrap();
    assert_eq!(
        first.iter().map(|e| e.time).collect::<Vec<_>>(),
        vec![10, 20]
    );
    assert!(first[0].is_type("LOGIN"));

    admin.push_login_event("test", 30, "CODE_TO_TOKEN");
    let second = events.poll("test").await.unwrap();
    assert_eq!(second.len(), 1);
    assert!(second[0].is_type("CODE_TO_TOKEN"));

    assert!(events.poll("test").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_restarts_the_count() {
    let admin = setup();
    let events = admin_events(&admin);
    events.activate("test").await.unwrap();

    admin.push_admin_event("test", 1, "CREATE");
    assert_eq!(events.poll("test").await.unwrap().len(), 1);

    events.clear("test").await.unwrap();
    admin.push_admin_event("test", 2, "UPDATE");

    let fresh = events.poll("test").await.unwrap();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].operation_type.as_deref(), Some("UPDATE"));
}

#[tokio::test]
async fn test_realms_are_tracked_separately() {
    let admin = setup();
    admin.add_realm("other");
    let events = login_events(&admin);
    events.activate("test").await.unwrap();
    events.activate("other").await.unwrap();

    admin.push_login_event("test", 1, "LOGIN");
    admin.push_login_event("other", 1, "LOGIN");
    admin.push_login_event("other", 2, "LOGOUT");

    assert_eq!(events.poll("test").await.unwrap().len(), 1);
    assert_eq!(events.poll("other").await.unwrap().len(), 2);
}

// ============================================================================
// Waiting for events
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_wait_for_event_finds_match() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();
    admin.push_login_event("test", 1, "LOGIN");
    admin.push_login_event("test", 2, "LOGOUT");

    let found = events
        .wait_for_event(
            "test",
            |event| event.is_type("LOGOUT"),
            &WaitSpec::within(true, Duration::from_secs(1)),
        )
        .await
        .unwrap();

    assert_eq!(found.map(|e| e.time), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_event_picks_up_late_event() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();

    let producer = admin.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        producer.push_login_event("test", 5, "LOGIN_ERROR");
    });

    let found = events
        .wait_for_event(
            "test",
            |event| event.is_type("LOGIN_ERROR"),
            &WaitSpec::within(true, Duration::from_secs(2)),
        )
        .await
        .unwrap();

    assert!(found.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_event_times_out() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();
    admin.push_login_event("test", 1, "LOGIN");

    let found = events
        .wait_for_event(
            "test",
            |event| event.is_type("LOGOUT"),
            &WaitSpec::within(true, Duration::from_millis(300)),
        )
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_event_propagates_admin_errors() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();
    admin.set_should_fail(true);

    let result = events
        .wait_for_event(
            "test",
            |_| true,
            &WaitSpec::within(true, Duration::from_secs(1)),
        )
        .await;

    assert!(matches!(
        result,
        Err(WaitError::Condition(AdminError::Http { status: 500, .. }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_waits_see_events_of_the_same_batch() {
    let admin = setup();
    let events = login_events(&admin);
    events.activate("test").await.unwrap();
    admin.push_login_event("test", 1, "LOGIN");
    admin.push_login_event("test", 2, "CODE_TO_TOKEN");
    let spec = WaitSpec::within(true, Duration::from_secs(1));

    let login = events
        .wait_for_event("test", |event| event.is_type("LOGIN"), &spec)
        .await
        .unwrap();
    let exchange = events
        .wait_for_event("test", |event| event.is_type("CODE_TO_TOKEN"), &spec)
        .await
        .unwrap();

    assert_eq!(login.map(|e| e.time), Some(1));
    assert_eq!(exchange.map(|e| e.time), Some(2));
    assert!(events.poll("test").await.unwrap().is_empty());
}
