use crate::application::ports::admin::AdminResult;
use crate::domain::entities::{RealmEventsConfig, TimedEvent};
use async_trait::async_trait;

/// Extra tweak applied to a realm's event settings while enabling events
pub type EventsConfigurer = dyn Fn(&mut RealmEventsConfig) + Send + Sync;

/// Source of one kind of Keycloak event (user events or admin events)
#[async_trait]
pub trait EventSource: Send + Sync {
    type Event: TimedEvent + Clone + Send + Sync;

    /// Turn recording on for `realm`, applying `configure` to the realm settings
    async fn enable(&self, realm: &str, configure: Option<&EventsConfigurer>) -> AdminResult<()>;

    /// Drop every event recorded for `realm`
    async fn clear(&self, realm: &str) -> AdminResult<()>;

    /// Events currently stored for `realm`, in server order
    async fn fetch(&self, realm: &str) -> AdminResult<Vec<Self::Event>>;
}
