use crate::{
    application::ports::*,
    domain::{
        entities::TimedEvent,
        errors::{AdminError, WaitError},
        wait::{try_evaluate_async, WaitSpec},
    },
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct RealmEvents {
    active: bool,
    consumed: usize,
}

/// Tracks the events of one kind recorded by Keycloak, realm by realm.
///
/// Each call to [`poll`](EventsManager::poll) only returns the events that
/// appeared since the previous call, oldest first.
pub struct EventsManager<E> {
    source: Arc<dyn EventSource<Event = E>>,
    realms: Mutex<HashMap<String, RealmEvents>>,
}

impl<E> EventsManager<E>
where
    E: TimedEvent + Clone + Send + Sync + 'static,
{
    pub fn new(source: Arc<dyn EventSource<Event = E>>) -> Self {
        Self {
            source,
            realms: Mutex::new(HashMap::new()),
        }
    }

    fn realms(&self) -> MutexGuard<'_, HashMap<String, RealmEvents>> {
        self.realms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self, realm: &str) -> bool {
        self.realms().get(realm).is_some_and(|state| state.active)
    }

    /// Enable recording for `realm` and start from an empty event list
    pub async fn activate(&self, realm: &str) -> AdminResult<()> {
        self.activate_with(realm, None).await
    }

    #[instrument(skip(self, configure))]
    pub async fn activate_with(
        &self,
        realm: &str,
        configure: Option<&EventsConfigurer>,
    ) -> AdminResult<()> {
        if self.is_active(realm) {
            return Ok(());
        }

        self.source.enable(realm, configure).await?;
        self.source.clear(realm).await?;

        let mut realms = self.realms();
        let state = realms.entry(realm.to_string()).or_default();
        state.active = true;
        state.consumed = 0;

        info!("Events activated for realm '{}'", realm);
        Ok(())
    }

    /// Forget everything known about `realm`; the next activation starts over.
    pub fn on_realm_removed(&self, realm: &str) {
        self.realms().remove(realm);
    }

    /// Events recorded since the previous poll, sorted by time
    #[instrument(skip(self))]
    pub async fn poll(&self, realm: &str) -> AdminResult<Vec<E>> {
        self.consume(realm, |_| false).await
    }

    /// Fresh events up to and including the first one matching `stop`.
    /// Events after it stay unconsumed for the next poll.
    async fn consume(&self, realm: &str, stop: impl Fn(&E) -> bool) -> AdminResult<Vec<E>> {
        let mut events = self.source.fetch(realm).await?;
        events.sort_by_key(|event| event.time());

        let mut realms = self.realms();
        let state = realms.entry(realm.to_string()).or_default();
        state.consumed = state.consumed.min(events.len());
        let mut fresh = events.split_off(state.consumed);
        if let Some(position) = fresh.iter().position(|event| stop(event)) {
            fresh.truncate(position + 1);
        }
        state.consumed += fresh.len();

        debug!("{} new event(s) in realm '{}'", fresh.len(), realm);
        Ok(fresh)
    }

    /// Clear the events of `realm` on the server
    pub async fn clear(&self, realm: &str) -> AdminResult<()> {
        self.source.clear(realm).await?;
        if let Some(state) = self.realms().get_mut(realm) {
            state.consumed = 0;
        }
        Ok(())
    }

    /// Poll until a new event matching `predicate` shows up.
    ///
    /// Returns `Ok(None)` when the wait times out.
    pub async fn wait_for_event(
        &self,
        realm: &str,
        predicate: impl Fn(&E) -> bool,
        spec: &WaitSpec,
    ) -> Result<Option<E>, WaitError<AdminError>> {
        let found = Mutex::new(None);
        let slot = &found;
        let predicate = &predicate;

        let matched = try_evaluate_async::<_, _, AdminError>(
            || async move {
                let events = self.consume(realm, predicate).await?;
                match events.into_iter().find(|event| predicate(event)) {
                    Some(event) => {
                        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(event);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            },
            spec,
        )
        .await?;

        let event = found.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(if matched { event } else { None })
    }
}
