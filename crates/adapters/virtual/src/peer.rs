//! Virtual peer: a live handle on one registry record.

use std::sync::Arc;

use peerlink_app::ports::{ChangePublisher, Peer};
use peerlink_domain::device::DeviceName;
use peerlink_domain::state::State;
use peerlink_domain::time::delay;

use crate::Shared;
use crate::registry::Kind;

/// Handle returned by [`VirtualHost`](crate::VirtualHost) lookups.
///
/// It reads through to the registry on every call, so it always reflects
/// the current state.
pub struct VirtualPeer<P> {
    name: DeviceName,
    kind: Kind,
    shared: Arc<Shared<P>>,
}

impl<P> VirtualPeer<P> {
    pub(crate) fn new(name: DeviceName, kind: Kind, shared: Arc<Shared<P>>) -> Self {
        Self { name, kind, shared }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl<P> Peer for VirtualPeer<P>
where
    P: ChangePublisher + Send + Sync + 'static,
{
    fn name(&self) -> &DeviceName {
        &self.name
    }

    fn state(&self) -> State {
        self.shared
            .lock()
            .table(self.kind)
            .get(&self.name)
            .map_or(State::Other(String::new()), |record| record.state.clone())
    }

    fn set_state(&self, state: &State) {
        self.shared.apply(self.kind, &self.name, state);
    }

    fn schedule_state_change(&self, state: &State, delay_seconds: f64) {
        let Some(duration) = delay(delay_seconds) else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(device = %self.name, "no runtime available, dropping scheduled change");
            return;
        };

        let mut registry = self.shared.lock();
        let id = registry.next_timer;
        registry.next_timer += 1;

        let shared = Arc::clone(&self.shared);
        let kind = self.kind;
        let name = self.name.clone();
        let state = state.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            shared.fire_timer(kind, &name, id, &state);
        });

        registry
            .timers
            .entry((self.kind, self.name.clone()))
            .or_default()
            .push((id, task.abort_handle()));
    }

    fn cancel_scheduled(&self) {
        let aborted = self.shared.lock().abort_timers(self.kind, &self.name);
        if aborted > 0 {
            tracing::debug!(device = %self.name, aborted, "cancelled scheduled changes");
        }
    }
}
