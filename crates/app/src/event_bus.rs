//! Change bus: fans every published [`StateChange`] out to the dispatch loops.

use tokio::sync::broadcast;

use peerlink_domain::event::StateChange;

use crate::ports::ChangePublisher;

/// Clonable handle on a [`broadcast`] channel of state changes.
///
/// Every clone publishes into the same channel. A receiver that falls more
/// than `capacity` changes behind gets `RecvError::Lagged` and skips ahead.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateChange>,
}

impl InProcessEventBus {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// A receiver sees only changes published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }
}

impl ChangePublisher for InProcessEventBus {
    fn publish(&self, change: StateChange) {
        // No receiver means nobody dispatches rules yet.
        let _ = self.sender.send(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn should_hand_change_to_dispatcher() {
        let bus = InProcessEventBus::new(16);
        let mut changes = bus.subscribe();

        bus.publish(StateChange::new("Hall", "On"));

        let change = changes.recv().await.unwrap();
        assert_eq!(change.to_string(), "Hall -> On");
    }

    #[test]
    fn should_share_channel_between_clones() {
        let bus = InProcessEventBus::new(16);
        let mut changes = bus.subscribe();

        bus.clone().publish(StateChange::new("Porch", "Off"));

        assert_eq!(changes.try_recv().unwrap().device, "Porch");
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn should_drop_change_nobody_listens_to() {
        let bus = InProcessEventBus::new(16);
        bus.publish(StateChange::new("Hall", "On"));

        let mut changes = bus.subscribe();
        assert!(matches!(changes.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn should_report_lag_when_dispatcher_falls_behind() {
        let bus = InProcessEventBus::new(2);
        let mut changes = bus.subscribe();

        for device in ["S1", "S2", "S3"] {
            bus.publish(StateChange::new(device, "On"));
        }

        assert!(matches!(changes.recv().await, Err(RecvError::Lagged(1))));
        assert_eq!(changes.recv().await.unwrap().device, "S2");
    }
}
