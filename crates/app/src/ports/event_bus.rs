//! Change bus port: publish state changes to whoever dispatches rules.

use peerlink_domain::event::StateChange;

/// Publishes state changes to interested subscribers.
pub trait ChangePublisher {
    /// Publish a change to all current subscribers.
    fn publish(&self, change: StateChange);
}

impl<T: ChangePublisher + Send + Sync> ChangePublisher for std::sync::Arc<T> {
    fn publish(&self, change: StateChange) {
        (**self).publish(change);
    }
}
