//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the rules and the host engine. They are
//! defined here (in `app`) so that both the rule layer and the adapter layer
//! can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod host;

pub use event_bus::ChangePublisher;
pub use host::{Host, LogLevel, Peer};
