//! Host port: the capability surface rules use to reach the home-automation
//! engine.
//!
//! The engine owns the device registry, the scheduler for delayed actions and
//! the log sink. Rules never cache what they get from it: every invocation
//! looks names up again.

use std::sync::Arc;

use peerlink_domain::device::DeviceName;
use peerlink_domain::state::State;

/// Severity of a line written to the host log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Info,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Info => f.write_str("INFO"),
        }
    }
}

/// A live device or group handle returned by the registry.
///
/// Writes are fire-and-forget: the host applies them and emits the
/// resulting state change on its own schedule.
pub trait Peer {
    fn name(&self) -> &DeviceName;

    /// State as currently known to the host.
    fn state(&self) -> State;

    fn set_state(&self, state: &State);

    /// Ask the host to switch this peer to `state` after `delay_seconds`.
    fn schedule_state_change(&self, state: &State, delay_seconds: f64);

    /// Drop every pending scheduled change for this peer.
    fn cancel_scheduled(&self);
}

/// Device registry and log sink of the host engine.
pub trait Host {
    type Peer: Peer;

    /// Look a single device up by name.
    fn lookup_device(&self, name: &DeviceName) -> Option<Self::Peer>;

    /// Look a group up by name.
    fn lookup_group(&self, name: &DeviceName) -> Option<Self::Peer>;

    /// Write a line to the host log, tagged with the rule's marker.
    ///
    /// The default forwards to `tracing`.
    fn log(&self, level: LogLevel, marker: &str, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(rule = marker, "{message}"),
            LogLevel::Info => tracing::info!(rule = marker, "{message}"),
        }
    }
}

impl<T: Host> Host for Arc<T> {
    type Peer = T::Peer;

    fn lookup_device(&self, name: &DeviceName) -> Option<Self::Peer> {
        (**self).lookup_device(name)
    }

    fn lookup_group(&self, name: &DeviceName) -> Option<Self::Peer> {
        (**self).lookup_group(name)
    }

    fn log(&self, level: LogLevel, marker: &str, message: &str) {
        (**self).log(level, marker, message);
    }
}
