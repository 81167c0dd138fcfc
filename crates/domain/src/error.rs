//! Common error types used across the workspace.
//!
//! Construction-time problems are typed errors that propagate through `?`.
//! Trigger-time problems ([`Unresolved`], [`UnrecognizedUnit`]) never leave a
//! rule handler: they are rendered into the host log and the handler moves on.

use crate::device::DeviceName;

/// Top-level error for fallible peerlink operations.
#[derive(Debug, thiserror::Error)]
pub enum PeerLinkError {
    #[error("Validation error")]
    Validation(#[from] ValidationError),
}

/// A rule definition that violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("rule name must not be empty")]
    EmptyName,
    #[error("rule {rule} references no devices")]
    NoDevices { rule: String },
    #[error("device name in rule {rule} must not be empty")]
    EmptyDeviceName { rule: String },
    #[error("main device {main} must not be listed among its own devices")]
    MainAmongDevices { main: DeviceName },
}

/// Why a name reference could not be turned into a live peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unresolved {
    /// The peer is the triggering device itself. Not an error.
    #[error("{name} refers to the triggering device")]
    SelfReference { name: DeviceName },
    /// Neither a device nor a group carries the name.
    #[error("Peer {peer} of device {trigger} does not exist")]
    Missing {
        peer: DeviceName,
        trigger: DeviceName,
    },
    /// A main device, looked up without group fallback, is absent.
    #[error("Main device {main} of device {trigger} does not exist")]
    MissingMain {
        main: DeviceName,
        trigger: DeviceName,
    },
    /// The triggering device vanished before the rule could act on it.
    #[error("Device {name} does not exist")]
    MissingTrigger { name: DeviceName },
}

/// A timeout unit outside of `second`, `minute` and `hour`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized unit {unit}")]
pub struct UnrecognizedUnit {
    pub unit: String,
}
