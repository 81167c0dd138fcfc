//! State change: the record the host hands to a rule when a device moves.

use serde::{Deserialize, Serialize};

use crate::device::DeviceName;
use crate::state::State;
use crate::time::{Timestamp, now};

/// A device or group reached a new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub device: DeviceName,
    pub state: State,
    pub timestamp: Timestamp,
}

impl StateChange {
    /// Record a change that happened now.
    #[must_use]
    pub fn new(device: impl Into<DeviceName>, state: impl Into<State>) -> Self {
        Self {
            device: device.into(),
            state: state.into(),
            timestamp: now(),
        }
    }
}

impl std::fmt::Display for StateChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.device, self.state)
    }
}
