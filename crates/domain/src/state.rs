//! Device state: a token from the host engine's vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current state of a device or group.
///
/// Only `On`, `Off` and `Group On` carry meaning for the rules. Every other
/// value (dimmer levels, selector labels, …) is kept verbatim so it can be
/// copied from one device to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum State {
    On,
    Off,
    GroupOn,
    Other(String),
}

impl State {
    /// Whether this is one of the two "switched on" literals.
    #[must_use]
    pub fn is_on(&self) -> bool {
        matches!(self, Self::On | Self::GroupOn)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::GroupOn => "Group On",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for State {
    fn from(value: &str) -> Self {
        match value {
            "On" => Self::On,
            "Off" => Self::Off,
            "Group On" => Self::GroupOn,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for State {
    fn from(value: String) -> Self {
        match value.as_str() {
            "On" => Self::On,
            "Off" => Self::Off,
            "Group On" => Self::GroupOn,
            _ => Self::Other(value),
        }
    }
}

impl From<State> for String {
    fn from(value: State) -> Self {
        match value {
            State::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
