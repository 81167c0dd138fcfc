//! Transition: which state changes of a main device drive its followers.

use serde::{Deserialize, Serialize};

use crate::state::State;

/// Filter applied to the main device's new state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    /// Only react when the main turns `On`.
    On,
    /// Only react when the main turns `Off`.
    Off,
    /// React to every change and copy whatever state the main reached.
    #[default]
    Any,
}

impl Transition {
    /// Whether a main device reaching `state` should drive its followers.
    #[must_use]
    pub fn accepts(self, state: &State) -> bool {
        match self {
            Self::On => *state == State::On,
            Self::Off => *state == State::Off,
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Any => f.write_str("any"),
        }
    }
}
