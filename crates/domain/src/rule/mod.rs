//! Rule definitions: the declarative form of every rule family.
//!
//! A [`RuleDefinition`] is what an operator writes down (in a config file or
//! in code). The application layer turns it into a live rule descriptor.
//!
//! No attempt is made to detect interactions between rules. Declaring the
//! same devices both as synonyms and as exclusive, or two synonym sets that
//! feed each other with different states, makes the host toggle forever.

mod timeout;
mod transition;

pub use timeout::{TimeoutSpec, Unit};
pub use transition::Transition;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::DeviceName;
use crate::error::{PeerLinkError, ValidationError};

/// One rule, tagged by its family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum RuleDefinition {
    /// All devices follow whichever one changed.
    Synonym {
        name: String,
        devices: Vec<DeviceName>,
    },
    /// Like [`Synonym`](Self::Synonym), with groups taking part as well.
    SynonymWithGroups {
        name: String,
        devices: Vec<DeviceName>,
        #[serde(default)]
        groups: Vec<DeviceName>,
    },
    /// At most one device is on at any time.
    Exclusive {
        name: String,
        devices: Vec<DeviceName>,
    },
    /// The devices copy the main device's state.
    MainDrivesAll {
        main: DeviceName,
        #[serde(default)]
        transition: Transition,
        devices: Vec<DeviceName>,
    },
    /// Devices switch themselves off after a timeout.
    TimedAutoOff {
        name: String,
        devices: BTreeMap<DeviceName, TimeoutSpec>,
    },
    /// Any device turning on turns the main device on.
    Cascade {
        main: DeviceName,
        devices: Vec<DeviceName>,
    },
    /// The main device drives the devices, and follows them once they agree.
    MutualGroup {
        main: DeviceName,
        devices: Vec<DeviceName>,
    },
}

impl RuleDefinition {
    /// Family name as used in log markers.
    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            Self::Synonym { .. } => "Synonym",
            Self::SynonymWithGroups { .. } => "SynonymWithGroups",
            Self::Exclusive { .. } => "Exclusive",
            Self::MainDrivesAll { .. } => "MainDrivesAll",
            Self::TimedAutoOff { .. } => "TimedAutoOff",
            Self::Cascade { .. } => "Cascade",
            Self::MutualGroup { .. } => "MutualGroup",
        }
    }

    /// Human readable label: the set name, or the main device.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Synonym { name, .. }
            | Self::SynonymWithGroups { name, .. }
            | Self::Exclusive { name, .. }
            | Self::TimedAutoOff { name, .. } => name.as_str(),
            Self::MainDrivesAll { main, .. }
            | Self::Cascade { main, .. }
            | Self::MutualGroup { main, .. } => main.as_str(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PeerLinkError::Validation`] when:
    /// - the set name or main device name is empty ([`ValidationError::EmptyName`])
    /// - no device is referenced ([`ValidationError::NoDevices`])
    /// - a referenced name is empty ([`ValidationError::EmptyDeviceName`])
    /// - a main device appears in its own device list ([`ValidationError::MainAmongDevices`])
    pub fn validate(&self) -> Result<(), PeerLinkError> {
        if self.label().trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let referenced: Vec<&DeviceName> = match self {
            Self::Synonym { devices, .. }
            | Self::Exclusive { devices, .. }
            | Self::MainDrivesAll { devices, .. }
            | Self::Cascade { devices, .. }
            | Self::MutualGroup { devices, .. } => devices.iter().collect(),
            Self::SynonymWithGroups {
                devices, groups, ..
            } => devices.iter().chain(groups).collect(),
            Self::TimedAutoOff { devices, .. } => devices.keys().collect(),
        };

        if referenced.is_empty() {
            return Err(ValidationError::NoDevices {
                rule: self.label().to_string(),
            }
            .into());
        }
        if referenced.iter().any(|name| name.is_empty()) {
            return Err(ValidationError::EmptyDeviceName {
                rule: self.label().to_string(),
            }
            .into());
        }

        if let Self::MainDrivesAll { main, devices, .. }
        | Self::Cascade { main, devices }
        | Self::MutualGroup { main, devices } = self
        {
            if devices.contains(main) {
                return Err(ValidationError::MainAmongDevices { main: main.clone() }.into());
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for RuleDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MainDrivesAll {
                main, transition, ..
            } => write!(f, "{}({main}, {transition})", self.family()),
            _ => write!(f, "{}({})", self.family(), self.label()),
        }
    }
}
