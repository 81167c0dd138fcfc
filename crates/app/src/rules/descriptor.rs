//! Rule descriptor: what the host engine keeps for each rule.

use std::collections::{BTreeMap, BTreeSet};

use peerlink_domain::device::DeviceName;
use peerlink_domain::error::{PeerLinkError, UnrecognizedUnit};
use peerlink_domain::rule::{RuleDefinition, Transition};
use peerlink_domain::state::State;

use crate::ports::Host;

use super::handlers;

/// Seconds until auto-off, normalized once when the rule is built.
pub(crate) type Delay = Result<f64, UnrecognizedUnit>;

/// Names captured by a rule and the family they belong to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RuleKind {
    /// Copy the trigger's state to every other peer.
    Follow { peers: Vec<DeviceName> },
    /// Turn every other peer off when the trigger leaves `Off`.
    Exclusive { peers: Vec<DeviceName> },
    MainDrivesAll {
        transition: Transition,
        devices: Vec<DeviceName>,
    },
    TimedAutoOff {
        delays: BTreeMap<DeviceName, Delay>,
    },
    Cascade { main: DeviceName },
    MutualGroup {
        main: DeviceName,
        devices: Vec<DeviceName>,
    },
}

/// An immutable rule: the names it listens to and what it does when one of
/// them changes.
///
/// The engine must only call [`handle`](Self::handle) for devices listed in
/// [`subscriptions`](Self::subscriptions); other names lead to unspecified
/// (though harmless) behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDescriptor {
    subscriptions: BTreeSet<DeviceName>,
    log_tag: String,
    kind: RuleKind,
}

impl RuleDescriptor {
    pub(crate) fn new(
        log_tag: String,
        subscriptions: impl IntoIterator<Item = DeviceName>,
        kind: RuleKind,
    ) -> Self {
        Self {
            subscriptions: subscriptions.into_iter().collect(),
            log_tag,
            kind,
        }
    }

    /// Device and group names the engine must watch.
    #[must_use]
    pub fn subscriptions(&self) -> &BTreeSet<DeviceName> {
        &self.subscriptions
    }

    /// Marker written with every log line, e.g. `Synonym(Hall)`.
    #[must_use]
    pub fn log_tag(&self) -> &str {
        &self.log_tag
    }

    #[must_use]
    pub fn is_subscribed(&self, device: &DeviceName) -> bool {
        self.subscriptions.contains(device)
    }

    /// React to `device` having reached `state`.
    ///
    /// Never fails: unresolved names and bad timeout units end up in the
    /// host log and the rule does whatever else it still can.
    pub fn handle<H: Host>(&self, host: &H, device: &DeviceName, state: &State) {
        let marker = self.log_tag.as_str();
        match &self.kind {
            RuleKind::Follow { peers } => handlers::follow(host, marker, peers, device, state),
            RuleKind::Exclusive { peers } => {
                handlers::exclusive(host, marker, peers, device, state);
            }
            RuleKind::MainDrivesAll {
                transition,
                devices,
            } => handlers::main_drives_all(host, marker, *transition, devices, device, state),
            RuleKind::TimedAutoOff { delays } => {
                handlers::timed_auto_off(host, marker, delays, device, state);
            }
            RuleKind::Cascade { main } => handlers::cascade(host, marker, main, device, state),
            RuleKind::MutualGroup { main, devices } => {
                handlers::mutual_group(host, marker, main, devices, device, state);
            }
        }
    }
}

impl TryFrom<&RuleDefinition> for RuleDescriptor {
    type Error = PeerLinkError;

    /// Validate a definition and build its descriptor.
    fn try_from(definition: &RuleDefinition) -> Result<Self, Self::Error> {
        definition.validate()?;
        let descriptor = match definition {
            RuleDefinition::Synonym { name, devices } => super::synonym(name, devices.clone()),
            RuleDefinition::SynonymWithGroups {
                name,
                devices,
                groups,
            } => super::synonym_with_groups(name, devices.clone(), groups.clone()),
            RuleDefinition::Exclusive { name, devices } => {
                super::exclusive(name, devices.clone())
            }
            RuleDefinition::MainDrivesAll {
                main,
                transition,
                devices,
            } => super::main_drives_all(main.clone(), *transition, devices.clone()),
            RuleDefinition::TimedAutoOff { name, devices } => super::timed_auto_off(
                name,
                devices
                    .iter()
                    .map(|(device, spec)| (device.clone(), spec.clone())),
            ),
            RuleDefinition::Cascade { main, devices } => {
                super::cascade(main.clone(), devices.clone())
            }
            RuleDefinition::MutualGroup { main, devices } => {
                super::mutual_group(main.clone(), devices.clone())
            }
        };
        Ok(descriptor)
    }
}
