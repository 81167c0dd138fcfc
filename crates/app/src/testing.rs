//! In-memory host used by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use peerlink_domain::device::DeviceName;
use peerlink_domain::state::State;

use crate::ports::{Host, LogLevel, Peer};

#[derive(Default)]
struct Registry {
    devices: HashMap<DeviceName, State>,
    groups: HashMap<DeviceName, State>,
    writes: Vec<(DeviceName, State)>,
    scheduled: Vec<(DeviceName, State, f64)>,
    cancelled: Vec<DeviceName>,
    logs: Vec<(LogLevel, String, String)>,
}

impl Registry {
    fn slot(&mut self, name: &DeviceName, group: bool) -> Option<&mut State> {
        if group {
            self.groups.get_mut(name)
        } else {
            self.devices.get_mut(name)
        }
    }
}

/// Spy host recording every write, schedule and log line.
#[derive(Clone, Default)]
pub(crate) struct FakeHost {
    registry: Arc<Mutex<Registry>>,
}

pub(crate) struct FakePeer {
    name: DeviceName,
    group: bool,
    registry: Arc<Mutex<Registry>>,
}

impl FakeHost {
    pub(crate) fn with_device(self, name: &str, state: impl Into<State>) -> Self {
        self.lock().devices.insert(name.into(), state.into());
        self
    }

    pub(crate) fn with_group(self, name: &str, state: impl Into<State>) -> Self {
        self.lock().groups.insert(name.into(), state.into());
        self
    }

    /// Change a state behind the rules' back (no write recorded).
    pub(crate) fn force(&self, name: &str, state: impl Into<State>) {
        let mut registry = self.lock();
        let name = DeviceName::from(name);
        let state = state.into();
        if let Some(slot) = registry.devices.get_mut(&name) {
            *slot = state;
        } else if let Some(slot) = registry.groups.get_mut(&name) {
            *slot = state;
        }
    }

    pub(crate) fn state_of(&self, name: &str) -> Option<State> {
        let registry = self.lock();
        registry
            .devices
            .get(name)
            .or_else(|| registry.groups.get(name))
            .cloned()
    }

    pub(crate) fn writes(&self) -> Vec<(DeviceName, State)> {
        self.lock().writes.clone()
    }

    pub(crate) fn writes_to(&self, name: &str) -> usize {
        self.lock().writes.iter().filter(|(n, _)| n == name).count()
    }

    pub(crate) fn scheduled(&self) -> Vec<(DeviceName, State, f64)> {
        self.lock().scheduled.clone()
    }

    pub(crate) fn cancelled(&self) -> Vec<DeviceName> {
        self.lock().cancelled.clone()
    }

    pub(crate) fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .logs
            .iter()
            .filter(|(l, _, _)| *l == level)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    pub(crate) fn markers(&self) -> Vec<String> {
        self.lock()
            .logs
            .iter()
            .map(|(_, marker, _)| marker.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap()
    }

    fn peer(&self, name: &DeviceName, group: bool) -> FakePeer {
        FakePeer {
            name: name.clone(),
            group,
            registry: Arc::clone(&self.registry),
        }
    }
}

impl Host for FakeHost {
    type Peer = FakePeer;

    fn lookup_device(&self, name: &DeviceName) -> Option<FakePeer> {
        let known = self.lock().devices.contains_key(name);
        known.then(|| self.peer(name, false))
    }

    fn lookup_group(&self, name: &DeviceName) -> Option<FakePeer> {
        let known = self.lock().groups.contains_key(name);
        known.then(|| self.peer(name, true))
    }

    fn log(&self, level: LogLevel, marker: &str, message: &str) {
        self.lock()
            .logs
            .push((level, marker.to_string(), message.to_string()));
    }
}

impl Peer for FakePeer {
    fn name(&self) -> &DeviceName {
        &self.name
    }

    fn state(&self) -> State {
        let mut registry = self.registry.lock().unwrap();
        registry.slot(&self.name, self.group).cloned().unwrap()
    }

    fn set_state(&self, state: &State) {
        let mut registry = self.registry.lock().unwrap();
        if let Some(slot) = registry.slot(&self.name, self.group) {
            *slot = state.clone();
        }
        registry.writes.push((self.name.clone(), state.clone()));
    }

    fn schedule_state_change(&self, state: &State, delay_seconds: f64) {
        self.registry
            .lock()
            .unwrap()
            .scheduled
            .push((self.name.clone(), state.clone(), delay_seconds));
    }

    fn cancel_scheduled(&self) {
        let mut registry = self.registry.lock().unwrap();
        registry.scheduled.retain(|(name, _, _)| *name != self.name);
        registry.cancelled.push(self.name.clone());
    }
}
