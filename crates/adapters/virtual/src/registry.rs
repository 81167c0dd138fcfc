//! Registry records kept by the virtual host.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use peerlink_app::ports::LogLevel;
use peerlink_domain::device::DeviceName;
use peerlink_domain::state::State;
use peerlink_domain::time::{Timestamp, now};

/// Whether a name denotes a single device or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Device,
    Group,
}

/// Live state of one device or group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: DeviceName,
    pub kind: Kind,
    pub state: State,
    pub last_changed: Timestamp,
}

/// A line written to the host log by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_level")]
    pub level: LogLevel,
    pub marker: String,
    pub message: String,
    pub timestamp: Timestamp,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_level<S: serde::Serializer>(level: &LogLevel, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(level)
}

/// Everything the virtual host knows, behind a single lock.
#[derive(Debug)]
pub(crate) struct Registry {
    pub(crate) devices: HashMap<DeviceName, Record>,
    pub(crate) groups: HashMap<DeviceName, Record>,
    pub(crate) timers: HashMap<(Kind, DeviceName), Vec<(u64, tokio::task::AbortHandle)>>,
    pub(crate) next_timer: u64,
    /// Most recent log lines, oldest first.
    pub(crate) logs: VecDeque<LogEntry>,
    log_capacity: usize,
}

impl Registry {
    pub(crate) fn new(log_capacity: usize) -> Self {
        Self {
            devices: HashMap::new(),
            groups: HashMap::new(),
            timers: HashMap::new(),
            next_timer: 0,
            logs: VecDeque::with_capacity(log_capacity),
            log_capacity,
        }
    }

    /// Keep `entry`, evicting the oldest line once the capacity is reached.
    pub(crate) fn push_log(&mut self, entry: LogEntry) {
        if self.log_capacity == 0 {
            return;
        }
        while self.logs.len() >= self.log_capacity {
            self.logs.pop_front();
        }
        self.logs.push_back(entry);
    }

    pub(crate) fn table(&self, kind: Kind) -> &HashMap<DeviceName, Record> {
        match kind {
            Kind::Device => &self.devices,
            Kind::Group => &self.groups,
        }
    }

    pub(crate) fn table_mut(&mut self, kind: Kind) -> &mut HashMap<DeviceName, Record> {
        match kind {
            Kind::Device => &mut self.devices,
            Kind::Group => &mut self.groups,
        }
    }

    pub(crate) fn contains(&self, name: &DeviceName) -> bool {
        self.devices.contains_key(name) || self.groups.contains_key(name)
    }

    /// Device first, then group.
    pub(crate) fn find(&self, name: &DeviceName) -> Option<&Record> {
        self.devices.get(name).or_else(|| self.groups.get(name))
    }

    pub(crate) fn insert(&mut self, kind: Kind, name: DeviceName, state: State) {
        let record = Record {
            name: name.clone(),
            kind,
            state,
            last_changed: now(),
        };
        self.table_mut(kind).insert(name, record);
    }

    /// Store a new state. Returns `false` when the record is gone.
    pub(crate) fn write(&mut self, kind: Kind, name: &DeviceName, state: &State) -> bool {
        match self.table_mut(kind).get_mut(name) {
            Some(record) => {
                record.state = state.clone();
                record.last_changed = now();
                true
            }
            None => false,
        }
    }

    pub(crate) fn abort_timers(&mut self, kind: Kind, name: &DeviceName) -> usize {
        let handles = self
            .timers
            .remove(&(kind, name.clone()))
            .unwrap_or_default();
        for (_, handle) in &handles {
            handle.abort();
        }
        handles.len()
    }

    /// Unregister a timer that came due. Returns `false` if it was cancelled
    /// in the meantime, in which case its change must not be applied.
    pub(crate) fn forget_timer(&mut self, kind: Kind, name: &DeviceName, id: u64) -> bool {
        let key = (kind, name.clone());
        let Some(handles) = self.timers.get_mut(&key) else {
            return false;
        };
        let before = handles.len();
        handles.retain(|(timer, _)| *timer != id);
        let found = handles.len() < before;
        if handles.is_empty() {
            self.timers.remove(&key);
        }
        found
    }
}
