//! # peerlink-adapter-virtual
//!
//! In-memory host engine for running rules without a real home-automation
//! controller.
//!
//! ## Behaviour
//!
//! | Capability | Virtual implementation |
//! |------------|------------------------|
//! | Device / group lookup | `HashMap` registries, devices take precedence |
//! | `set_state` | stores the state and publishes a [`StateChange`] |
//! | Scheduled change | tokio timer task, aborted on cancel |
//! | Log sink | captured [`LogEntry`] list, forwarded to `tracing` |
//!
//! ## Dependency rule
//!
//! Depends on `peerlink-app` (port traits) and `peerlink-domain` only.

pub mod error;
mod peer;
mod registry;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use peerlink_app::ports::{ChangePublisher, Host, LogLevel};
use peerlink_domain::device::DeviceName;
use peerlink_domain::event::StateChange;
use peerlink_domain::state::State;
use peerlink_domain::time::now;

pub use error::VirtualError;
pub use peer::VirtualPeer;
pub use registry::{Kind, LogEntry, Record};

use registry::Registry;

/// Log lines kept by [`VirtualHost::new`].
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

pub(crate) struct Shared<P> {
    registry: Mutex<Registry>,
    publisher: P,
}

impl<P> Shared<P> {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: ChangePublisher> Shared<P> {
    /// Store `state` and announce it. The lock is released before publishing.
    fn apply(&self, kind: Kind, name: &DeviceName, state: &State) {
        let written = self.lock().write(kind, name, state);
        if written {
            self.publisher
                .publish(StateChange::new(name.clone(), state.clone()));
        }
    }

    /// Apply a scheduled change unless its timer was cancelled.
    ///
    /// Unregistering, writing and publishing happen under one lock: a timer
    /// is never counted as done before its change is on the bus.
    fn fire_timer(&self, kind: Kind, name: &DeviceName, id: u64, state: &State) {
        let mut registry = self.lock();
        if !registry.forget_timer(kind, name, id) {
            tracing::debug!(device = %name, %state, "scheduled change was cancelled");
            return;
        }
        tracing::debug!(device = %name, %state, "scheduled change due");
        if registry.write(kind, name, state) {
            self.publisher
                .publish(StateChange::new(name.clone(), state.clone()));
        }
    }
}

/// Virtual host engine: device and group registry, timers and log sink.
///
/// Cloning yields another handle on the same registry.
pub struct VirtualHost<P> {
    shared: Arc<Shared<P>>,
}

impl<P> Clone for VirtualHost<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P> VirtualHost<P>
where
    P: ChangePublisher + Send + Sync + 'static,
{
    /// Create an empty host announcing every state change through `publisher`.
    ///
    /// Keeps the last [`DEFAULT_LOG_CAPACITY`] log lines.
    pub fn new(publisher: P) -> Self {
        Self::with_log_capacity(publisher, DEFAULT_LOG_CAPACITY)
    }

    /// Like [`new`](Self::new), keeping at most `log_capacity` log lines.
    pub fn with_log_capacity(publisher: P, log_capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(Registry::new(log_capacity)),
                publisher,
            }),
        }
    }

    /// Register a device.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::AlreadyRegistered`] if a device or group
    /// already carries the name.
    pub fn add_device(
        &self,
        name: impl Into<DeviceName>,
        state: impl Into<State>,
    ) -> Result<(), VirtualError> {
        self.register(Kind::Device, name.into(), state.into())
    }

    /// Register a group.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::AlreadyRegistered`] if a device or group
    /// already carries the name.
    pub fn add_group(
        &self,
        name: impl Into<DeviceName>,
        state: impl Into<State>,
    ) -> Result<(), VirtualError> {
        self.register(Kind::Group, name.into(), state.into())
    }

    fn register(&self, kind: Kind, name: DeviceName, state: State) -> Result<(), VirtualError> {
        let mut registry = self.shared.lock();
        if registry.contains(&name) {
            return Err(VirtualError::AlreadyRegistered(name));
        }
        tracing::debug!(device = %name, ?kind, %state, "registered");
        registry.insert(kind, name, state);
        Ok(())
    }

    /// Change a device from the outside (a wall switch, a user, a sensor).
    ///
    /// The change is published like any other, so rules react to it.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownDevice`] if the name is not registered.
    pub fn switch(
        &self,
        name: impl Into<DeviceName>,
        state: impl Into<State>,
    ) -> Result<(), VirtualError> {
        let name = name.into();
        let kind = self
            .shared
            .lock()
            .find(&name)
            .map(|record| record.kind)
            .ok_or_else(|| VirtualError::UnknownDevice(name.clone()))?;
        self.shared.apply(kind, &name, &state.into());
        Ok(())
    }

    /// Current state of a device, or of a group if no device has the name.
    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<State> {
        self.shared
            .lock()
            .find(&DeviceName::from(name))
            .map(|record| record.state.clone())
    }

    /// Every record, devices first, sorted by name.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        let registry = self.shared.lock();
        let mut records: Vec<Record> = registry
            .devices
            .values()
            .chain(registry.groups.values())
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            (a.kind == Kind::Group, &a.name).cmp(&(b.kind == Kind::Group, &b.name))
        });
        records
    }

    /// Most recent log lines written by rules, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<LogEntry> {
        self.shared.lock().logs.iter().cloned().collect()
    }

    /// Number of scheduled changes still waiting to fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.shared.lock().timers.values().map(Vec::len).sum()
    }
}

impl<P> Host for VirtualHost<P>
where
    P: ChangePublisher + Send + Sync + 'static,
{
    type Peer = VirtualPeer<P>;

    fn lookup_device(&self, name: &DeviceName) -> Option<Self::Peer> {
        let known = self.shared.lock().devices.contains_key(name);
        known.then(|| VirtualPeer::new(name.clone(), Kind::Device, Arc::clone(&self.shared)))
    }

    fn lookup_group(&self, name: &DeviceName) -> Option<Self::Peer> {
        let known = self.shared.lock().groups.contains_key(name);
        known.then(|| VirtualPeer::new(name.clone(), Kind::Group, Arc::clone(&self.shared)))
    }

    fn log(&self, level: LogLevel, marker: &str, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(rule = marker, "{message}"),
            LogLevel::Info => tracing::info!(rule = marker, "{message}"),
        }
        self.shared.lock().push_log(LogEntry {
            level,
            marker: marker.to_string(),
            message: message.to_string(),
            timestamp: now(),
        });
    }
}
