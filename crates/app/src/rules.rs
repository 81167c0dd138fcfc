//! Rule factories: one constructor per rule family.
//!
//! Each factory captures the names it is given and returns a
//! [`RuleDescriptor`]. Nothing is looked up at construction time; every
//! handler invocation resolves names against the host again.
//!
//! | Family | Watches | Reacts to | Effect |
//! |--------|---------|-----------|--------|
//! | [`synonym`] | devices | any state | others copy the state |
//! | [`synonym_with_groups`] | devices and groups | any state | others copy the state |
//! | [`exclusive`] | devices | anything but `Off` | others turn `Off` |
//! | [`main_drives_all`] | main | per [`Transition`] | devices copy the state |
//! | [`timed_auto_off`] | devices | `On` | off-timer restarted |
//! | [`cascade`] | devices | `On`, `Group On` | main turns `On` |
//! | [`mutual_group`] | main and devices | any state | main drives devices, devices in agreement drive main |
//!
//! Rules do not know about each other. Combining them so that they feed
//! each other different states loops forever; keeping rule sets consistent
//! is up to whoever declares them.

mod descriptor;
mod handlers;

pub use descriptor::RuleDescriptor;

use std::collections::BTreeMap;

use peerlink_domain::device::DeviceName;
use peerlink_domain::rule::{TimeoutSpec, Transition};

use descriptor::RuleKind;

fn collect<I, S>(items: I) -> Vec<DeviceName>
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    items.into_iter().map(Into::into).collect()
}

/// Devices that always share the same state.
pub fn synonym<I, S>(set_name: &str, devices: I) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    let devices = collect(devices);
    RuleDescriptor::new(
        format!("Synonym({set_name})"),
        devices.clone(),
        RuleKind::Follow { peers: devices },
    )
}

/// Devices and groups that always share the same state.
pub fn synonym_with_groups<I, J, S, T>(set_name: &str, devices: I, groups: J) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: Into<DeviceName>,
    T: Into<DeviceName>,
{
    let peers: Vec<DeviceName> = collect(devices).into_iter().chain(collect(groups)).collect();
    RuleDescriptor::new(
        format!("SynonymWithGroups({set_name})"),
        peers.clone(),
        RuleKind::Follow { peers },
    )
}

/// Devices of which at most one may be on.
pub fn exclusive<I, S>(set_name: &str, devices: I) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    let devices = collect(devices);
    RuleDescriptor::new(
        format!("Exclusive({set_name})"),
        devices.clone(),
        RuleKind::Exclusive { peers: devices },
    )
}

/// Devices that copy `main` whenever it makes a `transition`.
pub fn main_drives_all<I, S>(
    main: impl Into<DeviceName>,
    transition: Transition,
    devices: I,
) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    let main = main.into();
    RuleDescriptor::new(
        format!("MainDrivesAll({main}, {transition})"),
        [main],
        RuleKind::MainDrivesAll {
            transition,
            devices: collect(devices),
        },
    )
}

/// Devices that switch off on their own some time after being turned on.
///
/// Timeouts are normalized to seconds here; a spec with an unknown unit is
/// kept and reported each time its device turns on.
pub fn timed_auto_off<I, S>(set_name: &str, specs: I) -> RuleDescriptor
where
    I: IntoIterator<Item = (S, TimeoutSpec)>,
    S: Into<DeviceName>,
{
    let delays: BTreeMap<DeviceName, _> = specs
        .into_iter()
        .map(|(device, spec)| (device.into(), spec.seconds()))
        .collect();
    RuleDescriptor::new(
        format!("TimedAutoOff({set_name})"),
        delays.keys().cloned().collect::<Vec<_>>(),
        RuleKind::TimedAutoOff { delays },
    )
}

/// A main device that turns on as soon as any of `devices` does.
pub fn cascade<I, S>(main: impl Into<DeviceName>, devices: I) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    let main = main.into();
    RuleDescriptor::new(
        format!("Cascade({main})"),
        collect(devices),
        RuleKind::Cascade { main },
    )
}

/// A main device driving `devices`, and following them once they all agree.
pub fn mutual_group<I, S>(main: impl Into<DeviceName>, devices: I) -> RuleDescriptor
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    let main = main.into();
    let devices = collect(devices);
    let subscriptions: Vec<DeviceName> = devices
        .iter()
        .cloned()
        .chain(std::iter::once(main.clone()))
        .collect();
    RuleDescriptor::new(
        format!("MutualGroup({main})"),
        subscriptions,
        RuleKind::MutualGroup { main, devices },
    )
}
