//! Peer resolution and state propagation shared by every rule family.
//!
//! Names are resolved on every call: the host's device set may change between
//! two events. A peer named like the triggering device is filtered out before
//! any lookup happens, so a rule never writes back to the device that
//! triggered it.

use peerlink_domain::device::DeviceName;
use peerlink_domain::error::Unresolved;
use peerlink_domain::state::State;

use crate::ports::{Host, LogLevel, Peer};

/// Resolve `peer` as a device, falling back to a group of that name.
///
/// Self-references fail silently. A name that is neither a device nor a
/// group is logged at ERROR under `marker`.
///
/// # Errors
///
/// Returns [`Unresolved::SelfReference`] when `peer == trigger` and
/// [`Unresolved::Missing`] when the registry knows no such name.
pub fn resolve<H: Host>(
    host: &H,
    marker: &str,
    peer: &DeviceName,
    trigger: &DeviceName,
) -> Result<H::Peer, Unresolved> {
    if peer == trigger {
        return Err(Unresolved::SelfReference { name: peer.clone() });
    }

    if let Some(found) = host
        .lookup_device(peer)
        .or_else(|| host.lookup_group(peer))
    {
        return Ok(found);
    }

    let err = Unresolved::Missing {
        peer: peer.clone(),
        trigger: trigger.clone(),
    };
    host.log(LogLevel::Error, marker, &err.to_string());
    Err(err)
}

/// Resolve a main device. Groups are not considered.
///
/// # Errors
///
/// Returns [`Unresolved::MissingMain`] (logged at ERROR) when no device
/// carries the name.
pub fn resolve_main<H: Host>(
    host: &H,
    marker: &str,
    main: &DeviceName,
    trigger: &DeviceName,
) -> Result<H::Peer, Unresolved> {
    host.lookup_device(main).ok_or_else(|| {
        let err = Unresolved::MissingMain {
            main: main.clone(),
            trigger: trigger.clone(),
        };
        host.log(LogLevel::Error, marker, &err.to_string());
        err
    })
}

/// Write `target` to `peer` unless it already holds it.
///
/// Returns whether a write happened.
pub(crate) fn update<H: Host>(
    host: &H,
    marker: &str,
    peer: &H::Peer,
    target: &State,
    trigger: &DeviceName,
) -> bool {
    if peer.state() == *target {
        return false;
    }
    peer.set_state(target);
    host.log(
        LogLevel::Info,
        marker,
        &format!("{target} for {} because {trigger} was changed", peer.name()),
    );
    true
}

/// Bring every resolvable peer to `target`.
///
/// Unresolved peers are skipped; peers already in `target` are left alone.
/// Returns the number of writes issued.
pub fn apply_state<'a, H, I>(
    host: &H,
    marker: &str,
    trigger: &DeviceName,
    target: &State,
    peers: I,
) -> usize
where
    H: Host,
    I: IntoIterator<Item = &'a DeviceName>,
{
    let mut written = 0;
    for name in peers {
        let Ok(peer) = resolve(host, marker, name, trigger) else {
            continue;
        };
        if update(host, marker, &peer, target, trigger) {
            written += 1;
        }
    }
    written
}

/// Whether every peer already holds `target`.
///
/// The triggering device counts as matching. Stops at the first peer that
/// differs or cannot be resolved.
pub fn all_have_state<'a, H, I>(
    host: &H,
    marker: &str,
    trigger: &DeviceName,
    target: &State,
    peers: I,
) -> bool
where
    H: Host,
    I: IntoIterator<Item = &'a DeviceName>,
{
    peers
        .into_iter()
        .all(|name| match resolve(host, marker, name, trigger) {
            Ok(peer) => peer.state() == *target,
            Err(Unresolved::SelfReference { .. }) => true,
            Err(_) => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use peerlink_domain::device::names;

    const MARKER: &str = "Test(peers)";

    #[test]
    fn should_resolve_device_before_group() {
        let host = FakeHost::default()
            .with_device("Hall", State::On)
            .with_group("Hall", State::Off);
        let peer = resolve(&host, MARKER, &"Hall".into(), &"Kitchen".into()).unwrap();
        assert_eq!(peer.state(), State::On);
    }

    #[test]
    fn should_fall_back_to_group() {
        let host = FakeHost::default().with_group("Downstairs", State::GroupOn);
        let peer = resolve(&host, MARKER, &"Downstairs".into(), &"Hall".into()).unwrap();
        assert_eq!(peer.name(), &DeviceName::from("Downstairs"));
        assert_eq!(peer.state(), State::GroupOn);
    }

    #[test]
    fn should_filter_self_reference_without_logging() {
        let host = FakeHost::default().with_device("Hall", State::On);
        let result = resolve(&host, MARKER, &"Hall".into(), &"Hall".into());
        assert!(matches!(result, Err(Unresolved::SelfReference { .. })));
        assert!(host.messages(LogLevel::Error).is_empty());
    }

    #[test]
    fn should_log_error_when_peer_is_missing() {
        let host = FakeHost::default();
        let result = resolve(&host, MARKER, &"Ghost".into(), &"Hall".into());
        assert!(matches!(result, Err(Unresolved::Missing { .. })));
        assert_eq!(
            host.messages(LogLevel::Error),
            vec!["Peer Ghost of device Hall does not exist".to_string()]
        );
        assert_eq!(host.markers(), vec![MARKER.to_string()]);
    }

    #[test]
    fn should_not_fall_back_to_group_for_main() {
        let host = FakeHost::default().with_group("Main", State::Off);
        let result = resolve_main(&host, MARKER, &"Main".into(), &"S1".into());
        assert!(matches!(result, Err(Unresolved::MissingMain { .. })));
        assert_eq!(
            host.messages(LogLevel::Error),
            vec!["Main device Main of device S1 does not exist".to_string()]
        );
    }

    #[test]
    fn should_write_only_differing_peers() {
        let host = FakeHost::default()
            .with_device("A", State::On)
            .with_device("B", State::Off)
            .with_device("C", State::On);
        let peers = names(["A", "B", "C"]);

        let written = apply_state(&host, MARKER, &"A".into(), &State::On, &peers);

        assert_eq!(written, 1);
        assert_eq!(host.writes(), vec![(DeviceName::from("B"), State::On)]);
        assert_eq!(
            host.messages(LogLevel::Info),
            vec!["On for B because A was changed".to_string()]
        );
    }

    #[test]
    fn should_skip_unresolved_peers_and_continue() {
        let host = FakeHost::default()
            .with_device("A", State::On)
            .with_device("C", State::Off);
        let peers = names(["Ghost", "C"]);

        let written = apply_state(&host, MARKER, &"A".into(), &State::On, &peers);

        assert_eq!(written, 1);
        assert_eq!(host.state_of("C"), Some(State::On));
        assert_eq!(host.messages(LogLevel::Error).len(), 1);
    }

    #[test]
    fn should_pass_opaque_states_through() {
        let host = FakeHost::default()
            .with_device("Dimmer 1", "Set Level: 40 %")
            .with_device("Dimmer 2", State::Off);
        let level = State::from("Set Level: 40 %");

        apply_state(&host, MARKER, &"Dimmer 1".into(), &level, &names(["Dimmer 2"]));

        assert_eq!(host.state_of("Dimmer 2"), Some(level));
    }

    #[test]
    fn should_report_all_matching_when_every_peer_agrees() {
        let host = FakeHost::default()
            .with_device("S1", State::On)
            .with_device("S2", State::On);
        let peers = names(["S1", "S2"]);
        assert!(all_have_state(&host, MARKER, &"S1".into(), &State::On, &peers));
    }

    #[test]
    fn should_report_mismatch_when_one_peer_differs() {
        let host = FakeHost::default()
            .with_device("S1", State::On)
            .with_device("S2", State::Off);
        let peers = names(["S1", "S2"]);
        assert!(!all_have_state(&host, MARKER, &"S1".into(), &State::On, &peers));
    }

    #[test]
    fn should_count_unresolved_peer_as_mismatch() {
        let host = FakeHost::default().with_device("S1", State::On);
        let peers = names(["S1", "Ghost"]);
        assert!(!all_have_state(&host, MARKER, &"S1".into(), &State::On, &peers));
        assert_eq!(host.messages(LogLevel::Error).len(), 1);
    }
}
