//! Per-family reactions to a single state change.

use std::collections::BTreeMap;

use peerlink_domain::device::DeviceName;
use peerlink_domain::error::Unresolved;
use peerlink_domain::state::State;

use crate::peers::{all_have_state, apply_state, resolve_main, update};
use crate::ports::{Host, LogLevel, Peer};

use super::descriptor::Delay;

pub(super) fn follow<H: Host>(
    host: &H,
    marker: &str,
    peers: &[DeviceName],
    device: &DeviceName,
    state: &State,
) {
    apply_state(host, marker, device, state, peers);
}

pub(super) fn exclusive<H: Host>(
    host: &H,
    marker: &str,
    peers: &[DeviceName],
    device: &DeviceName,
    state: &State,
) {
    if *state == State::Off {
        return;
    }
    apply_state(host, marker, device, &State::Off, peers);
}

pub(super) fn main_drives_all<H: Host>(
    host: &H,
    marker: &str,
    transition: peerlink_domain::rule::Transition,
    devices: &[DeviceName],
    device: &DeviceName,
    state: &State,
) {
    if !transition.accepts(state) {
        return;
    }
    apply_state(host, marker, device, state, devices);
}

/// Restart the off-timer of a device that just turned on.
pub(super) fn timed_auto_off<H: Host>(
    host: &H,
    marker: &str,
    delays: &BTreeMap<DeviceName, Delay>,
    device: &DeviceName,
    state: &State,
) {
    if *state != State::On {
        return;
    }
    let Some(delay) = delays.get(device) else {
        return;
    };
    let Some(peer) = host
        .lookup_device(device)
        .or_else(|| host.lookup_group(device))
    else {
        let err = Unresolved::MissingTrigger {
            name: device.clone(),
        };
        host.log(LogLevel::Error, marker, &err.to_string());
        return;
    };

    peer.cancel_scheduled();

    let seconds = match delay {
        Ok(seconds) => *seconds,
        Err(err) => {
            host.log(
                LogLevel::Info,
                marker,
                &format!("Cannot switch {device} off later: {err}"),
            );
            return;
        }
    };

    if seconds > 0.0 {
        peer.schedule_state_change(&State::Off, seconds);
        host.log(
            LogLevel::Info,
            marker,
            &format!("Off for {device} in {seconds} seconds"),
        );
    }
}

pub(super) fn cascade<H: Host>(
    host: &H,
    marker: &str,
    main: &DeviceName,
    device: &DeviceName,
    state: &State,
) {
    if !state.is_on() {
        return;
    }
    let Ok(main) = resolve_main(host, marker, main, device) else {
        return;
    };
    update(host, marker, &main, &State::On, device);
}

pub(super) fn mutual_group<H: Host>(
    host: &H,
    marker: &str,
    main: &DeviceName,
    devices: &[DeviceName],
    device: &DeviceName,
    state: &State,
) {
    if device == main {
        apply_state(host, marker, device, state, devices);
        return;
    }
    if !all_have_state(host, marker, device, state, devices) {
        return;
    }
    let Ok(main) = resolve_main(host, marker, main, device) else {
        return;
    };
    update(host, marker, &main, state, device);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use peerlink_domain::error::UnrecognizedUnit;

    const MARKER: &str = "TimedAutoOff(test)";

    fn delays(entries: &[(&str, Delay)]) -> BTreeMap<DeviceName, Delay> {
        entries
            .iter()
            .map(|(name, delay)| (DeviceName::from(*name), delay.clone()))
            .collect()
    }

    #[test]
    fn should_cancel_and_log_info_when_unit_is_unrecognized() {
        let host = FakeHost::default().with_device("L1", State::On);
        let delays = delays(&[(
            "L1",
            Err(UnrecognizedUnit {
                unit: "fortnight".to_string(),
            }),
        )]);

        timed_auto_off(&host, MARKER, &delays, &"L1".into(), &State::On);

        assert_eq!(host.cancelled(), vec![DeviceName::from("L1")]);
        assert!(host.scheduled().is_empty());
        assert!(host.messages(LogLevel::Error).is_empty());
        assert_eq!(
            host.messages(LogLevel::Info),
            vec!["Cannot switch L1 off later: unrecognized unit fortnight".to_string()]
        );
    }

    #[test]
    fn should_only_cancel_when_timeout_is_zero() {
        let host = FakeHost::default().with_device("L1", State::On);
        let delays = delays(&[("L1", Ok(0.0))]);

        timed_auto_off(&host, MARKER, &delays, &"L1".into(), &State::On);

        assert_eq!(host.cancelled().len(), 1);
        assert!(host.scheduled().is_empty());
    }

    #[test]
    fn should_only_cancel_when_timeout_is_negative() {
        let host = FakeHost::default().with_device("L1", State::On);
        let delays = delays(&[("L1", Ok(-30.0))]);

        timed_auto_off(&host, MARKER, &delays, &"L1".into(), &State::On);

        assert_eq!(host.cancelled(), vec![DeviceName::from("L1")]);
        assert!(host.scheduled().is_empty());
        assert!(host.messages(LogLevel::Info).is_empty());
    }

    #[test]
    fn should_log_error_when_trigger_device_is_gone() {
        let host = FakeHost::default();
        let delays = delays(&[("L1", Ok(60.0))]);

        timed_auto_off(&host, MARKER, &delays, &"L1".into(), &State::On);

        assert_eq!(
            host.messages(LogLevel::Error),
            vec!["Device L1 does not exist".to_string()]
        );
    }

    #[test]
    fn should_ignore_device_without_timeout() {
        let host = FakeHost::default().with_device("L9", State::On);
        let delays = delays(&[("L1", Ok(60.0))]);

        timed_auto_off(&host, MARKER, &delays, &"L9".into(), &State::On);

        assert!(host.cancelled().is_empty());
        assert!(host.scheduled().is_empty());
    }
}
