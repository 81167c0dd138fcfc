//! Operator commands read from stdin, one per line.
//!
//! ```text
//! Hall light = On          # switch a device or group from the outside
//! dump                     # print every device and group as JSON
//! logs                     # print the rule log as JSON
//! quit
//! ```

use std::str::FromStr;

use peerlink_domain::device::DeviceName;
use peerlink_domain::state::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Switch { device: DeviceName, state: State },
    Dump,
    Logs,
    Quit,
    /// Blank line or comment.
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("expected `<device> = <state>`, `dump`, `logs` or `quit`, got {0:?}")]
    Unknown(String),
    #[error("missing device name")]
    MissingDevice,
    #[error("missing state for {0}")]
    MissingState(DeviceName),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.split_once('#').map_or(line, |(before, _)| before).trim();
        match line {
            "" => Ok(Self::Nothing),
            "dump" => Ok(Self::Dump),
            "logs" => Ok(Self::Logs),
            "quit" | "exit" => Ok(Self::Quit),
            _ => {
                let (device, state) = line
                    .split_once('=')
                    .ok_or_else(|| CommandError::Unknown(line.to_string()))?;
                let device = DeviceName::from(device.trim());
                if device.is_empty() {
                    return Err(CommandError::MissingDevice);
                }
                let state = state.trim();
                if state.is_empty() {
                    return Err(CommandError::MissingState(device));
                }
                Ok(Self::Switch {
                    device,
                    state: State::from(state),
                })
            }
        }
    }
}
