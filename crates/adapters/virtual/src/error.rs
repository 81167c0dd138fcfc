//! Virtual adapter error types.

use peerlink_domain::device::DeviceName;

/// Errors specific to the virtual host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VirtualError {
    /// Neither a device nor a group carries the name.
    #[error("unknown device or group {0}")]
    UnknownDevice(DeviceName),

    /// A device or group with this name is already registered.
    #[error("{0} is already registered")]
    AlreadyRegistered(DeviceName),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_unknown_device_error() {
        let err = VirtualError::UnknownDevice(DeviceName::from("Ghost"));
        assert_eq!(err.to_string(), "unknown device or group Ghost");
    }

    #[test]
    fn should_display_already_registered_error() {
        let err = VirtualError::AlreadyRegistered(DeviceName::from("Hall"));
        assert_eq!(err.to_string(), "Hall is already registered");
    }
}
