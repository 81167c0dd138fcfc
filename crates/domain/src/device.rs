//! Device names: the only handle rules keep on devices and groups.
//!
//! A [`DeviceName`] is resolved against the host registry every time a rule
//! runs. Whether it denotes a single device or a group is only known after
//! resolution.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a device or group as registered in the host engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceName(String);

impl DeviceName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for DeviceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DeviceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for DeviceName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DeviceName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Build a list of names from string literals.
///
/// ```
/// use peerlink_domain::device::{names, DeviceName};
///
/// let devices = names(["Hall", "Porch"]);
/// assert_eq!(devices, vec![DeviceName::from("Hall"), DeviceName::from("Porch")]);
/// ```
pub fn names<I, S>(items: I) -> Vec<DeviceName>
where
    I: IntoIterator<Item = S>,
    S: Into<DeviceName>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_raw_name() {
        assert_eq!(DeviceName::from("Living room").to_string(), "Living room");
    }

    #[test]
    fn should_compare_with_str() {
        assert_eq!(DeviceName::from("Hall"), "Hall");
    }

    #[test]
    fn should_treat_blank_name_as_empty() {
        assert!(DeviceName::from("  ").is_empty());
        assert!(!DeviceName::from("Hall").is_empty());
    }

    #[test]
    fn should_serialize_as_plain_string() {
        let json = serde_json::to_string(&DeviceName::from("Hall")).unwrap();
        assert_eq!(json, "\"Hall\"");
    }
}
