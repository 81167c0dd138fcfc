//! Timeout specs for automatic switch-off.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnrecognizedUnit;

/// Unit a timeout is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Second,
    Minute,
    Hour,
}

impl Unit {
    #[must_use]
    pub fn seconds_per_unit(self) -> f64 {
        match self {
            Self::Second => 1.0,
            Self::Minute => 60.0,
            Self::Hour => 3600.0,
        }
    }
}

impl FromStr for Unit {
    type Err = UnrecognizedUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "second" => Ok(Self::Second),
            "minute" => Ok(Self::Minute),
            "hour" => Ok(Self::Hour),
            other => Err(UnrecognizedUnit {
                unit: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Second => f.write_str("second"),
            Self::Minute => f.write_str("minute"),
            Self::Hour => f.write_str("hour"),
        }
    }
}

/// How long a device may stay on before it is switched off.
///
/// Written either as a bare number of minutes or as a record with an
/// explicit unit:
///
/// ```toml
/// "Porch" = 5
/// "Garage" = { timeout = 30, unit = "second" }
/// ```
///
/// The unit is kept as written so that a typo surfaces in the log of the
/// device it belongs to instead of rejecting the whole rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeoutSpec {
    Minutes(f64),
    WithUnit {
        timeout: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
}

impl TimeoutSpec {
    #[must_use]
    pub fn minutes(timeout: f64) -> Self {
        Self::Minutes(timeout)
    }

    #[must_use]
    pub fn with_unit(timeout: f64, unit: Unit) -> Self {
        Self::WithUnit {
            timeout,
            unit: Some(unit.to_string()),
        }
    }

    /// Normalize to seconds.
    ///
    /// A missing unit means minutes.
    ///
    /// # Errors
    ///
    /// Returns [`UnrecognizedUnit`] when the unit is not one of `second`,
    /// `minute` or `hour`.
    pub fn seconds(&self) -> Result<f64, UnrecognizedUnit> {
        match self {
            Self::Minutes(timeout) => Ok(timeout * Unit::Minute.seconds_per_unit()),
            Self::WithUnit {
                timeout,
                unit: None,
            } => Ok(timeout * Unit::Minute.seconds_per_unit()),
            Self::WithUnit {
                timeout,
                unit: Some(unit),
            } => {
                let unit: Unit = unit.parse()?;
                Ok(timeout * unit.seconds_per_unit())
            }
        }
    }
}

impl From<f64> for TimeoutSpec {
    fn from(value: f64) -> Self {
        Self::Minutes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_treat_bare_number_as_minutes() {
        assert_eq!(TimeoutSpec::minutes(5.0).seconds(), Ok(300.0));
    }

    #[test]
    fn should_convert_fractional_minutes_exactly() {
        let spec = TimeoutSpec::with_unit(10.5, Unit::Minute);
        assert_eq!(spec.seconds(), Ok(630.0));
    }

    #[test]
    fn should_keep_seconds_as_is() {
        assert_eq!(TimeoutSpec::with_unit(45.0, Unit::Second).seconds(), Ok(45.0));
    }

    #[test]
    fn should_convert_hours() {
        assert_eq!(TimeoutSpec::with_unit(1.5, Unit::Hour).seconds(), Ok(5400.0));
    }

    #[test]
    fn should_default_missing_unit_to_minutes() {
        let spec = TimeoutSpec::WithUnit {
            timeout: 2.0,
            unit: None,
        };
        assert_eq!(spec.seconds(), Ok(120.0));
    }

    #[test]
    fn should_reject_unknown_unit() {
        let spec = TimeoutSpec::WithUnit {
            timeout: 2.0,
            unit: Some("fortnight".to_string()),
        };
        assert_eq!(
            spec.seconds(),
            Err(UnrecognizedUnit {
                unit: "fortnight".to_string()
            })
        );
    }

    #[test]
    fn should_deserialize_bare_number_and_record() {
        let bare: TimeoutSpec = serde_json::from_str("5").unwrap();
        assert_eq!(bare, TimeoutSpec::Minutes(5.0));

        let record: TimeoutSpec =
            serde_json::from_str(r#"{"timeout": 30, "unit": "second"}"#).unwrap();
        assert_eq!(record.seconds(), Ok(30.0));
    }
}
