//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_changed` and state-change records.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert a fractional delay in seconds into a [`std::time::Duration`].
///
/// Negative, zero and non-finite inputs map to `None`: there is nothing to
/// schedule.
#[must_use]
pub fn delay(seconds: f64) -> Option<std::time::Duration> {
    if seconds.is_finite() && seconds > 0.0 {
        std::time::Duration::try_from_secs_f64(seconds).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_convert_fractional_seconds() {
        assert_eq!(delay(1.5), Some(std::time::Duration::from_millis(1500)));
    }

    #[test]
    fn should_return_none_for_non_positive_delay() {
        assert_eq!(delay(0.0), None);
        assert_eq!(delay(-3.0), None);
        assert_eq!(delay(f64::NAN), None);
    }
}
