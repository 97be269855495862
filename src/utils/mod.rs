//! Utility functions and helpers.

pub mod backoff;
pub mod hash;
pub mod http;

use chrono::{DateTime, Utc};

pub use backoff::BackoffPolicy;
pub use hash::content_hash;

/// Convert a Unix timestamp in (possibly fractional) seconds to UTC.
pub fn epoch_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_seconds_to_datetime() {
        let dt = epoch_seconds_to_datetime(1_700_000_000.0).unwrap();
        assert_eq!(dt.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_epoch_seconds_fractional() {
        let dt = epoch_seconds_to_datetime(1.5).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_500);
    }

    #[test]
    fn test_epoch_seconds_rejects_nan() {
        assert!(epoch_seconds_to_datetime(f64::NAN).is_none());
        assert!(epoch_seconds_to_datetime(f64::INFINITY).is_none());
    }
}
