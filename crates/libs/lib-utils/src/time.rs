//! # Time Utilities
//!
//! Timestamps for message creation and wire formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Format time as an RFC3339 string with millisecond precision.
///
/// Clients sort and compare these strings, so the precision is fixed.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time_fixed_precision() {
        let time = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(format_time(time), "2024-05-01T12:30:00.000Z");
    }

    #[test]
    fn test_format_time_orders_lexically() {
        let earlier = now_utc();
        let later = earlier + chrono::Duration::milliseconds(5);
        assert!(format_time(earlier) < format_time(later));
    }
}
