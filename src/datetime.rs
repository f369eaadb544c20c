//! Application clock pinned to a configured timezone.

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DateTimeError {
    #[error("invalid timezone offset '{0}', expected '+HH:MM' or '-HH:MM'")]
    InvalidOffset(String),
}

/// Parse a fixed offset such as "+03:30" or "-05:00".
///
/// Returns None when the value is not of that shape or is out of range.
pub fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.split_at_checked(1)? {
        ("+", rest) => (1i32, rest),
        ("-", rest) => (-1i32, rest),
        _ => return None,
    };

    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Clock that reports and normalizes datetimes in the application timezone.
#[derive(Debug, Clone)]
pub struct DateTimeService {
    offset: FixedOffset,
}

impl DateTimeService {
    pub fn new(timezone: &str) -> Result<Self, DateTimeError> {
        let offset =
            parse_offset(timezone).ok_or_else(|| DateTimeError::InvalidOffset(timezone.into()))?;
        Ok(Self { offset })
    }

    /// Current datetime in the application timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Convert any datetime into the application timezone.
    pub fn normalize<Tz: chrono::TimeZone>(&self, value: DateTime<Tz>) -> DateTime<FixedOffset> {
        value.with_timezone(&self.offset)
    }

    pub fn timezone(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_positive_and_negative_offsets() {
        assert_eq!(parse_offset("+03:30").unwrap().local_minus_utc(), 12600);
        assert_eq!(parse_offset("-05:00").unwrap().local_minus_utc(), -18000);
        assert_eq!(parse_offset("+00:00").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_malformed_offsets() {
        assert!(parse_offset("utc").is_none());
        assert!(parse_offset("03:30").is_none());
        assert!(parse_offset("+3:30").is_none());
        assert!(parse_offset("+15:00").is_none());
        assert!(parse_offset("+03:75").is_none());
        assert!(parse_offset("").is_none());
    }

    #[test]
    fn normalize_preserves_the_instant() {
        let service = DateTimeService::new("+03:30").unwrap();
        let utc = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let local = service.normalize(utc);
        assert_eq!(local.timestamp(), utc.timestamp());
        assert_eq!(local.offset().local_minus_utc(), 12600);
    }

    #[test]
    fn bad_timezone_is_an_error() {
        assert!(DateTimeService::new("somewhere").is_err());
    }
}
