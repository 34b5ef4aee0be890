//! Timestamp normalization
//!
//! Artifact sources store time in different epochs and precisions. Every raw
//! value is converted into a [`Timestamp`] before it becomes part of an event.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Precision and epoch of a raw source timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Whole seconds since 1970-01-01 00:00:00 UTC
    Seconds,
    /// Microseconds since 1970-01-01 00:00:00 UTC
    Microseconds,
}

impl TimeUnit {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Microseconds => "microseconds",
        }
    }
}

/// Errors raised while normalizing a raw timestamp
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    /// The raw value cannot be represented as a calendar date
    #[error("Invalid timestamp: {value} {unit} is out of range")]
    InvalidTimestamp {
        /// The raw value as read from the source
        value: i64,
        /// The unit the value was interpreted in
        unit: &'static str,
    },
}

/// An absolute point in time, stored as microseconds since the Unix epoch
///
/// Timestamps are totally ordered, so events from different sources can be
/// merged into one timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from microseconds since the Unix epoch
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_domain::Timestamp;
    ///
    /// let ts = Timestamp::from_micros(1_609_459_200_000_000).unwrap();
    /// assert_eq!(ts.to_rfc3339(), "2021-01-01T00:00:00Z");
    /// ```
    pub fn from_micros(micros: i64) -> Result<Self, TimestampError> {
        let ts = Self(micros);
        ts.to_datetime().map(|_| ts)
    }

    /// Microseconds since the Unix epoch
    pub fn as_micros(&self) -> i64 {
        self.0
    }

    /// Whole seconds since the Unix epoch (rounded towards negative infinity)
    pub fn as_secs(&self) -> i64 {
        self.0.div_euclid(MICROS_PER_SECOND)
    }

    /// Convert to a UTC calendar date-time
    pub fn to_datetime(&self) -> Result<OffsetDateTime, TimestampError> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000).map_err(|_| {
            TimestampError::InvalidTimestamp {
                value: self.0,
                unit: TimeUnit::Microseconds.as_str(),
            }
        })
    }

    /// Render as an RFC 3339 string in UTC
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime()
            .ok()
            .and_then(|dt| dt.format(&Rfc3339).ok())
            .unwrap_or_else(|| format!("{}us", self.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// Normalize a raw source value into a [`Timestamp`]
///
/// A raw value of zero or `None` means "field not set" in every source format
/// handled here, so it normalizes to `Ok(None)` and never to the epoch itself.
/// Values that cannot be represented as a calendar date yield
/// [`TimestampError::InvalidTimestamp`]; callers skip that timestamp role.
///
/// # Examples
///
/// ```
/// use strata_domain::{normalize, TimeUnit};
///
/// assert_eq!(normalize(Some(0), TimeUnit::Seconds), Ok(None));
/// assert_eq!(normalize(None, TimeUnit::Microseconds), Ok(None));
///
/// let ts = normalize(Some(1_609_459_260), TimeUnit::Seconds).unwrap().unwrap();
/// assert_eq!(ts.to_rfc3339(), "2021-01-01T00:01:00Z");
/// ```
pub fn normalize(raw: Option<i64>, unit: TimeUnit) -> Result<Option<Timestamp>, TimestampError> {
    let value = match raw {
        None | Some(0) => return Ok(None),
        Some(value) => value,
    };

    let micros = match unit {
        TimeUnit::Seconds => value.checked_mul(MICROS_PER_SECOND),
        TimeUnit::Microseconds => Some(value),
    }
    .ok_or(TimestampError::InvalidTimestamp {
        value,
        unit: unit.as_str(),
    })?;

    Timestamp::from_micros(micros)
        .map(Some)
        .map_err(|_| TimestampError::InvalidTimestamp {
            value,
            unit: unit.as_str(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_absent() {
        assert_eq!(normalize(Some(0), TimeUnit::Seconds), Ok(None));
        assert_eq!(normalize(Some(0), TimeUnit::Microseconds), Ok(None));
    }

    #[test]
    fn test_null_is_absent() {
        assert_eq!(normalize(None, TimeUnit::Seconds), Ok(None));
        assert_eq!(normalize(None, TimeUnit::Microseconds), Ok(None));
    }

    #[test]
    fn test_seconds() {
        let ts = normalize(Some(1_609_459_200), TimeUnit::Seconds)
            .unwrap()
            .unwrap();
        assert_eq!(ts.as_micros(), 1_609_459_200_000_000);
        assert_eq!(ts.to_rfc3339(), "2021-01-01T00:00:00Z");
    }

    #[test]
    fn test_microseconds() {
        let ts = normalize(Some(1_000_000), TimeUnit::Microseconds)
            .unwrap()
            .unwrap();
        assert_eq!(ts.as_secs(), 1);
        assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:01Z");
    }

    #[test]
    fn test_sub_second_precision_is_kept() {
        let ts = normalize(Some(1_234_567), TimeUnit::Microseconds)
            .unwrap()
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:01.234567Z");
    }

    #[test]
    fn test_seconds_overflow_is_invalid() {
        let result = normalize(Some(i64::MAX), TimeUnit::Seconds);
        assert!(matches!(
            result,
            Err(TimestampError::InvalidTimestamp { unit: "seconds", .. })
        ));
    }

    #[test]
    fn test_out_of_calendar_range_is_invalid() {
        // Year 10000 and beyond cannot be represented.
        let result = normalize(Some(253_402_300_800), TimeUnit::Seconds);
        assert!(result.is_err());
    }

    #[test]
    fn test_ordering() {
        let a = normalize(Some(1), TimeUnit::Seconds).unwrap().unwrap();
        let b = normalize(Some(1_000_001), TimeUnit::Microseconds)
            .unwrap()
            .unwrap();
        assert!(a < b);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: seconds and microseconds agree on the same instant
        #[test]
        fn test_units_agree(secs in 1i64..4_102_444_800) {
            let from_secs = normalize(Some(secs), TimeUnit::Seconds).unwrap();
            let from_micros = normalize(Some(secs * 1_000_000), TimeUnit::Microseconds).unwrap();
            prop_assert_eq!(from_secs, from_micros);
        }

        /// Property: a non-zero in-range value is never mapped to "absent"
        #[test]
        fn test_non_zero_is_present(micros in 1i64..4_102_444_800_000_000) {
            let ts = normalize(Some(micros), TimeUnit::Microseconds).unwrap();
            prop_assert_eq!(ts.map(|t| t.as_micros()), Some(micros));
        }
    }
}
