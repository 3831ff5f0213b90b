//! Timestamp helpers.
//!
//! Issues carry millisecond-precision UTC timestamps. The stored text form and
//! the wire form are both RFC3339 with exactly three fractional digits, so the
//! same string can be compared for equality in SQL and in filters.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Current time truncated to milliseconds.
#[must_use]
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC3339 timestamp, normalizing to UTC at millisecond precision.
///
/// Returns `None` for anything that is not RFC3339.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc).trunc_subsecs(3))
}

/// Parse an RFC3339 timestamp that names a whole millisecond.
///
/// Unlike [`parse_timestamp`] nothing is truncated: a value with non-zero
/// digits below the millisecond yields `None`.
#[must_use]
pub fn parse_exact_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s.trim()).ok()?;
    (dt.timestamp_subsec_nanos() % 1_000_000 == 0).then(|| dt.with_timezone(&Utc))
}

/// Serde adapter for millisecond RFC3339 timestamps.
pub mod rfc3339_millis {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serialize a timestamp with exactly three fractional digits.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(dt))
    }

    /// Deserialize any RFC3339 timestamp.
    ///
    /// # Errors
    ///
    /// Fails if the input is not an RFC3339 string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse_timestamp(&value)
            .ok_or_else(|| de::Error::custom(format!("invalid RFC3339 timestamp: {value}")))
    }
}
