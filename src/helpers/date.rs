//! Timestamp helpers for export date fields

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use thiserror::Error;

/// Format name selecting RFC 3339 parsing (the Ghost 1.x+ export layout)
pub const RFC3339: &str = "rfc3339";

/// Errors raised while reading a raw timestamp
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("cannot parse {value:?} with format {format:?}")]
    Unparsable { value: String, format: String },

    #[error("unsupported timestamp value: {0}")]
    UnsupportedType(String),
}

/// Flexible parser for `published_at` / `created_at` style fields
///
/// Older exports store milliseconds since the epoch, newer ones store strings.
/// Strings are read with the configured chrono format; formats without an
/// offset are interpreted in the configured timezone.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    format: String,
    timezone: Tz,
}

impl Default for TimestampParser {
    fn default() -> Self {
        Self::new(RFC3339, Tz::UTC)
    }
}

impl TimestampParser {
    /// Create a parser for the given chrono format and timezone
    pub fn new(format: &str, timezone: Tz) -> Self {
        Self {
            format: format.to_string(),
            timezone,
        }
    }

    /// Parse a raw JSON timestamp. `null` and empty strings are unset, not errors.
    pub fn parse(&self, raw: &Value) -> Result<Option<DateTime<Utc>>, TimestampError> {
        match raw {
            Value::Null => Ok(None),
            Value::Number(n) => {
                let millis = n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f as i64))
                    .ok_or_else(|| TimestampError::UnsupportedType(n.to_string()))?;
                from_millis(millis).map(Some)
            }
            Value::String(s) => self.parse_str(s),
            other => Err(TimestampError::UnsupportedType(other.to_string())),
        }
    }

    fn parse_str(&self, s: &str) -> Result<Option<DateTime<Utc>>, TimestampError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }

        if let Ok(millis) = s.parse::<i64>() {
            return from_millis(millis).map(Some);
        }

        let unparsable = || TimestampError::Unparsable {
            value: s.to_string(),
            format: self.format.clone(),
        };

        if self.format.is_empty() || self.format.eq_ignore_ascii_case(RFC3339) {
            return DateTime::parse_from_rfc3339(s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|_| unparsable());
        }

        // Format carries its own offset
        if let Ok(dt) = DateTime::parse_from_str(s, &self.format) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }

        let naive = NaiveDateTime::parse_from_str(s, &self.format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, &self.format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(unparsable)?;

        self.timezone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .ok_or_else(unparsable)
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| TimestampError::UnsupportedType(millis.to_string()))
}
