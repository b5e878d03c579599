use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Basic UTC pattern written by older clients, e.g. `2024-01-15T10:30:00Z`
const BASIC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
/// Millisecond UTC pattern, e.g. `2024-01-15T10:30:00.123Z`
const MILLIS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Handles parsing timestamps from the formats found in session transcripts
pub struct TimestampParser;

impl TimestampParser {
    /// Parse a timestamp string into a DateTime<Utc>
    ///
    /// Accepts RFC3339 with or without fractional seconds and the fixed `...Z` patterns.
    /// As a last resort a fractional part between `.` and a later `Z` is stripped and the
    /// basic pattern retried.
    pub fn parse(timestamp_str: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp_str) {
            return Ok(dt.with_timezone(&Utc));
        }

        for format in [BASIC_FORMAT, MILLIS_FORMAT] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp_str, format) {
                return Ok(naive.and_utc());
            }
        }

        if let Some(stripped) = Self::strip_fraction(timestamp_str) {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&stripped, BASIC_FORMAT) {
                return Ok(naive.and_utc());
            }
        }

        anyhow::bail!("Failed to parse timestamp: {}", timestamp_str)
    }

    fn strip_fraction(timestamp_str: &str) -> Option<String> {
        let dot = timestamp_str.find('.').filter(|&idx| idx > 0)?;
        timestamp_str[dot..].find('Z').filter(|&idx| idx > 0)?;
        Some(format!("{}Z", &timestamp_str[..dot]))
    }
}
