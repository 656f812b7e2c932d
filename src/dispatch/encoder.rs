//! Text payload for a position fix.
//!
//! ```text
//! GPS Location:
//! LAT: <latitude, 6 decimals>
//! LON: <longitude, 6 decimals>
//! Timestamp: <milliseconds since the Unix epoch>
//! ```

use super::chunker::chunk_message;
use super::location::Position;
use chrono::{DateTime, Utc};

/// Single-message character limit of a plain GSM-7 SMS.
pub const DEFAULT_SEGMENT_LIMIT: usize = 160;

/// Rendered payload plus its ordered transport segments (never empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    body: String,
    segments: Vec<String>,
}

impl EncodedMessage {
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_multipart(&self) -> bool {
        self.segments.len() > 1
    }
}

/// Format one coordinate with exactly six fractional digits.
///
/// Uses Rust's `{:.6}`: the exact binary value is rounded to the nearest
/// six-decimal string, ties to even. The printed value is therefore never
/// more than 5e-7 away from the input.
pub fn format_coordinate(value: f64) -> String {
    format!("{value:.6}")
}

pub fn render(position: &Position, timestamp: DateTime<Utc>) -> String {
    format!(
        "GPS Location:\nLAT: {}\nLON: {}\nTimestamp: {}",
        format_coordinate(position.latitude()),
        format_coordinate(position.longitude()),
        timestamp.timestamp_millis()
    )
}

/// Render `position` and split it into segments of at most `segment_limit`
/// characters. A limit of zero is treated as one.
pub fn encode(
    position: &Position,
    timestamp: DateTime<Utc>,
    segment_limit: usize,
) -> EncodedMessage {
    let body = render(position, timestamp);
    let segments = chunk_message(&body, segment_limit.max(1));
    EncodedMessage { body, segments }
}

/// Recover `(latitude, longitude, timestamp_ms)` from a rendered payload.
pub fn parse(text: &str) -> Option<(f64, f64, i64)> {
    let mut lines = text.lines();
    if lines.next()? != "GPS Location:" {
        return None;
    }
    let latitude = lines.next()?.strip_prefix("LAT: ")?.parse().ok()?;
    let longitude = lines.next()?.strip_prefix("LON: ")?.parse().ok()?;
    let timestamp = lines.next()?.strip_prefix("Timestamp: ")?.parse().ok()?;
    if lines.next().is_some() {
        return None;
    }
    Some((latitude, longitude, timestamp))
}
