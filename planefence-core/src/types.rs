//! Shared types, error enum, and the decoded sighting for planefence-core.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// All errors produced by planefence-core.
#[derive(Debug, Error)]
pub enum FenceError {
    #[error("malformed row: expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },
    #[error("invalid distance unit '{0}': must be one of km, nm, mi, m")]
    InvalidUnit(String),
    #[error("invalid tracking service '{0}': must be adsbexchange or flightaware")]
    InvalidService(String),
    #[error("invalid distance mode '{0}': must be reported or computed")]
    InvalidMode(String),
    #[error("altitude correction must be a non-negative integer, got {0}")]
    NegativeAltitudeCorrection(i64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FenceError>;

// ---------------------------------------------------------------------------
// Sentinels
// ---------------------------------------------------------------------------

/// Substituted for an unparseable distance or altitude. Large enough to fall
/// outside any realistic fence.
pub const SENTINEL: f64 = 999_999.0;

/// Integer form of [`SENTINEL`] for altitudes.
pub const SENTINEL_ALTITUDE: i64 = 999_999;

/// Number of comma-separated fields in a socket30003 log row.
pub const FIELD_COUNT: usize = 12;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// ICAO 24-bit address as reported in the log, normalized to uppercase.
///
/// Kept as text rather than `[u8; 3]` because malformed identities still
/// take part in callsign backfill and must round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Length of a well-formed ICAO hex address.
    pub const LEN: usize = 6;

    pub fn new(raw: &str) -> Self {
        Identity(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used in tracking URLs.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Whether the address has the expected 6-character length.
    ///
    /// Identities failing this are never in-fence.
    pub fn is_well_formed(&self) -> bool {
        self.0.chars().count() == Self::LEN
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Sighting
// ---------------------------------------------------------------------------

/// One decoded log row. Numeric fields stay raw; the distance evaluator
/// decides how to interpret them.
#[derive(Debug, Clone, PartialEq)]
pub struct SightingEvent {
    pub identity: Identity,
    pub altitude: String,
    pub lat: String,
    pub lon: String,
    pub date: String,
    pub time: String,
    pub angle: String,
    pub distance: String,
    pub squawk: String,
    pub ground_speed: String,
    pub track: String,
    /// Trimmed; empty when the transponder has not sent one yet.
    pub callsign: String,
}

impl SightingEvent {
    /// `date + " " + time[..8]`, the heard timestamp stored on records.
    pub fn heard(&self) -> String {
        format!("{} {}", self.date, truncate_chars(&self.time, 8))
    }
}

/// First `n` characters of `s`, or all of it when shorter.
pub(crate) fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Emergency squawk lookup.
pub fn emergency_squawk(squawk: &str) -> Option<&'static str> {
    match squawk.trim() {
        "7500" => Some("Hijack"),
        "7600" => Some("Radio failure"),
        "7700" => Some("Emergency"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_normalized() {
        let id = Identity::new(" a4a567 ");
        assert_eq!(id.as_str(), "A4A567");
        assert_eq!(id.to_lowercase(), "a4a567");
        assert_eq!(id, Identity::new("A4A567"));
    }

    #[test]
    fn test_identity_length() {
        assert!(Identity::new("A12345").is_well_formed());
        assert!(!Identity::new("A1234").is_well_formed());
        assert!(!Identity::new("~A12345").is_well_formed());
        assert!(!Identity::new("").is_well_formed());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("12:34:56.789", 8), "12:34:56");
        assert_eq!(truncate_chars("12:34", 8), "12:34");
        assert_eq!(truncate_chars("", 8), "");
    }

    #[test]
    fn test_emergency_squawk() {
        assert_eq!(emergency_squawk("7500"), Some("Hijack"));
        assert_eq!(emergency_squawk("7600"), Some("Radio failure"));
        assert_eq!(emergency_squawk("7700"), Some("Emergency"));
        assert_eq!(emergency_squawk("1200"), None);
    }
}
