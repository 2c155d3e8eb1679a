//! Log row decoding.
//!
//! Input rows come from the socket30003 logger and look like
//! `ICAO,altitude,lat,lon,date,time,angle,distance,squawk,speed,track,callsign`.
//! Corrupted logs sometimes carry NUL bytes, which are removed before the
//! row is split.

use crate::types::*;

/// Remove embedded NUL bytes.
pub fn strip_nulls(line: &str) -> std::borrow::Cow<'_, str> {
    if line.contains('\0') {
        std::borrow::Cow::Owned(line.replace('\0', ""))
    } else {
        std::borrow::Cow::Borrowed(line)
    }
}

/// Whether a line carries nothing to decode once NULs and whitespace are gone.
pub fn is_blank(line: &str) -> bool {
    line.chars().all(|c| c == '\0' || c.is_whitespace())
}

/// Decode one raw log row.
///
/// Fails with [`FenceError::FieldCount`] unless the row has exactly
/// [`FIELD_COUNT`] fields. Numeric fields are not validated here.
pub fn decode_line(line: &str) -> Result<SightingEvent> {
    let clean = strip_nulls(line);
    let clean = clean.trim_end_matches(['\r', '\n']);

    let fields: Vec<&str> = clean.split(',').collect();
    if fields.len() != FIELD_COUNT {
        return Err(FenceError::FieldCount {
            expected: FIELD_COUNT,
            actual: fields.len(),
        });
    }

    Ok(SightingEvent {
        identity: Identity::new(fields[0]),
        altitude: fields[1].trim().to_string(),
        lat: fields[2].trim().to_string(),
        lon: fields[3].trim().to_string(),
        date: fields[4].trim().to_string(),
        time: fields[5].trim().to_string(),
        angle: fields[6].trim().to_string(),
        distance: fields[7].trim().to_string(),
        squawk: fields[8].trim().to_string(),
        ground_speed: fields[9].trim().to_string(),
        track: fields[10].trim().to_string(),
        callsign: fields[11].trim().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
