//! CSV output of finished records.
//!
//! Seven columns, no header, one row per record in creation order:
//! `identity,callsign,first_heard,last_heard,min_altitude,min_distance,link`.

use std::io::Write;

use serde::Serialize;

use crate::tracker::TrackRecord;
use crate::types::*;

#[derive(Serialize)]
struct CsvRow<'a> {
    identity: &'a Identity,
    callsign: &'a str,
    first_heard: &'a str,
    last_heard: &'a str,
    min_altitude: i64,
    min_distance: String,
    tracking_link: &'a str,
}

impl<'a> From<&'a TrackRecord> for CsvRow<'a> {
    fn from(rec: &'a TrackRecord) -> Self {
        CsvRow {
            identity: &rec.identity,
            callsign: &rec.callsign,
            first_heard: &rec.first_heard,
            last_heard: &rec.last_heard,
            min_altitude: rec.min_altitude,
            min_distance: format!("{:.1}", rec.min_distance),
            tracking_link: &rec.tracking_link,
        }
    }
}

/// Write `records` as CSV. Writes nothing at all for an empty slice.
/// Returns the number of rows written.
pub fn write_csv<W: Write>(records: &[TrackRecord], out: W) -> Result<usize> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);
    for rec in records {
        writer.serialize(CsvRow::from(rec))?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// CSV text for `records`, empty when there are none.
pub fn to_csv_string(records: &[TrackRecord]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| FenceError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(icao: &str, callsign: &str, dist: f64) -> TrackRecord {
        TrackRecord {
            identity: Identity::new(icao),
            callsign: callsign.into(),
            first_heard: "2020/08/12 10:00:00".into(),
            last_heard: "2020/08/12 10:03:10".into(),
            min_altitude: 2500,
            min_distance: dist,
            tracking_link: "https://flightaware.com/live/modes/a12345/ident/UAL123/redirect".into(),
        }
    }

    #[test]
    fn test_csv_row_layout() {
        let csv = to_csv_string(&[record("A12345", "UAL123", 1.24)]).unwrap();
        assert_eq!(
            csv,
            "A12345,UAL123,2020/08/12 10:00:00,2020/08/12 10:03:10,2500,1.2,\
             https://flightaware.com/live/modes/a12345/ident/UAL123/redirect\n"
        );
    }

    #[test]
    fn test_csv_empty_callsign_and_rounding() {
        let csv = to_csv_string(&[record("B00001", "", 0.06)]).unwrap();
        assert!(csv.starts_with("B00001,,2020/08/12 10:00:00,"));
        assert!(csv.contains(",2500,0.1,"));
    }

    #[test]
    fn test_csv_preserves_order() {
        let csv = to_csv_string(&[record("C00001", "", 1.0), record("A00001", "", 1.0)]).unwrap();
        let ids: Vec<&str> = csv.lines().map(|l| &l[..6]).collect();
        assert_eq!(ids, ["C00001", "A00001"]);
    }

    #[test]
    fn test_csv_nothing_for_no_records() {
        let mut buf = Vec::new();
        assert_eq!(write_csv(&[], &mut buf).unwrap(), 0);
        assert!(buf.is_empty());
    }
}
