//! One pass over a sighting log.
//!
//! Rows are processed strictly in arrival order. A row with the wrong
//! number of fields is skipped and counted, never fatal; a read error is
//! fatal so that no partial result is ever emitted.

use std::io::BufRead;

use tracing::{debug, info, warn};

use crate::config::FenceConfig;
use crate::decode::{decode_line, is_blank};
use crate::tracker::{FenceTracker, TrackEvent};
use crate::types::*;

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Non-blank lines seen, decoded or not.
    pub rows: u64,
    pub malformed_rows: u64,
    pub blank_lines: u64,
    pub in_fence_sightings: u64,
    pub records: usize,
}

/// Stream `reader` through a fresh tracker built from `config`.
pub fn aggregate<R: BufRead>(reader: R, config: &FenceConfig) -> Result<(FenceTracker, RunStats)> {
    config.validate()?;

    let mut tracker = FenceTracker::from_config(config);
    let mut stats = RunStats::default();

    // Split on raw bytes: corrupted logs are not guaranteed to be UTF-8.
    for (n, line) in reader.split(b'\n').enumerate() {
        let bytes = line?;
        let line = String::from_utf8_lossy(&bytes);
        if is_blank(&line) {
            stats.blank_lines += 1;
            continue;
        }
        stats.rows += 1;

        let sighting = match decode_line(&line) {
            Ok(s) => s,
            Err(e) => {
                stats.malformed_rows += 1;
                debug!(line = n + 1, error = %e, "skipping row");
                continue;
            }
        };

        for event in tracker.update(&sighting) {
            log_event(&event);
        }
    }

    stats.in_fence_sightings = tracker.in_fence_sightings;
    stats.records = tracker.len();
    info!(
        rows = stats.rows,
        malformed = stats.malformed_rows,
        in_fence = stats.in_fence_sightings,
        records = stats.records,
        "processed log"
    );

    Ok((tracker, stats))
}

fn log_event(event: &TrackEvent) {
    match event {
        TrackEvent::NewRecord {
            identity,
            callsign,
            distance,
            altitude,
        } => debug!(%identity, %callsign, distance, altitude, "new aircraft in fence"),
        TrackEvent::CallsignBackfill {
            identity,
            callsign,
            in_fence,
        } => debug!(%identity, %callsign, in_fence, "added flight number"),
        TrackEvent::EmergencySquawk {
            identity,
            squawk,
            description,
        } => warn!(%identity, %squawk, "{description} squawk inside fence"),
        TrackEvent::RecordUpdate { .. } => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config() -> FenceConfig {
        FenceConfig {
            max_distance: 2.0,
            max_altitude: 5000.0,
            ..FenceConfig::default()
        }
    }

    #[test]
    fn test_skip_and_count_malformed() {
        let log = "\
A12345,3000,42.39,-71.17,2020/08/12,10:00:00.000,0,1.0,1200,0,0,UAL123
this line is garbage
A12345,2500,42.39,-71.17,2020/08/12,10:00:01.000,0,1.1,1200,0,0,UAL123

A12345,2500,42.39
";
        let (tracker, stats) = aggregate(Cursor::new(log), &config()).unwrap();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.malformed_rows, 2);
        assert_eq!(stats.blank_lines, 1);
        assert_eq!(stats.in_fence_sightings, 2);
        assert_eq!(stats.records, 1);
        assert_eq!(tracker.records()[0].min_altitude, 2500);
    }

    #[test]
    fn test_null_bytes_and_invalid_utf8() {
        let mut log = b"A12345,3000,42.39,-71.17,2020/08/12,10:00:00,0,1.0,\x00\x00,0,0,UAL1\n".to_vec();
        log.extend_from_slice(b"\xff\xfe\x00\n");
        let (tracker, stats) = aggregate(Cursor::new(log), &config()).unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.malformed_rows, 1);
        assert_eq!(tracker.records()[0].callsign, "UAL1");
    }

    #[test]
    fn test_invalid_config_rejected_before_reading() {
        let bad = FenceConfig {
            altitude_correction: -1,
            ..config()
        };
        assert!(matches!(
            aggregate(Cursor::new(""), &bad),
            Err(FenceError::NegativeAltitudeCorrection(-1))
        ));
    }

    #[test]
    fn test_empty_input() {
        let (tracker, stats) = aggregate(Cursor::new(""), &config()).unwrap();
        assert!(tracker.is_empty());
        assert_eq!(stats, RunStats::default());
    }
}
