//! Tracking links to external flight-tracking sites.
//!
//! ADS-B Exchange links carry the UTC date and epoch of the sighting so the
//! globe opens on the right trace. The log records local wall-clock time;
//! it is pinned to a fixed UTC offset before conversion. A timestamp that
//! can't be converted degrades to a date-only link instead of failing.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};

use crate::types::*;

/// Accepted date+time layouts for the log's date and time columns.
const DATETIME_FORMATS: &[&str] = &["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// External tracking service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingService {
    #[default]
    AdsbExchange,
    FlightAware,
}

impl TrackingService {
    pub fn as_str(self) -> &'static str {
        match self {
            TrackingService::AdsbExchange => "adsbexchange",
            TrackingService::FlightAware => "flightaware",
        }
    }
}

impl FromStr for TrackingService {
    type Err = FenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "adsbexchange" => Ok(TrackingService::AdsbExchange),
            "flightaware" => Ok(TrackingService::FlightAware),
            other => Err(FenceError::InvalidService(other.to_string())),
        }
    }
}

impl fmt::Display for TrackingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a tracking URL for one sighting.
#[derive(Debug, Clone)]
pub struct LinkBuilder {
    pub service: TrackingService,
    pub observer_lat: f64,
    pub observer_lon: f64,
    /// Offset of the clock that wrote the log.
    pub utc_offset: FixedOffset,
}

impl LinkBuilder {
    /// Link for `identity` heard at `date`/`time`.
    ///
    /// `callsign` is the record's callsign (possibly backfilled), used only
    /// by FlightAware.
    pub fn build(&self, identity: &Identity, callsign: &str, date: &str, time: &str) -> String {
        match self.service {
            TrackingService::FlightAware => format!(
                "https://flightaware.com/live/modes/{}/ident/{}/redirect",
                identity.to_lowercase(),
                callsign.trim()
            ),
            TrackingService::AdsbExchange => self.adsbexchange(identity, date, time),
        }
    }

    fn adsbexchange(&self, identity: &Identity, date: &str, time: &str) -> String {
        let base = format!(
            "https://globe.adsbexchange.com/?icao={}&lat={}&lon={}&zoom=12",
            identity.to_lowercase(),
            self.observer_lat,
            self.observer_lon
        );

        match self.to_utc(date, time) {
            Some(utc) => format!(
                "{base}&showTrace={}&timestamp={}",
                utc.format("%Y-%m-%d"),
                utc.timestamp()
            ),
            None => format!("{base}&showTrace={}", raw_trace_date(date)),
        }
    }

    /// Local wall-clock `date time` to UTC, or `None` if it doesn't parse.
    pub fn to_utc(&self, date: &str, time: &str) -> Option<chrono::DateTime<Utc>> {
        let text = format!("{} {}", date.trim(), truncate_chars(time.trim(), 8));
        let naive = DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&text, fmt).ok())?;
        self.utc_offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc))
    }
}

/// `YYYY-MM-DD` cut straight out of the raw date column, whatever it holds.
fn raw_trace_date(date: &str) -> String {
    let part = |start: usize, end: usize| date.get(start..end.min(date.len())).unwrap_or("");
    format!("{}-{}-{}", part(0, 4), part(5, 7), part(8, 10))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(service: TrackingService, offset_hours: i32) -> LinkBuilder {
        LinkBuilder {
            service,
            observer_lat: 42.3966,
            observer_lon: -71.1773,
            utc_offset: FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        }
    }

    #[test]
    fn test_flightaware_link() {
        let b = builder(TrackingService::FlightAware, 0);
        let link = b.build(&Identity::new("A4A567"), "UAL123", "2020/08/12", "14:03:22");
        assert_eq!(
            link,
            "https://flightaware.com/live/modes/a4a567/ident/UAL123/redirect"
        );
    }

    #[test]
    fn test_adsbexchange_link_utc() {
        let b = builder(TrackingService::AdsbExchange, 0);
        let link = b.build(&Identity::new("A4A567"), "", "2020/08/12", "14:03:22.456");
        assert_eq!(
            link,
            "https://globe.adsbexchange.com/?icao=a4a567&lat=42.3966&lon=-71.1773\
             &zoom=12&showTrace=2020-08-12&timestamp=1597241002"
        );
    }

    #[test]
    fn test_adsbexchange_link_crosses_midnight() {
        // 22:30 at UTC-4 is 02:30 UTC the next day
        let b = builder(TrackingService::AdsbExchange, -4);
        let link = b.build(&Identity::new("A4A567"), "", "2020/08/12", "22:30:00");
        assert!(link.contains("&showTrace=2020-08-13&"), "{link}");
        assert!(link.ends_with("&timestamp=1597285800"), "{link}");
    }

    #[test]
    fn test_adsbexchange_dash_dates() {
        let b = builder(TrackingService::AdsbExchange, 0);
        let utc = b.to_utc("2020-08-12", "14:03:22").unwrap();
        assert_eq!(utc.timestamp(), 1597241002);
    }

    #[test]
    fn test_adsbexchange_degraded_link() {
        let b = builder(TrackingService::AdsbExchange, 0);
        let link = b.build(&Identity::new("A4A567"), "", "2020/08/12", "garbage");
        assert_eq!(
            link,
            "https://globe.adsbexchange.com/?icao=a4a567&lat=42.3966&lon=-71.1773\
             &zoom=12&showTrace=2020-08-12"
        );
        assert!(!link.contains("timestamp"));
    }

    #[test]
    fn test_degraded_link_short_date() {
        let b = builder(TrackingService::AdsbExchange, 0);
        let link = b.build(&Identity::new("A4A567"), "", "20", "");
        assert!(link.ends_with("&showTrace=20--"), "{link}");
    }

    #[test]
    fn test_parse_service() {
        assert_eq!(
            "flightaware".parse::<TrackingService>().unwrap(),
            TrackingService::FlightAware
        );
        assert!(matches!(
            "fr24".parse::<TrackingService>(),
            Err(FenceError::InvalidService(_))
        ));
    }
}
