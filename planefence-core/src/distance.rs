//! Effective distance and altitude of a sighting, and the fence test.
//!
//! Two run-wide modes: trust the logger's own distance column, or compute
//! the great-circle distance from the observer with the haversine formula.
//! Unparseable numbers never fail the run; they become [`SENTINEL`].

use std::fmt;
use std::str::FromStr;

use crate::types::*;

// ---------------------------------------------------------------------------
// Units and modes
// ---------------------------------------------------------------------------

/// Distance unit for the fence radius and the emitted minimum distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    Km,
    Nm,
    #[default]
    Mi,
    M,
}

impl DistanceUnit {
    /// Kilometres per one unit. Computed distances are divided by this.
    pub fn km_per_unit(self) -> f64 {
        match self {
            DistanceUnit::Km => 1.0,
            DistanceUnit::Nm => 1.852,
            DistanceUnit::Mi => 1.60934,
            DistanceUnit::M => 0.001,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Nm => "nm",
            DistanceUnit::Mi => "mi",
            DistanceUnit::M => "m",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = FenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "km" => Ok(DistanceUnit::Km),
            "nm" => Ok(DistanceUnit::Nm),
            "mi" => Ok(DistanceUnit::Mi),
            "m" => Ok(DistanceUnit::M),
            other => Err(FenceError::InvalidUnit(other.to_string())),
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a sighting's distance comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMode {
    /// The log's distance column, already in the configured unit.
    #[default]
    Reported,
    /// Haversine from the observer to the sighting's lat/lon.
    Computed,
}

impl DistanceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceMode::Reported => "reported",
            DistanceMode::Computed => "computed",
        }
    }
}

impl FromStr for DistanceMode {
    type Err = FenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "reported" => Ok(DistanceMode::Reported),
            "computed" => Ok(DistanceMode::Computed),
            other => Err(FenceError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for DistanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Haversine
// ---------------------------------------------------------------------------

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Effective distance/altitude of one sighting and its fence verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub distance: f64,
    pub altitude: i64,
    pub in_fence: bool,
}

/// Applies the run-wide distance mode, altitude correction, and fence limits.
#[derive(Debug, Clone)]
pub struct DistanceEvaluator {
    pub mode: DistanceMode,
    pub unit: DistanceUnit,
    pub observer_lat: f64,
    pub observer_lon: f64,
    pub max_distance: f64,
    pub max_altitude: f64,
    pub altitude_correction: i64,
}

impl DistanceEvaluator {
    /// Distance in the configured unit, or [`SENTINEL`] when it can't be had.
    pub fn distance(&self, s: &SightingEvent) -> f64 {
        match self.mode {
            DistanceMode::Reported => parse_finite(&s.distance).unwrap_or(SENTINEL),
            DistanceMode::Computed => match (parse_finite(&s.lat), parse_finite(&s.lon)) {
                (Some(lat), Some(lon)) => {
                    haversine_km(self.observer_lat, self.observer_lon, lat, lon)
                        / self.unit.km_per_unit()
                }
                _ => SENTINEL,
            },
        }
    }

    /// Reported altitude minus the correction, truncated toward zero.
    pub fn altitude(&self, s: &SightingEvent) -> i64 {
        match parse_finite(&s.altitude) {
            Some(alt) => (alt - self.altitude_correction as f64) as i64,
            None => SENTINEL_ALTITUDE,
        }
    }

    /// Both limits are inclusive and both must hold.
    pub fn in_fence(&self, distance: f64, altitude: i64) -> bool {
        distance <= self.max_distance && altitude as f64 <= self.max_altitude
    }

    pub fn evaluate(&self, s: &SightingEvent) -> Evaluation {
        let (distance, altitude) = if s.identity.is_well_formed() {
            (self.distance(s), self.altitude(s))
        } else {
            (SENTINEL, SENTINEL_ALTITUDE)
        };
        Evaluation {
            distance,
            altitude,
            in_fence: s.identity.is_well_formed() && self.in_fence(distance, altitude),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
