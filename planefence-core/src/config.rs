//! Configuration file management for planefence.
//!
//! Reads/writes `~/.planefence/config.yaml` with the observer position,
//! fence limits, distance unit/mode, and tracking service. The CLI layers
//! its flags on top of whatever this produces.

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Local, Offset};

use crate::distance::{DistanceEvaluator, DistanceMode, DistanceUnit};
use crate::link::{LinkBuilder, TrackingService};
use crate::types::*;

/// Everything a run needs, already parsed.
#[derive(Debug, Clone)]
pub struct FenceConfig {
    /// Observer position, decimal degrees.
    pub lat: f64,
    pub lon: f64,
    /// Fence radius in `unit`.
    pub max_distance: f64,
    pub max_altitude: f64,
    /// Subtracted from every reported altitude. Must not be negative.
    pub altitude_correction: i64,
    pub unit: DistanceUnit,
    pub mode: DistanceMode,
    pub service: TrackingService,
    /// Offset of the clock that wrote the log.
    pub utc_offset: FixedOffset,
}

impl Default for FenceConfig {
    fn default() -> Self {
        FenceConfig {
            lat: 42.3966,
            lon: -71.1773,
            max_distance: 2.0,
            max_altitude: 99999.0,
            altitude_correction: 0,
            unit: DistanceUnit::Mi,
            mode: DistanceMode::Reported,
            service: TrackingService::AdsbExchange,
            utc_offset: Local::now().offset().fix(),
        }
    }
}

impl FenceConfig {
    /// Reject values that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.altitude_correction < 0 {
            return Err(FenceError::NegativeAltitudeCorrection(
                self.altitude_correction,
            ));
        }
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(FenceError::Config(format!(
                "observer position must be finite, got {}, {}",
                self.lat, self.lon
            )));
        }
        Ok(())
    }

    pub fn evaluator(&self) -> DistanceEvaluator {
        DistanceEvaluator {
            mode: self.mode,
            unit: self.unit,
            observer_lat: self.lat,
            observer_lon: self.lon,
            max_distance: self.max_distance,
            max_altitude: self.max_altitude,
            altitude_correction: self.altitude_correction,
        }
    }

    pub fn link_builder(&self) -> LinkBuilder {
        LinkBuilder {
            service: self.service,
            observer_lat: self.lat,
            observer_lon: self.lon,
            utc_offset: self.utc_offset,
        }
    }
}

/// Get the config directory path (`~/.planefence/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".planefence")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `path`.
///
/// A missing file yields the defaults. A present but invalid file is an
/// error: a typo in the unit must not silently become miles.
pub fn load_config(path: &Path) -> Result<FenceConfig> {
    if !path.exists() {
        return Ok(FenceConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to `path`, creating its directory.
pub fn save_config(config: &FenceConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FenceError::Config(e.to_string()))?;
    }
    std::fs::write(path, serialize_config(config))
        .map_err(|e| FenceError::Config(e.to_string()))?;
    Ok(())
}

/// Parse simple YAML-like config text.
fn parse_config(text: &str) -> Result<FenceConfig> {
    let mut config = FenceConfig::default();
    let mut current_section: Option<String> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = val.is_empty().then(|| key.to_string());
            continue;
        }
        let Some(section) = current_section.as_deref() else {
            continue;
        };
        let Some(val) = parse_string_value(val) else {
            continue;
        };

        match (section, key) {
            ("receiver", "lat") => config.lat = parse_float(key, &val)?,
            ("receiver", "lon") => config.lon = parse_float(key, &val)?,
            ("fence", "max_distance") => config.max_distance = parse_float(key, &val)?,
            ("fence", "max_altitude") => config.max_altitude = parse_float(key, &val)?,
            ("fence", "altitude_correction") => {
                config.altitude_correction = val
                    .parse()
                    .map_err(|_| FenceError::Config(format!("{key}: not an integer: {val}")))?
            }
            ("fence", "unit") => config.unit = val.parse()?,
            ("fence", "mode") => config.mode = val.parse()?,
            ("tracking", "service") => config.service = val.parse()?,
            _ => {}
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float(key: &str, val: &str) -> Result<f64> {
    val.parse()
        .map_err(|_| FenceError::Config(format!("{key}: not a number: {val}")))
}

/// Serialize config to YAML-like text. The UTC offset is not persisted;
/// it always comes from the host clock.
fn serialize_config(config: &FenceConfig) -> String {
    let lines = [
        "# planefence configuration".to_string(),
        String::new(),
        "receiver:".into(),
        format!("  lat: {}", config.lat),
        format!("  lon: {}", config.lon),
        String::new(),
        "fence:".into(),
        format!("  max_distance: {}", config.max_distance),
        format!("  max_altitude: {}", config.max_altitude),
        format!("  altitude_correction: {}", config.altitude_correction),
        format!("  unit: \"{}\"", config.unit),
        format!("  mode: \"{}\"", config.mode),
        String::new(),
        "tracking:".into(),
        format!("  service: \"{}\"", config.service),
    ];
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FenceConfig::default();
        assert_eq!(config.max_distance, 2.0);
        assert_eq!(config.max_altitude, 99999.0);
        assert_eq!(config.unit, DistanceUnit::Mi);
        assert_eq!(config.mode, DistanceMode::Reported);
        assert_eq!(config.service, TrackingService::AdsbExchange);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
receiver:
  lat: 35.5
  lon: -82.5

fence:
  max_distance: 3.5
  max_altitude: 6000
  altitude_correction: 150
  unit: "nm"
  mode: computed

tracking:
  service: 'flightaware'
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.lat, 35.5);
        assert_eq!(config.lon, -82.5);
        assert_eq!(config.max_distance, 3.5);
        assert_eq!(config.max_altitude, 6000.0);
        assert_eq!(config.altitude_correction, 150);
        assert_eq!(config.unit, DistanceUnit::Nm);
        assert_eq!(config.mode, DistanceMode::Computed);
        assert_eq!(config.service, TrackingService::FlightAware);
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = r#"
receiver:
  lat: null
  lon: ~
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.lat, 42.3966);
        assert_eq!(config.lon, -71.1773);
    }

    #[test]
    fn test_parse_config_rejects_bad_values() {
        assert!(matches!(
            parse_config("fence:\n  unit: furlong\n"),
            Err(FenceError::InvalidUnit(_))
        ));
        assert!(matches!(
            parse_config("tracking:\n  service: fr24\n"),
            Err(FenceError::InvalidService(_))
        ));
        assert!(matches!(
            parse_config("fence:\n  altitude_correction: -5\n"),
            Err(FenceError::NegativeAltitudeCorrection(-5))
        ));
        assert!(matches!(
            parse_config("receiver:\n  lat: north\n"),
            Err(FenceError::Config(_))
        ));
    }

    #[test]
    fn test_roundtrip() {
        let config = FenceConfig {
            lat: 35.5,
            lon: -82.5,
            max_distance: 1.5,
            max_altitude: 4000.0,
            altitude_correction: 20,
            unit: DistanceUnit::Km,
            mode: DistanceMode::Computed,
            service: TrackingService::FlightAware,
            ..FenceConfig::default()
        };
        let parsed = parse_config(&serialize_config(&config)).unwrap();
        assert_eq!(parsed.lat, 35.5);
        assert_eq!(parsed.max_distance, 1.5);
        assert_eq!(parsed.altitude_correction, 20);
        assert_eq!(parsed.unit, DistanceUnit::Km);
        assert_eq!(parsed.mode, DistanceMode::Computed);
        assert_eq!(parsed.service, TrackingService::FlightAware);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let config = load_config(Path::new("/nonexistent/planefence/config.yaml")).unwrap();
        assert_eq!(config.max_distance, 2.0);
    }
}
