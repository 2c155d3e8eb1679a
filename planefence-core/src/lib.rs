//! planefence-core: collapse ADS-B sighting logs into per-aircraft fence records.
//!
//! No async and no process-wide state, just algorithms over a line stream.
//! The `planefence` binary supplies the configuration and owns the output
//! file.

pub mod config;
pub mod decode;
pub mod distance;
pub mod emit;
pub mod link;
pub mod run;
pub mod tracker;
pub mod types;

// Re-export commonly used types at crate root
pub use config::FenceConfig;
pub use decode::decode_line;
pub use distance::{haversine_km, DistanceEvaluator, DistanceMode, DistanceUnit};
pub use emit::write_csv;
pub use link::{LinkBuilder, TrackingService};
pub use run::{aggregate, RunStats};
pub use tracker::{FenceTracker, TrackEvent, TrackRecord};
pub use types::*;
