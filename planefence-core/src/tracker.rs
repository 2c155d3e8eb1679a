//! Per-aircraft summary table.
//!
//! Pure logic, no I/O. Each sighting is upserted by identity; a record is
//! created on the first in-fence sighting and only ever tightened after
//! that. Produces `TrackEvent` outputs the caller may log.

use std::collections::HashMap;

use crate::config::FenceConfig;
use crate::distance::{DistanceEvaluator, Evaluation};
use crate::link::LinkBuilder;
use crate::types::*;

// ---------------------------------------------------------------------------
// Track events (output)
// ---------------------------------------------------------------------------

/// What an upsert did.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// First in-fence sighting of this identity.
    NewRecord {
        identity: Identity,
        callsign: String,
        distance: f64,
        altitude: i64,
    },
    /// Existing record refreshed by another in-fence sighting.
    RecordUpdate { identity: Identity },
    /// Record's empty callsign filled in by a later sighting.
    CallsignBackfill {
        identity: Identity,
        callsign: String,
        in_fence: bool,
    },
    /// In-fence sighting squawking 7500/7600/7700.
    EmergencySquawk {
        identity: Identity,
        squawk: String,
        description: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Track record
// ---------------------------------------------------------------------------

/// Summary of one aircraft's presence inside the fence.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub identity: Identity,
    pub callsign: String,
    pub first_heard: String,
    pub last_heard: String,
    pub min_altitude: i64,
    pub min_distance: f64,
    pub tracking_link: String,
}

impl TrackRecord {
    fn new(s: &SightingEvent, eval: &Evaluation) -> Self {
        let heard = s.heard();
        TrackRecord {
            identity: s.identity.clone(),
            callsign: s.callsign.clone(),
            first_heard: heard.clone(),
            last_heard: heard,
            min_altitude: eval.altitude,
            min_distance: eval.distance,
            tracking_link: String::new(),
        }
    }

    /// Fold in a later in-fence sighting. Minima only move down.
    fn absorb(&mut self, s: &SightingEvent, eval: &Evaluation) {
        self.last_heard = s.heard();
        if eval.altitude < self.min_altitude {
            self.min_altitude = eval.altitude;
        }
        if eval.distance < self.min_distance {
            self.min_distance = eval.distance;
        }
    }
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Identity-keyed table of `TrackRecord`s, kept in creation order.
pub struct FenceTracker {
    evaluator: DistanceEvaluator,
    links: LinkBuilder,
    records: Vec<TrackRecord>,
    index: HashMap<Identity, usize>,

    // Counters
    pub sightings: u64,
    pub in_fence_sightings: u64,
}

impl FenceTracker {
    pub fn new(evaluator: DistanceEvaluator, links: LinkBuilder) -> Self {
        FenceTracker {
            evaluator,
            links,
            records: Vec::new(),
            index: HashMap::new(),
            sightings: 0,
            in_fence_sightings: 0,
        }
    }

    pub fn from_config(config: &FenceConfig) -> Self {
        Self::new(config.evaluator(), config.link_builder())
    }

    /// Upsert one sighting. Returns what changed.
    pub fn update(&mut self, s: &SightingEvent) -> Vec<TrackEvent> {
        self.sightings += 1;
        let mut events = Vec::new();
        let eval = self.evaluator.evaluate(s);
        let existing = self.index.get(&s.identity).copied();

        // A later sighting, even out of range, may carry the only callsign.
        if let Some(i) = existing {
            let rec = &mut self.records[i];
            if rec.callsign.is_empty() && !s.callsign.is_empty() {
                rec.callsign = s.callsign.clone();
                events.push(TrackEvent::CallsignBackfill {
                    identity: rec.identity.clone(),
                    callsign: rec.callsign.clone(),
                    in_fence: eval.in_fence,
                });
            }
        }

        if !eval.in_fence {
            return events;
        }
        self.in_fence_sightings += 1;

        let i = match existing {
            Some(i) => {
                self.records[i].absorb(s, &eval);
                events.push(TrackEvent::RecordUpdate {
                    identity: s.identity.clone(),
                });
                i
            }
            None => {
                let i = self.records.len();
                self.records.push(TrackRecord::new(s, &eval));
                self.index.insert(s.identity.clone(), i);
                events.push(TrackEvent::NewRecord {
                    identity: s.identity.clone(),
                    callsign: s.callsign.clone(),
                    distance: eval.distance,
                    altitude: eval.altitude,
                });
                i
            }
        };

        // Latest in-fence sighting owns the link, not the closest one.
        let rec = &mut self.records[i];
        rec.tracking_link = self
            .links
            .build(&rec.identity, &rec.callsign, &s.date, &s.time);

        if let Some(description) = emergency_squawk(&s.squawk) {
            events.push(TrackEvent::EmergencySquawk {
                identity: s.identity.clone(),
                squawk: s.squawk.clone(),
                description,
            });
        }

        events
    }

    pub fn get(&self, identity: &Identity) -> Option<&TrackRecord> {
        self.index.get(identity).map(|&i| &self.records[i])
    }

    /// Records in creation order.
    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<TrackRecord> {
        self.records
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
