//! Output rows and summary statistics.
//!
//! - [`OutputRow`] - One hit of one role of one decay instance
//! - [`EventSummary`] - Counters for a single event
//! - [`BatchSummary`] - Counters accumulated over a run
//!
//! [`export_rows`] joins an event's candidates with their grouped hits.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::association::HitGroups;
use super::forest::ForestStats;
use super::types::{DecayCandidate, DetectorId, Role, TrackId};

/// One row of the output table.
///
/// Field order is fixed: event, decay instance key, role, position,
/// detector id. The track id of the hit is appended for convenience.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Event index within the batch
    pub event_index: usize,
    /// Root id of the decay instance
    pub decay_instance_key: TrackId,
    /// Role of the track that left the hit (serialized as 0..=3)
    pub role: Role,
    /// Hit position
    pub position: Vector3<f64>,
    /// Detector element id
    pub detector_id: DetectorId,
    /// Track that left the hit
    pub track_id: TrackId,
}

impl OutputRow {
    /// Distance of the hit from the beam axis
    #[inline]
    pub fn transverse_radius(&self) -> f64 {
        crate::common::geometry::transverse_radius(&self.position)
    }
}

/// Per-event counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Event index within the batch
    pub event_index: usize,
    /// Particle records in the event
    pub particles: usize,
    /// Candidates emitted (one per primary of the root species)
    pub candidates: usize,
    /// Candidates with all four slots filled
    pub complete_candidates: usize,
    /// Candidates contributing at least one row
    pub candidates_with_hits: usize,
    /// Hits grouped under a referenced track
    pub associated_hits: usize,
    /// Hits of unreferenced or unknown tracks
    pub dropped_hits: usize,
    /// Rows exported
    pub rows: usize,
    /// Non-negative mother ids that resolve to no particle
    pub dangling_mothers: usize,
}

/// Counters accumulated over a batch of events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Events processed
    pub events: usize,
    /// Events with at least one candidate
    pub events_with_candidates: usize,
    /// Particle records seen
    pub particles: usize,
    /// Candidates emitted
    pub candidates: usize,
    /// Candidates with all four slots filled
    pub complete_candidates: usize,
    /// Candidates contributing at least one row
    pub candidates_with_hits: usize,
    /// Hits grouped under a referenced track
    pub associated_hits: usize,
    /// Hits of unreferenced or unknown tracks
    pub dropped_hits: usize,
    /// Rows exported
    pub rows: usize,
    /// Dangling mother references seen
    pub dangling_mothers: usize,
}

impl BatchSummary {
    /// Add one event's counters
    pub fn record(&mut self, event: &EventSummary) {
        self.events += 1;
        if event.candidates > 0 {
            self.events_with_candidates += 1;
        }
        self.particles += event.particles;
        self.candidates += event.candidates;
        self.complete_candidates += event.complete_candidates;
        self.candidates_with_hits += event.candidates_with_hits;
        self.associated_hits += event.associated_hits;
        self.dropped_hits += event.dropped_hits;
        self.rows += event.rows;
        self.dangling_mothers += event.dangling_mothers;
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Rows of one event, in candidate order then role order then hit order.
///
/// Returns the rows together with the event's counters.
pub fn export_rows(
    event_index: usize,
    candidates: &[DecayCandidate],
    groups: &HitGroups,
    forest: &ForestStats,
) -> (Vec<OutputRow>, EventSummary) {
    let mut rows = Vec::with_capacity(groups.num_hits());
    let mut candidates_with_hits = 0;

    for candidate in candidates {
        let before = rows.len();
        for (role, track_id) in candidate.referenced_slots() {
            rows.extend(groups.hits(track_id).iter().map(|hit| OutputRow {
                event_index,
                decay_instance_key: candidate.key(),
                role,
                position: hit.position,
                detector_id: hit.detector_id,
                track_id,
            }));
        }
        if rows.len() > before {
            candidates_with_hits += 1;
        }
    }

    let summary = EventSummary {
        event_index,
        particles: forest.particles,
        candidates: candidates.len(),
        complete_candidates: candidates.iter().filter(|c| c.is_complete()).count(),
        candidates_with_hits,
        associated_hits: groups.num_hits(),
        dropped_hits: groups.dropped(),
        rows: rows.len(),
        dangling_mothers: forest.dangling_mothers,
    };
    (rows, summary)
}
