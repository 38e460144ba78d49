//! Hit association
//!
//! Groups an event's hits by track id, keeping only tracks that fill a role
//! slot of some candidate. Hits of any other track, including track ids that
//! resolve to no particle at all, are dropped without error.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

use super::types::{DecayCandidate, HitRecord, TrackId};

/// Hits of the referenced tracks, grouped by track id.
///
/// Groups appear in order of first hit; hits within a group keep input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HitGroups {
    groups: IndexMap<TrackId, Vec<HitRecord>>,
    dropped: usize,
}

impl HitGroups {
    /// Hits left by a track (empty when the track has none)
    #[inline]
    pub fn hits(&self, track: TrackId) -> &[HitRecord] {
        self.groups.get(&track).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over (track id, hits) in group order
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &[HitRecord])> {
        self.groups.iter().map(|(&id, hits)| (id, hits.as_slice()))
    }

    /// Number of tracks with at least one hit
    #[inline]
    pub fn num_tracks(&self) -> usize {
        self.groups.len()
    }

    /// Total number of associated hits
    pub fn num_hits(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Hits that did not belong to a referenced track
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// True when no hit was associated
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Track ids referenced by the candidates' role slots.
///
/// Unfilled slots contribute nothing; the root of a candidate without an
/// intermediate is left out.
pub fn referenced_tracks(candidates: &[DecayCandidate]) -> HashSet<TrackId> {
    candidates
        .iter()
        .flat_map(|c| c.referenced_slots().map(|(_, id)| id))
        .collect()
}

/// Group hits by track id, restricted to the candidates' referenced tracks
pub fn associate_hits(candidates: &[DecayCandidate], hits: &[HitRecord]) -> HitGroups {
    let referenced = referenced_tracks(candidates);
    let mut result = HitGroups::default();
    if referenced.is_empty() {
        result.dropped = hits.len();
        return result;
    }

    for hit in hits {
        if referenced.contains(&hit.track_id) {
            result.groups.entry(hit.track_id).or_default().push(*hit);
        } else {
            result.dropped += 1;
        }
    }
    result
}
