//! Per-event particle ancestry
//!
//! The forest maps every mother id to its children in input order and keeps
//! the primaries of the root species in input order. Match tie-breaks depend
//! on that order, so both containers are insertion-ordered.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use smallvec::SmallVec;
use std::collections::HashMap;

use super::types::{ParticleRecord, TrackId};

/// Children of one mother, in input order
pub type Children = SmallVec<[TrackId; 4]>;

/// Size statistics of one event's forest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ForestStats {
    /// Particle records in the event
    pub particles: usize,
    /// Primaries of the root species
    pub primaries: usize,
    /// Distinct mother ids, the primary sentinel(s) included
    pub mothers: usize,
    /// Non-negative mother ids that do not resolve to any record
    pub dangling_mothers: usize,
}

/// Ancestry index and primary set of one event.
///
/// Borrows the event's particle records; it is built, used by the matcher and
/// dropped before the next event.
#[derive(Debug, Clone)]
pub struct ParticleForest<'a> {
    particles: &'a [ParticleRecord],
    lookup: HashMap<TrackId, usize>,
    ancestry: IndexMap<TrackId, Children>,
    primaries: IndexSet<TrackId>,
}

impl<'a> ParticleForest<'a> {
    /// Build the forest in a single pass over the event's records.
    ///
    /// Every record is appended to the children of its mother id, primaries
    /// included (under their negative sentinel). Records that are primary and
    /// whose absolute code equals `root_species` join the primary set.
    pub fn build(particles: &'a [ParticleRecord], root_species: u32) -> Self {
        let mut lookup = HashMap::with_capacity(particles.len());
        let mut ancestry: IndexMap<TrackId, Children> = IndexMap::new();
        let mut primaries = IndexSet::new();

        for (index, particle) in particles.iter().enumerate() {
            // Duplicate ids keep their first record
            lookup.entry(particle.id).or_insert(index);

            if particle.is_primary() && particle.species() == root_species {
                primaries.insert(particle.id);
            }
            ancestry
                .entry(particle.mother_id)
                .or_default()
                .push(particle.id);
        }

        Self {
            particles,
            lookup,
            ancestry,
            primaries,
        }
    }

    /// Resolve a track id to its record
    #[inline]
    pub fn particle(&self, id: TrackId) -> Option<&'a ParticleRecord> {
        self.lookup.get(&id).map(|&index| &self.particles[index])
    }

    /// Children of a mother id in input order (empty when unknown)
    #[inline]
    pub fn children(&self, mother: TrackId) -> &[TrackId] {
        self.ancestry
            .get(&mother)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Primaries of the root species in input order
    #[inline]
    pub fn primaries(&self) -> &IndexSet<TrackId> {
        &self.primaries
    }

    /// Full ancestry index
    #[inline]
    pub fn ancestry(&self) -> &IndexMap<TrackId, Children> {
        &self.ancestry
    }

    /// Number of particle records
    #[inline]
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Size statistics
    pub fn stats(&self) -> ForestStats {
        let dangling_mothers = self
            .ancestry
            .keys()
            .filter(|&&mother| mother >= 0 && !self.lookup.contains_key(&mother))
            .count();
        ForestStats {
            particles: self.particles.len(),
            primaries: self.primaries.len(),
            mothers: self.ancestry.len(),
            dangling_mothers,
        }
    }
}
