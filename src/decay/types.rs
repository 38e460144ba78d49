//! Truth particle, detector hit and decay candidate types
//!
//! This module defines the per-event input records and the matched decay
//! candidates produced from them.

use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Track identifier (index of the particle record within its event)
pub type TrackId = i32;

/// Signed PDG species code (sign distinguishes particle from antiparticle)
pub type PdgCode = i32;

/// Detector element identifier attached to a hit
pub type DetectorId = u32;

/// Canonical mother id carried by primary particles
pub const PRIMARY_MOTHER: TrackId = -1;

/// A single Monte-Carlo truth particle.
///
/// Any negative `mother_id` marks a primary particle. A non-negative
/// `mother_id` is expected to name another record of the same event, but the
/// reference is not guaranteed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Track id, unique within the event
    pub id: TrackId,
    /// Id of the mother track, negative for primaries
    #[serde(default = "primary_mother")]
    pub mother_id: TrackId,
    /// Signed species code
    pub pdg_code: PdgCode,
    /// Creation vertex
    pub vertex: Vector3<f64>,
}

fn primary_mother() -> TrackId {
    PRIMARY_MOTHER
}

impl ParticleRecord {
    /// Create a new particle record
    pub fn new(id: TrackId, mother_id: TrackId, pdg_code: PdgCode, vertex: Vector3<f64>) -> Self {
        Self {
            id,
            mother_id,
            pdg_code,
            vertex,
        }
    }

    /// Create a primary particle (no mother)
    pub fn primary(id: TrackId, pdg_code: PdgCode, vertex: Vector3<f64>) -> Self {
        Self::new(id, PRIMARY_MOTHER, pdg_code, vertex)
    }

    /// Whether this particle was produced directly in the collision
    #[inline]
    pub fn is_primary(&self) -> bool {
        self.mother_id < 0
    }

    /// Mother track id, `None` for primaries
    #[inline]
    pub fn mother(&self) -> Option<TrackId> {
        if self.is_primary() {
            None
        } else {
            Some(self.mother_id)
        }
    }

    /// Absolute species code (particle and antiparticle collapse together)
    #[inline]
    pub fn species(&self) -> u32 {
        self.pdg_code.unsigned_abs()
    }
}

/// A detector hit left by a track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Track that produced the hit (may not resolve to a particle)
    pub track_id: TrackId,
    /// Global hit position
    pub position: Vector3<f64>,
    /// Detector element (chip) id
    pub detector_id: DetectorId,
}

impl HitRecord {
    /// Create a new hit record
    pub fn new(track_id: TrackId, position: Vector3<f64>, detector_id: DetectorId) -> Self {
        Self {
            track_id,
            position,
            detector_id,
        }
    }
}

/// Truth particles and hits of one event, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    /// Particle records in stack order
    #[serde(default)]
    pub particles: Vec<ParticleRecord>,
    /// Hit records in readout order
    #[serde(default)]
    pub hits: Vec<HitRecord>,
}

impl EventData {
    /// Create event data from particles and hits
    pub fn new(particles: Vec<ParticleRecord>, hits: Vec<HitRecord>) -> Self {
        Self { particles, hits }
    }

    /// Number of particle records
    #[inline]
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Number of hit records
    #[inline]
    pub fn num_hits(&self) -> usize {
        self.hits.len()
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Named position of a track inside a matched decay.
///
/// The numeric index is part of the output contract: downstream consumers
/// expect 0 = root, 1 = companion, 2 = grandchild A, 3 = grandchild B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// The primary decaying particle
    Root,
    /// Direct sibling of the intermediate (e.g. the kaon of an Omega decay)
    Companion,
    /// First grandchild species (e.g. the pion of the Lambda decay)
    GrandchildA,
    /// Second grandchild species (e.g. the proton of the Lambda decay)
    GrandchildB,
}

impl Role {
    /// All roles in export order
    pub const ALL: [Role; 4] = [
        Role::Root,
        Role::Companion,
        Role::GrandchildA,
        Role::GrandchildB,
    ];

    /// Numeric role index used in output rows
    #[inline]
    pub fn index(self) -> u8 {
        match self {
            Role::Root => 0,
            Role::Companion => 1,
            Role::GrandchildA => 2,
            Role::GrandchildB => 3,
        }
    }

    /// Role for a numeric index
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Short lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Companion => "companion",
            Role::GrandchildA => "grandchild_a",
            Role::GrandchildB => "grandchild_b",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.index())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = u8::deserialize(deserializer)?;
        Role::from_index(index).ok_or_else(|| {
            serde::de::Error::custom(format!("role index {} out of range 0..=3", index))
        })
    }
}

// ============================================================================
// DecayCandidate
// ============================================================================

/// One matched instance of the decay template within an event.
///
/// Every primary of the root species yields exactly one candidate, so any of
/// the non-root slots may be unfilled (`None`). The intermediate anchor is kept
/// for structural checks but is not itself a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecayCandidate {
    /// Primary root track; also the decay instance key
    pub root: TrackId,
    /// Intermediate anchor (parent of the grandchildren)
    pub intermediate: Option<TrackId>,
    /// Companion of the intermediate
    pub companion: Option<TrackId>,
    /// Grandchild with the first grandchild code
    pub grandchild_a: Option<TrackId>,
    /// Grandchild with the second grandchild code
    pub grandchild_b: Option<TrackId>,
}

impl DecayCandidate {
    /// Candidate with only the root filled
    pub fn unmatched(root: TrackId) -> Self {
        Self {
            root,
            intermediate: None,
            companion: None,
            grandchild_a: None,
            grandchild_b: None,
        }
    }

    /// Track id stored in a role slot
    #[inline]
    pub fn slot(&self, role: Role) -> Option<TrackId> {
        match role {
            Role::Root => Some(self.root),
            Role::Companion => self.companion,
            Role::GrandchildA => self.grandchild_a,
            Role::GrandchildB => self.grandchild_b,
        }
    }

    /// Decay instance key used in output rows
    #[inline]
    pub fn key(&self) -> TrackId {
        self.root
    }

    /// All four slots in export order
    pub fn slots(&self) -> [(Role, Option<TrackId>); 4] {
        Role::ALL.map(|role| (role, self.slot(role)))
    }

    /// True when no intermediate was matched below the root
    #[inline]
    pub fn is_bare(&self) -> bool {
        self.intermediate.is_none()
    }

    /// True when all four role slots are filled
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.companion.is_some() && self.grandchild_a.is_some() && self.grandchild_b.is_some()
    }

    /// Number of filled role slots (root included)
    pub fn num_filled(&self) -> usize {
        self.slots().iter().filter(|(_, id)| id.is_some()).count()
    }

    /// Role slots whose tracks take part in hit association.
    ///
    /// The root takes part only when an intermediate anchors the decay; the
    /// other filled slots always do.
    pub fn referenced_slots(&self) -> impl Iterator<Item = (Role, TrackId)> + '_ {
        let bare = self.is_bare();
        Role::ALL
            .into_iter()
            .filter(move |&role| !(bare && role == Role::Root))
            .filter_map(move |role| self.slot(role).map(|id| (role, id)))
    }
}
