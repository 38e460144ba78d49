//! Event builders shared by the integration tests
//!
//! Keeps record construction terse so scenarios read like the event tables
//! they describe.

#![allow(dead_code)]

use nalgebra::Vector3;

use decay_hit_matcher::common::{simulate_events, SimulationConfig};
use decay_hit_matcher::decay::{
    EventBatch, EventData, HitRecord, ParticleRecord, PdgCode, TrackId, PRIMARY_MOTHER,
};

//=============================================================================
// Record builders
//=============================================================================

/// Particle at the origin
pub fn particle(id: TrackId, mother_id: TrackId, pdg_code: PdgCode) -> ParticleRecord {
    ParticleRecord::new(id, mother_id, pdg_code, Vector3::zeros())
}

/// Primary particle at the origin
pub fn primary(id: TrackId, pdg_code: PdgCode) -> ParticleRecord {
    particle(id, PRIMARY_MOTHER, pdg_code)
}

/// Hit at `(x, y, z)`
pub fn hit(track_id: TrackId, position: [f64; 3], detector_id: u32) -> HitRecord {
    HitRecord::new(
        track_id,
        Vector3::new(position[0], position[1], position[2]),
        detector_id,
    )
}

//=============================================================================
// Scenarios
//=============================================================================

/// Omega(10) → Lambda(11) K(12), Lambda → pi(13) p(14), with hits on the
/// Omega and the pion
pub fn omega_scenario() -> EventData {
    EventData::new(
        vec![
            primary(10, 3334),
            particle(11, 10, 3122),
            particle(12, 10, 321),
            particle(13, 11, 211),
            particle(14, 11, 2212),
        ],
        vec![hit(10, [0.0, 0.0, 0.0], 1), hit(13, [1.0, 1.0, 1.0], 2)],
    )
}

/// A lone Omega primary with hits of its own
pub fn bare_primary_scenario() -> EventData {
    EventData::new(
        vec![primary(0, 3334), primary(1, 211)],
        vec![hit(0, [1.8, 0.0, 0.0], 0), hit(0, [2.4, 0.0, 0.0], 100)],
    )
}

/// Simulated batch with every kind of malformed input switched on
pub fn noisy_batch(num_events: usize, seed: u64) -> EventBatch {
    let config = SimulationConfig {
        num_events,
        mean_decays_per_event: 2.0,
        mean_background_particles: 30.0,
        intermediate_probability: 0.8,
        orphan_hit_rate: 2.0,
        dangling_mother_rate: 0.1,
        ..Default::default()
    };
    simulate_events(&config, Some(seed)).expect("valid simulation config")
}
