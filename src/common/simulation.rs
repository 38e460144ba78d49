//! Synthetic event generation
//!
//! Produces batches of truth particles and detector hits for testing and
//! benchmarking. Each event holds a Poisson number of template decays plus
//! background primaries. Charged tracks are propagated in straight lines from
//! their creation vertex through [`BARREL_LAYERS`]; a track that decays stops
//! at its decay vertex.
//!
//! Two kinds of malformed input are injected on request: hits whose track id
//! names no particle, and particles whose mother id names no particle.

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::geometry::{detector_id, BARREL_LAYERS};
use crate::decay::{
    DecayTemplate, EventBatch, EventData, HitRecord, ParticleRecord, PdgCode, PipelineError,
    TrackId, KAON, OMEGA, PION, PROTON, XI,
};

/// Mother ids at or above this value never resolve
const DANGLING_MOTHER_BASE: TrackId = 1_000_000;

const ELECTRON: u32 = 11;
const MUON: u32 = 13;
const PHOTON: u32 = 22;

/// Species drawn for background primaries
const BACKGROUND_SPECIES: [u32; 5] = [PION, PION, KAON, PROTON, PHOTON];

/// Parameters of the synthetic event generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Events per batch
    pub num_events: usize,
    /// Poisson mean of template decays per event
    pub mean_decays_per_event: f64,
    /// Poisson mean of background primaries per event
    pub mean_background_particles: f64,
    /// Probability that a root's decay products are recorded
    pub intermediate_probability: f64,
    /// Poisson mean of hits with an unknown track id per event
    pub orphan_hit_rate: f64,
    /// Probability that a background particle carries an unresolvable mother id
    pub dangling_mother_rate: f64,
    /// Standard deviation of the primary vertex position (cm)
    pub vertex_spread: f64,
    /// Mean flight distance before a decay (cm)
    pub decay_length: f64,
    /// Species of the generated decays
    pub template: DecayTemplate,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_events: 10,
            mean_decays_per_event: 1.0,
            mean_background_particles: 20.0,
            intermediate_probability: 0.9,
            orphan_hit_rate: 0.0,
            dangling_mother_rate: 0.0,
            vertex_spread: 0.01,
            decay_length: 4.0,
            template: DecayTemplate::omega(),
        }
    }
}

impl SimulationConfig {
    /// Validate generator parameters
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.template.validate()?;
        for (name, value) in [
            ("mean_decays_per_event", self.mean_decays_per_event),
            ("mean_background_particles", self.mean_background_particles),
            ("orphan_hit_rate", self.orphan_hit_rate),
            ("vertex_spread", self.vertex_spread),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::configuration(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("intermediate_probability", self.intermediate_probability),
            ("dangling_mother_rate", self.dangling_mother_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::configuration(format!(
                    "{} must be in [0, 1], got {}",
                    name, value
                )));
            }
        }
        if !self.decay_length.is_finite() || self.decay_length <= 0.0 {
            return Err(PipelineError::configuration(format!(
                "decay_length must be positive, got {}",
                self.decay_length
            )));
        }
        Ok(())
    }
}

/// Whether a species leaves hits
fn is_charged(species: u32) -> bool {
    matches!(species, OMEGA | XI | KAON | PION | PROTON | ELECTRON | MUON)
}

/// Poisson draw that tolerates a zero mean
fn sample_count(rng: &mut StdRng, mean: f64) -> usize {
    if mean <= 0.0 {
        return 0;
    }
    Poisson::new(mean).map_or(0, |p| p.sample(rng) as usize)
}

/// Random direction, uniform in azimuth and pseudorapidity |eta| < 1
fn random_direction(rng: &mut StdRng) -> Vector3<f64> {
    let phi = rng.gen_range(-PI..PI);
    let eta: f64 = rng.gen_range(-1.0..1.0);
    Vector3::new(phi.cos(), phi.sin(), eta.sinh()).normalize()
}

/// Straight-line track segment
struct Segment {
    track_id: TrackId,
    origin: Vector3<f64>,
    direction: Vector3<f64>,
    /// Flight distance before the track decays, `None` for stable tracks
    length: Option<f64>,
}

struct EventBuilder<'a> {
    config: &'a SimulationConfig,
    vertex: Normal<f64>,
    flight: Exp<f64>,
    particles: Vec<ParticleRecord>,
    segments: Vec<Segment>,
}

impl<'a> EventBuilder<'a> {
    fn push(
        &mut self,
        mother_id: TrackId,
        pdg_code: PdgCode,
        origin: Vector3<f64>,
        direction: Vector3<f64>,
        length: Option<f64>,
    ) -> TrackId {
        let id = self.particles.len() as TrackId;
        self.particles
            .push(ParticleRecord::new(id, mother_id, pdg_code, origin));
        if is_charged(pdg_code.unsigned_abs()) {
            self.segments.push(Segment {
                track_id: id,
                origin,
                direction,
                length,
            });
        }
        id
    }

    fn add_decay(&mut self, rng: &mut StdRng) {
        let template = self.config.template;
        let sign: PdgCode = if rng.gen_bool(0.5) { 1 } else { -1 };
        let code = |species: u32| sign * species as PdgCode;

        let primary_vertex = Vector3::new(
            self.vertex.sample(rng),
            self.vertex.sample(rng),
            self.vertex.sample(rng),
        );
        let root_direction = random_direction(rng);
        let root_flight = self.flight.sample(rng);
        let root_id = self.push(
            crate::decay::PRIMARY_MOTHER,
            code(template.root),
            primary_vertex,
            root_direction,
            Some(root_flight),
        );

        if !rng.gen_bool(self.config.intermediate_probability) {
            return;
        }

        let decay_vertex = primary_vertex + root_direction * root_flight;
        let intermediate_direction = random_direction(rng);
        let intermediate_flight = self.flight.sample(rng);
        let intermediate_id = self.push(
            root_id,
            code(template.intermediate),
            decay_vertex,
            intermediate_direction,
            Some(intermediate_flight),
        );
        let companion_direction = random_direction(rng);
        self.push(
            root_id,
            code(template.companion),
            decay_vertex,
            companion_direction,
            None,
        );

        let second_vertex = decay_vertex + intermediate_direction * intermediate_flight;
        let a_direction = random_direction(rng);
        let b_direction = random_direction(rng);
        self.push(
            intermediate_id,
            code(template.grandchild_a),
            second_vertex,
            a_direction,
            None,
        );
        self.push(
            intermediate_id,
            code(template.grandchild_b),
            second_vertex,
            b_direction,
            None,
        );
    }

    fn add_background(&mut self, rng: &mut StdRng) {
        let species = BACKGROUND_SPECIES[rng.gen_range(0..BACKGROUND_SPECIES.len())];
        let sign: PdgCode = if rng.gen_bool(0.5) { 1 } else { -1 };
        let origin = Vector3::new(
            self.vertex.sample(rng),
            self.vertex.sample(rng),
            self.vertex.sample(rng),
        );
        let mother_id = if rng.gen_bool(self.config.dangling_mother_rate) {
            DANGLING_MOTHER_BASE + self.particles.len() as TrackId
        } else {
            crate::decay::PRIMARY_MOTHER
        };
        let direction = random_direction(rng);
        self.push(mother_id, sign * species as PdgCode, origin, direction, None);
    }

    fn hits(&self, rng: &mut StdRng) -> Vec<HitRecord> {
        let mut hits = Vec::new();
        for segment in &self.segments {
            for (layer_index, layer) in BARREL_LAYERS.iter().enumerate() {
                let Some(point) = layer.intersect(&segment.origin, &segment.direction) else {
                    continue;
                };
                let travelled = (point - segment.origin).norm();
                if segment.length.is_some_and(|length| travelled > length) {
                    continue;
                }
                hits.push(HitRecord::new(
                    segment.track_id,
                    point,
                    detector_id(layer_index, &point),
                ));
            }
        }

        let orphans = sample_count(rng, self.config.orphan_hit_rate);
        let first_unknown = self.particles.len() as TrackId;
        for k in 0..orphans {
            let layer_index = rng.gen_range(0..BARREL_LAYERS.len());
            let layer = BARREL_LAYERS[layer_index];
            let phi = rng.gen_range(-PI..PI);
            let z = rng.gen_range(-layer.half_length..layer.half_length);
            let point = Vector3::new(layer.radius * phi.cos(), layer.radius * phi.sin(), z);
            hits.push(HitRecord::new(
                first_unknown + k as TrackId,
                point,
                detector_id(layer_index, &point),
            ));
        }

        hits.shuffle(rng);
        hits
    }
}

fn simulate_event(
    config: &SimulationConfig,
    vertex: Normal<f64>,
    flight: Exp<f64>,
    rng: &mut StdRng,
) -> EventData {
    let mut builder = EventBuilder {
        config,
        vertex,
        flight,
        particles: Vec::new(),
        segments: Vec::new(),
    };

    let num_decays = sample_count(rng, config.mean_decays_per_event);
    for _ in 0..num_decays {
        builder.add_decay(rng);
    }
    let num_background = sample_count(rng, config.mean_background_particles);
    for _ in 0..num_background {
        builder.add_background(rng);
    }

    let hits = builder.hits(rng);
    EventData::new(builder.particles, hits)
}

/// Generate a batch of synthetic events
///
/// # Arguments
/// * `config` - Generator parameters
/// * `seed` - Optional RNG seed; the same seed always yields the same batch
///
/// # Errors
/// `Configuration` when the parameters are out of range.
pub fn simulate_events(
    config: &SimulationConfig,
    seed: Option<u64>,
) -> Result<EventBatch, PipelineError> {
    config.validate()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let vertex = Normal::new(0.0, config.vertex_spread)
        .map_err(|e| PipelineError::configuration(format!("vertex_spread: {}", e)))?;
    let flight = Exp::new(1.0 / config.decay_length)
        .map_err(|e| PipelineError::configuration(format!("decay_length: {}", e)))?;

    let events = (0..config.num_events)
        .map(|_| simulate_event(config, vertex, flight, &mut rng))
        .collect::<Vec<_>>();

    log::debug!(
        "Simulated {} events ({} particles, {} hits)",
        events.len(),
        events.iter().map(EventData::num_particles).sum::<usize>(),
        events.iter().map(EventData::num_hits).sum::<usize>()
    );
    Ok(EventBatch::new(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::geometry::transverse_radius;
    use std::collections::HashSet;

    #[test]
    fn test_seed_is_reproducible() {
        let config = SimulationConfig::default();
        let a = simulate_events(&config, Some(42)).unwrap();
        let b = simulate_events(&config, Some(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), config.num_events);
    }

    #[test]
    fn test_ids_are_record_indices() {
        let batch = simulate_events(&SimulationConfig::default(), Some(1)).unwrap();
        for event in &batch.events {
            for (i, p) in event.particles.iter().enumerate() {
                assert_eq!(p.id, i as TrackId);
                if let Some(mother) = p.mother() {
                    assert!(mother < p.id);
                }
            }
        }
    }

    #[test]
    fn test_hits_lie_on_layers() {
        let batch = simulate_events(&SimulationConfig::default(), Some(7)).unwrap();
        let mut total = 0;
        for hit in batch.events.iter().flat_map(|e| &e.hits) {
            let layer = BARREL_LAYERS[(hit.detector_id / 100) as usize];
            assert!((transverse_radius(&hit.position) - layer.radius).abs() < 1e-9);
            assert!(hit.position.z.abs() <= layer.half_length);
            total += 1;
        }
        assert!(total > 0);
    }

    #[test]
    fn test_neutral_tracks_leave_no_hits() {
        let batch = simulate_events(&SimulationConfig::default(), Some(3)).unwrap();
        for event in &batch.events {
            let neutral: HashSet<TrackId> = event
                .particles
                .iter()
                .filter(|p| !is_charged(p.species()))
                .map(|p| p.id)
                .collect();
            assert!(event.hits.iter().all(|h| !neutral.contains(&h.track_id)));
        }
    }

    #[test]
    fn test_malformed_input_injection() {
        let config = SimulationConfig {
            num_events: 20,
            orphan_hit_rate: 3.0,
            dangling_mother_rate: 0.5,
            ..Default::default()
        };
        let batch = simulate_events(&config, Some(11)).unwrap();

        let mut orphans = 0;
        let mut dangling = 0;
        for event in &batch.events {
            let ids: HashSet<TrackId> = event.particles.iter().map(|p| p.id).collect();
            orphans += event
                .hits
                .iter()
                .filter(|h| !ids.contains(&h.track_id))
                .count();
            dangling += event
                .particles
                .iter()
                .filter(|p| p.mother().is_some_and(|m| !ids.contains(&m)))
                .count();
        }
        assert!(orphans > 0);
        assert!(dangling > 0);
    }

    #[test]
    fn test_zero_rates() {
        let config = SimulationConfig {
            mean_decays_per_event: 0.0,
            mean_background_particles: 0.0,
            ..Default::default()
        };
        let batch = simulate_events(&config, Some(5)).unwrap();
        assert!(batch.events.iter().all(|e| e.particles.is_empty()));
    }

    #[test]
    fn test_invalid_config() {
        let config = SimulationConfig {
            intermediate_probability: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            simulate_events(&config, None),
            Err(PipelineError::Configuration { .. })
        ));

        let config = SimulationConfig {
            decay_length: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
