/*!
Decay-chain matching and hit association.

Per event the pipeline runs four stages:
- [`forest`] - ancestry index (mother → children) and primary set
- [`matcher`] - fixed template: root → intermediate + companion, intermediate → two grandchildren
- [`association`] - hits grouped by the tracks filling role slots
- [`output`] - flat rows (event, decay instance, role, position, detector)

[`pipeline`] drives the stages over an [`EventSource`] and streams rows into a
[`RowSink`].
*/

pub mod association;
pub mod config;
pub mod errors;
pub mod forest;
pub mod matcher;
pub mod output;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod types;

// ============================================================================
// Species codes
// ============================================================================

/// Omega baryon
pub const OMEGA: u32 = 3334;

/// Xi baryon
pub const XI: u32 = 3312;

/// Lambda baryon
pub const LAMBDA: u32 = 3122;

/// Charged kaon
pub const KAON: u32 = 321;

/// Charged pion
pub const PION: u32 = 211;

/// Proton
pub const PROTON: u32 = 2212;

// ============================================================================
// Re-exports
// ============================================================================

pub use association::{associate_hits, referenced_tracks, HitGroups};
pub use config::{DecayTemplate, DecayTemplateBuilder, PipelineConfig, PipelineConfigBuilder};
pub use errors::PipelineError;
pub use forest::{Children, ForestStats, ParticleForest};
pub use matcher::DecayMatcher;
pub use output::{export_rows, BatchSummary, EventSummary, OutputRow};
pub use pipeline::{DecayPipeline, EventOutcome};
pub use sink::{JsonLinesSink, RowSink};
pub use source::{EventBatch, EventSource};
pub use types::{
    DecayCandidate, DetectorId, EventData, HitRecord, ParticleRecord, PdgCode, Role, TrackId,
    PRIMARY_MOTHER,
};
