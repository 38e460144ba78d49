/*!
# decay-hit-matcher - Decay-chain matching for Monte-Carlo truth records

Finds instances of a fixed two-level decay topology (root → intermediate +
companion, intermediate → two grandchildren) among the truth particles of
each event, and emits the detector hits of the matched tracks as flat rows
keyed by event, decay instance and role.

## Features

- Per-event ancestry index with tolerance for dangling references
- Configurable species codes (Omega and Xi templates built in)
- Streaming row output (in-memory or JSON lines)
- Optional parallel processing over events (`rayon` feature)
- Seeded synthetic event generator for tests and benchmarks

## Modules

- [`decay`] - Forest, matcher, hit association, row export and the batch pipeline
- [`common`] - Detector geometry and event simulation
- [`reporter`] - Observability callbacks

## Example

```rust
use decay_hit_matcher::common::{simulate_events, SimulationConfig};
use decay_hit_matcher::decay::{DecayPipeline, PipelineConfig};

let batch = simulate_events(&SimulationConfig::default(), Some(42)).unwrap();
let pipeline = DecayPipeline::new(PipelineConfig::default()).unwrap();
let (rows, summary) = pipeline.collect_rows(&batch).unwrap();

assert_eq!(summary.events, batch.len());
assert_eq!(summary.rows, rows.len());
```
*/

// ============================================================================
// Core modules
// ============================================================================

/// Decay matching pipeline
///
/// Stages run per event in a fixed order:
/// `ParticleForest` → `DecayMatcher` → `associate_hits` → `export_rows`.
pub mod decay;

/// Detector geometry and synthetic events
pub mod common;

/// Pipeline observability
pub mod reporter;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Records
pub use decay::{DecayCandidate, EventData, HitRecord, ParticleRecord, Role, TrackId};

// Configuration and errors
pub use decay::{DecayTemplate, PipelineConfig, PipelineError};

// Pipeline
pub use decay::{
    BatchSummary, DecayPipeline, EventBatch, EventSource, JsonLinesSink, OutputRow, RowSink,
};

// Reporters
pub use reporter::{CompositeReporter, DebugReporter, LoggingReporter, NoOpReporter, PipelineReporter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
