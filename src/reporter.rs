//! Observability for pipeline execution.
//!
//! This module provides the [`PipelineReporter`] trait for debugging and
//! research instrumentation. Reporters receive callbacks at key points of each
//! event's processing without touching the matching logic.
//!
//! Callbacks always arrive in event order, also when events are processed in
//! parallel: per-event results are replayed to the reporter during the merge.
//!
//! # Example
//!
//! ```
//! use decay_hit_matcher::decay::{DecayPipeline, EventBatch, OutputRow, PipelineConfig};
//! use decay_hit_matcher::reporter::DebugReporter;
//!
//! let pipeline = DecayPipeline::new(PipelineConfig::default()).unwrap();
//! let mut reporter = DebugReporter::new();
//! let mut rows: Vec<OutputRow> = Vec::new();
//! pipeline
//!     .run_with_reporter(&EventBatch::default(), &mut rows, &mut reporter)
//!     .unwrap();
//! assert_eq!(reporter.batch_events().len(), 1);
//! ```

use crate::decay::{BatchSummary, DecayCandidate, ForestStats, HitGroups, OutputRow};

// ============================================================================
// PipelineReporter Trait
// ============================================================================

/// Observability trait for pipeline execution.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// Reporters use `&mut self` and are driven from the calling thread only, so
/// they do not need to be `Send` or `Sync`.
pub trait PipelineReporter {
    /// Called after an event's ancestry index is built.
    fn on_forest_built(&mut self, _event_index: usize, _stats: &ForestStats) {}

    /// Called with the candidates matched in an event (one per primary).
    fn on_candidates(&mut self, _event_index: usize, _candidates: &[DecayCandidate]) {}

    /// Called after an event's hits are grouped by referenced track.
    fn on_hits_associated(&mut self, _event_index: usize, _groups: &HitGroups) {}

    /// Called with the rows exported for an event, before they reach the sink.
    fn on_rows_exported(&mut self, _event_index: usize, _rows: &[OutputRow]) {}

    /// Called once after the last event.
    fn on_batch_complete(&mut self, _summary: &BatchSummary) {}
}

impl<R: PipelineReporter + ?Sized> PipelineReporter for &mut R {
    fn on_forest_built(&mut self, event_index: usize, stats: &ForestStats) {
        (**self).on_forest_built(event_index, stats);
    }

    fn on_candidates(&mut self, event_index: usize, candidates: &[DecayCandidate]) {
        (**self).on_candidates(event_index, candidates);
    }

    fn on_hits_associated(&mut self, event_index: usize, groups: &HitGroups) {
        (**self).on_hits_associated(event_index, groups);
    }

    fn on_rows_exported(&mut self, event_index: usize, rows: &[OutputRow]) {
        (**self).on_rows_exported(event_index, rows);
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        (**self).on_batch_complete(summary);
    }
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Reporter that does nothing.
///
/// This is the reporter used by [`DecayPipeline::run`](crate::decay::DecayPipeline::run).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl PipelineReporter for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// Stores clones of everything passed to it, so memory grows with the batch.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    forests: Vec<(usize, ForestStats)>,
    candidates: Vec<(usize, Vec<DecayCandidate>)>,
    hit_groups: Vec<(usize, HitGroups)>,
    rows: Vec<(usize, Vec<OutputRow>)>,
    batches: Vec<BatchSummary>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.forests.clear();
        self.candidates.clear();
        self.hit_groups.clear();
        self.rows.clear();
        self.batches.clear();
    }

    /// Captured forest statistics, per event.
    pub fn forest_events(&self) -> &[(usize, ForestStats)] {
        &self.forests
    }

    /// Captured candidates, per event.
    pub fn candidate_events(&self) -> &[(usize, Vec<DecayCandidate>)] {
        &self.candidates
    }

    /// Captured hit groups, per event.
    pub fn hit_group_events(&self) -> &[(usize, HitGroups)] {
        &self.hit_groups
    }

    /// Captured exported rows, per event.
    pub fn row_events(&self) -> &[(usize, Vec<OutputRow>)] {
        &self.rows
    }

    /// Captured batch summaries.
    pub fn batch_events(&self) -> &[BatchSummary] {
        &self.batches
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.forests.len()
            + self.candidates.len()
            + self.hit_groups.len()
            + self.rows.len()
            + self.batches.len()
    }
}

impl PipelineReporter for DebugReporter {
    fn on_forest_built(&mut self, event_index: usize, stats: &ForestStats) {
        self.forests.push((event_index, *stats));
    }

    fn on_candidates(&mut self, event_index: usize, candidates: &[DecayCandidate]) {
        self.candidates.push((event_index, candidates.to_vec()));
    }

    fn on_hits_associated(&mut self, event_index: usize, groups: &HitGroups) {
        self.hit_groups.push((event_index, groups.clone()));
    }

    fn on_rows_exported(&mut self, event_index: usize, rows: &[OutputRow]) {
        self.rows.push((event_index, rows.to_vec()));
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        self.batches.push(*summary);
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// # Log Levels
///
/// - `on_batch_complete`: INFO
/// - `on_candidates`, `on_rows_exported`: DEBUG
/// - `on_forest_built`, `on_hits_associated`: TRACE
///
/// The verbose variant also logs every candidate's slots at DEBUG.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes candidate details.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl PipelineReporter for LoggingReporter {
    fn on_forest_built(&mut self, event_index: usize, stats: &ForestStats) {
        log::trace!(
            "Event {}: {} particles, {} mothers, {} primaries",
            event_index,
            stats.particles,
            stats.mothers,
            stats.primaries
        );
        if stats.dangling_mothers > 0 {
            log::debug!(
                "Event {}: {} mother ids do not resolve to a particle",
                event_index,
                stats.dangling_mothers
            );
        }
    }

    fn on_candidates(&mut self, event_index: usize, candidates: &[DecayCandidate]) {
        let complete = candidates.iter().filter(|c| c.is_complete()).count();
        log::debug!(
            "Event {}: {} candidates ({} complete)",
            event_index,
            candidates.len(),
            complete
        );
        if self.verbose {
            for c in candidates {
                log::debug!(
                    "  root={} intermediate={:?} companion={:?} grandchild_a={:?} grandchild_b={:?}",
                    c.root,
                    c.intermediate,
                    c.companion,
                    c.grandchild_a,
                    c.grandchild_b
                );
            }
        }
    }

    fn on_hits_associated(&mut self, event_index: usize, groups: &HitGroups) {
        log::trace!(
            "Event {}: {} hits on {} tracks, {} dropped",
            event_index,
            groups.num_hits(),
            groups.num_tracks(),
            groups.dropped()
        );
    }

    fn on_rows_exported(&mut self, event_index: usize, rows: &[OutputRow]) {
        log::debug!("Event {}: {} rows", event_index, rows.len());
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        log::info!(
            "Batch complete: {} events, {} candidates ({} with hits), {} rows",
            summary.events,
            summary.candidates,
            summary.candidates_with_hits,
            summary.rows
        );
    }
}

// ============================================================================
// CompositeReporter
// ============================================================================

/// Reporter that forwards events to two child reporters.
#[derive(Debug, Clone)]
pub struct CompositeReporter<A: PipelineReporter, B: PipelineReporter> {
    first: A,
    second: B,
}

impl<A: PipelineReporter, B: PipelineReporter> CompositeReporter<A, B> {
    /// Create a new composite reporter.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Get a reference to the first reporter.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a reference to the second reporter.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Consume and return both reporters.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: PipelineReporter, B: PipelineReporter> PipelineReporter for CompositeReporter<A, B> {
    fn on_forest_built(&mut self, event_index: usize, stats: &ForestStats) {
        self.first.on_forest_built(event_index, stats);
        self.second.on_forest_built(event_index, stats);
    }

    fn on_candidates(&mut self, event_index: usize, candidates: &[DecayCandidate]) {
        self.first.on_candidates(event_index, candidates);
        self.second.on_candidates(event_index, candidates);
    }

    fn on_hits_associated(&mut self, event_index: usize, groups: &HitGroups) {
        self.first.on_hits_associated(event_index, groups);
        self.second.on_hits_associated(event_index, groups);
    }

    fn on_rows_exported(&mut self, event_index: usize, rows: &[OutputRow]) {
        self.first.on_rows_exported(event_index, rows);
        self.second.on_rows_exported(event_index, rows);
    }

    fn on_batch_complete(&mut self, summary: &BatchSummary) {
        self.first.on_batch_complete(summary);
        self.second.on_batch_complete(summary);
    }
}

// ============================================================================
// Tests
// ============================================================================
