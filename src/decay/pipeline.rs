//! Batch driver
//!
//! For each event: forest → candidates → hit groups → rows. Events share no
//! state; only the sink and the batch summary see more than one event.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use super::association::{associate_hits, HitGroups};
use super::config::PipelineConfig;
use super::errors::PipelineError;
use super::forest::ForestStats;
use super::matcher::DecayMatcher;
use super::output::{export_rows, BatchSummary, EventSummary, OutputRow};
use super::sink::RowSink;
use super::source::EventSource;
use super::types::{DecayCandidate, EventData};
use crate::reporter::{NoOpReporter, PipelineReporter};

/// Everything produced for a single event
#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    /// Event index within the batch
    pub event_index: usize,
    /// Forest size statistics
    pub forest: ForestStats,
    /// One candidate per primary of the root species
    pub candidates: Vec<DecayCandidate>,
    /// Hits of referenced tracks
    pub hits: HitGroups,
    /// Exported rows
    pub rows: Vec<OutputRow>,
    /// Event counters
    pub summary: EventSummary,
}

/// Runs the decay matcher and hit associator over a batch of events
#[derive(Debug, Clone)]
pub struct DecayPipeline {
    config: PipelineConfig,
    matcher: DecayMatcher,
}

impl DecayPipeline {
    /// Create a pipeline, validating the configuration
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let matcher = DecayMatcher::new(config.template);
        Ok(Self { config, matcher })
    }

    /// Pipeline configuration
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Template matcher
    #[inline]
    pub fn matcher(&self) -> &DecayMatcher {
        &self.matcher
    }

    /// Process one event in isolation
    pub fn process_event(&self, event_index: usize, event: &EventData) -> EventOutcome {
        let forest = self.matcher.forest(&event.particles);
        let stats = forest.stats();
        let candidates = self.matcher.match_event(&forest);

        let hits = associate_hits(&candidates, &event.hits);
        let (rows, summary) = export_rows(event_index, &candidates, &hits, &stats);

        EventOutcome {
            event_index,
            forest: stats,
            candidates,
            hits,
            rows,
            summary,
        }
    }

    /// Number of events a run over `source` processes
    ///
    /// # Errors
    /// `EventOutOfRange` when the configured bound exceeds the source.
    pub fn events_to_process<S: EventSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<usize, PipelineError> {
        let count = source.event_count();
        match self.config.event_limit {
            Some(limit) if limit > count => Err(PipelineError::EventOutOfRange {
                index: count,
                count,
            }),
            Some(limit) => Ok(limit),
            None => Ok(count),
        }
    }

    /// Run the batch, streaming rows into `sink`
    pub fn run<S, K>(&self, source: &S, sink: K) -> Result<BatchSummary, PipelineError>
    where
        S: EventSource + ?Sized,
        K: RowSink,
    {
        self.run_with_reporter(source, sink, NoOpReporter)
    }

    /// Run the batch with an observability reporter
    pub fn run_with_reporter<S, K, R>(
        &self,
        source: &S,
        mut sink: K,
        mut reporter: R,
    ) -> Result<BatchSummary, PipelineError>
    where
        S: EventSource + ?Sized,
        K: RowSink,
        R: PipelineReporter,
    {
        let num_events = self.events_to_process(source)?;
        log::debug!(
            "Processing {} of {} events (parallel={})",
            num_events,
            source.event_count(),
            self.config.parallel
        );

        let mut batch = BatchSummary::default();
        if self.config.parallel {
            self.run_parallel(source, num_events, &mut sink, &mut reporter, &mut batch)?;
        } else {
            self.run_sequential(source, num_events, &mut sink, &mut reporter, &mut batch)?;
        }

        sink.finish()?;
        reporter.on_batch_complete(&batch);
        Ok(batch)
    }

    /// Run the batch and return every row
    pub fn collect_rows<S: EventSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(Vec<OutputRow>, BatchSummary), PipelineError> {
        let mut rows = Vec::new();
        let summary = self.run(source, &mut rows)?;
        Ok((rows, summary))
    }

    fn run_sequential<S, K, R>(
        &self,
        source: &S,
        num_events: usize,
        sink: &mut K,
        reporter: &mut R,
        batch: &mut BatchSummary,
    ) -> Result<(), PipelineError>
    where
        S: EventSource + ?Sized,
        K: RowSink,
        R: PipelineReporter,
    {
        for event_index in 0..num_events {
            let event = source.event(event_index)?;
            let outcome = self.process_event(event_index, &event);
            emit(outcome, sink, reporter, batch)?;
        }
        Ok(())
    }

    #[cfg(feature = "rayon")]
    fn run_parallel<S, K, R>(
        &self,
        source: &S,
        num_events: usize,
        sink: &mut K,
        reporter: &mut R,
        batch: &mut BatchSummary,
    ) -> Result<(), PipelineError>
    where
        S: EventSource + ?Sized,
        K: RowSink,
        R: PipelineReporter,
    {
        let outcomes: Vec<Result<EventOutcome, PipelineError>> = (0..num_events)
            .into_par_iter()
            .map(|event_index| -> Result<EventOutcome, PipelineError> {
                let event = source.event(event_index)?;
                Ok(self.process_event(event_index, &event))
            })
            .collect();

        // Events before the first failure reach the sink, as in a sequential run
        for outcome in outcomes {
            emit(outcome?, sink, reporter, batch)?;
        }
        Ok(())
    }

    #[cfg(not(feature = "rayon"))]
    fn run_parallel<S, K, R>(
        &self,
        source: &S,
        num_events: usize,
        sink: &mut K,
        reporter: &mut R,
        batch: &mut BatchSummary,
    ) -> Result<(), PipelineError>
    where
        S: EventSource + ?Sized,
        K: RowSink,
        R: PipelineReporter,
    {
        log::warn!("Parallel processing requested but the `rayon` feature is disabled");
        self.run_sequential(source, num_events, sink, reporter, batch)
    }
}

fn emit<K: RowSink, R: PipelineReporter>(
    outcome: EventOutcome,
    sink: &mut K,
    reporter: &mut R,
    batch: &mut BatchSummary,
) -> Result<(), PipelineError> {
    let event_index = outcome.event_index;
    reporter.on_forest_built(event_index, &outcome.forest);
    reporter.on_candidates(event_index, &outcome.candidates);
    reporter.on_hits_associated(event_index, &outcome.hits);
    reporter.on_rows_exported(event_index, &outcome.rows);
    sink.write_rows(&outcome.rows)?;
    batch.record(&outcome.summary);
    Ok(())
}
