//! Integration tests for the decay pipeline
//!
//! End-to-end scenarios on hand-built events, plus structural properties
//! checked over simulated batches with malformed input switched on.

mod helpers;

use std::collections::{HashMap, HashSet};

use decay_hit_matcher::decay::{
    associate_hits, DecayCandidate, DecayMatcher, DecayPipeline, DecayTemplate, EventBatch,
    EventData, EventSource, JsonLinesSink, OutputRow, ParticleRecord, PipelineConfig,
    PipelineError, Role, RowSink, TrackId,
};
use decay_hit_matcher::reporter::{CompositeReporter, DebugReporter, LoggingReporter};
use helpers::fixtures::{bare_primary_scenario, hit, noisy_batch, omega_scenario, particle, primary};

fn default_pipeline() -> DecayPipeline {
    DecayPipeline::new(PipelineConfig::default()).unwrap()
}

//=============================================================================
// Scenarios
//=============================================================================

#[test]
fn test_omega_scenario() {
    let pipeline = default_pipeline();
    let outcome = pipeline.process_event(0, &omega_scenario());

    assert_eq!(
        outcome.candidates,
        vec![DecayCandidate {
            root: 10,
            intermediate: Some(11),
            companion: Some(12),
            grandchild_a: Some(13),
            grandchild_b: Some(14),
        }]
    );

    let rows: Vec<_> = outcome
        .rows
        .iter()
        .map(|r| {
            let p = r.position;
            (r.decay_instance_key, r.role.index(), [p.x, p.y, p.z], r.detector_id)
        })
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![(10, 0, [0.0, 0.0, 0.0], 1), (10, 2, [1.0, 1.0, 1.0], 2)]
    );
}

#[test]
fn test_bare_primary_yields_no_rows() {
    let pipeline = default_pipeline();
    let outcome = pipeline.process_event(0, &bare_primary_scenario());

    assert_eq!(outcome.candidates, vec![DecayCandidate::unmatched(0)]);
    assert!(outcome.rows.is_empty());
    assert_eq!(outcome.summary.candidates, 1);
    assert_eq!(outcome.summary.candidates_with_hits, 0);
    assert_eq!(outcome.summary.dropped_hits, 2);
}

#[test]
fn test_companion_without_intermediate_exports_companion_only() {
    let event = EventData::new(
        vec![primary(0, 3334), particle(1, 0, 321)],
        vec![hit(0, [1.8, 0.0, 0.0], 0), hit(1, [2.4, 0.0, 0.0], 100)],
    );
    let outcome = default_pipeline().process_event(0, &event);

    assert_eq!(
        outcome.candidates,
        vec![DecayCandidate {
            companion: Some(1),
            ..DecayCandidate::unmatched(0)
        }]
    );
    let rows: Vec<_> = outcome
        .rows
        .iter()
        .map(|r| (r.decay_instance_key, r.role, r.track_id, r.detector_id))
        .collect();
    assert_eq!(rows, vec![(0, Role::Companion, 1, 100)]);
    assert_eq!(outcome.summary.dropped_hits, 1);
}

#[test]
fn test_intermediate_without_products_exports_root() {
    let event = EventData::new(
        vec![primary(0, 3334), particle(1, 0, 3122)],
        vec![hit(0, [1.8, 0.0, 0.0], 0), hit(1, [2.4, 0.0, 0.0], 100)],
    );
    let outcome = default_pipeline().process_event(0, &event);

    assert_eq!(
        outcome.candidates,
        vec![DecayCandidate {
            intermediate: Some(1),
            ..DecayCandidate::unmatched(0)
        }]
    );
    let rows: Vec<_> = outcome
        .rows
        .iter()
        .map(|r| (r.decay_instance_key, r.role, r.track_id, r.detector_id))
        .collect();
    // The intermediate is an anchor, not a role: its hits are dropped
    assert_eq!(rows, vec![(0, Role::Root, 0, 0)]);
    assert_eq!(outcome.summary.candidates_with_hits, 1);
    assert_eq!(outcome.summary.dropped_hits, 1);
}

#[test]
fn test_unknown_track_hit_is_dropped() {
    let mut event = omega_scenario();
    event.hits.push(hit(999, [5.0, 5.0, 5.0], 7));

    let outcome = default_pipeline().process_event(0, &event);
    assert_eq!(outcome.rows.len(), 2);
    assert!(outcome.rows.iter().all(|r| r.track_id != 999));
    assert_eq!(outcome.hits.dropped(), 1);
}

#[test]
fn test_antiparticles_match() {
    let event = EventData::new(
        vec![
            primary(0, -3334),
            particle(1, 0, -3122),
            particle(2, 0, 321),
            particle(3, 1, -211),
            particle(4, 1, -2212),
        ],
        vec![hit(4, [0.0, 0.0, 1.0], 3)],
    );
    let outcome = default_pipeline().process_event(0, &event);
    assert!(outcome.candidates[0].is_complete());
    assert_eq!(outcome.rows[0].role, Role::GrandchildB);
}

#[test]
fn test_dangling_references_are_tolerated() {
    let event = EventData::new(
        vec![
            primary(0, 3334),
            particle(1, 0, 3122),
            // mother 50 does not exist
            particle(2, 50, 321),
            particle(3, 1, 211),
        ],
        vec![hit(2, [1.0, 0.0, 0.0], 0), hit(3, [2.0, 0.0, 0.0], 1)],
    );
    let outcome = default_pipeline().process_event(0, &event);

    let c = outcome.candidates[0];
    assert_eq!(c.intermediate, Some(1));
    assert_eq!(c.companion, None);
    assert_eq!(c.grandchild_a, Some(3));
    assert_eq!(c.grandchild_b, None);
    assert_eq!(outcome.forest.dangling_mothers, 1);
    assert_eq!(outcome.rows.len(), 1);
    assert_eq!(outcome.rows[0].track_id, 3);
}

#[test]
fn test_xi_template() {
    let event = EventData::new(
        vec![
            primary(0, 3312),
            particle(1, 0, 3122),
            particle(2, 0, 211),
            particle(3, 1, 211),
            particle(4, 1, 2212),
        ],
        vec![hit(2, [1.0, 0.0, 0.0], 0)],
    );
    let config = PipelineConfig::builder()
        .template(DecayTemplate::xi())
        .build()
        .unwrap();
    let outcome = DecayPipeline::new(config).unwrap().process_event(0, &event);

    assert_eq!(outcome.candidates[0].companion, Some(2));
    assert_eq!(outcome.candidates[0].grandchild_a, Some(3));
    assert_eq!(outcome.rows[0].role, Role::Companion);
}

//=============================================================================
// Tie-break laws
//=============================================================================

#[test]
fn test_companion_first_wins_grandchildren_last_win() {
    let event = EventData::new(
        vec![
            primary(0, 3334),
            particle(1, 0, 321),
            particle(2, 0, 3122),
            particle(3, 0, 321),
            particle(4, 0, 3122),
            particle(5, 2, 211),
            particle(6, 2, 2212),
            particle(7, 2, 211),
            particle(8, 2, 2212),
            particle(9, 4, 211),
        ],
        vec![],
    );
    let matcher = DecayMatcher::default();
    let forest = matcher.forest(&event.particles);
    let c = matcher.match_event(&forest)[0];

    assert_eq!(c.companion, Some(1));
    assert_eq!(c.intermediate, Some(2));
    assert_eq!(c.grandchild_a, Some(7));
    assert_eq!(c.grandchild_b, Some(8));
}

//=============================================================================
// Properties over simulated batches
//=============================================================================

#[test]
fn test_one_candidate_per_primary() {
    let batch = noisy_batch(50, 1);
    let matcher = DecayMatcher::default();
    for event in &batch.events {
        let expected = event
            .particles
            .iter()
            .filter(|p| p.is_primary() && p.species() == 3334)
            .count();
        let forest = matcher.forest(&event.particles);
        assert_eq!(matcher.match_event(&forest).len(), expected);
    }
}

#[test]
fn test_candidates_are_structurally_sound() {
    let batch = noisy_batch(50, 2);
    let matcher = DecayMatcher::default();
    for event in &batch.events {
        let by_id: HashMap<TrackId, &ParticleRecord> =
            event.particles.iter().map(|p| (p.id, p)).collect();
        let forest = matcher.forest(&event.particles);

        for c in matcher.match_event(&forest) {
            if let Some(companion) = c.companion {
                assert_eq!(by_id[&companion].mother_id, c.root);
            }
            for grandchild in [c.grandchild_a, c.grandchild_b].into_iter().flatten() {
                assert_eq!(Some(by_id[&grandchild].mother_id), c.intermediate);
            }
        }
    }
}

#[test]
fn test_rows_reference_filled_slots() {
    let batch = noisy_batch(50, 3);
    let pipeline = default_pipeline();
    for (index, event) in batch.events.iter().enumerate() {
        let outcome = pipeline.process_event(index, event);
        let slots: HashSet<(TrackId, Role, TrackId)> = outcome
            .candidates
            .iter()
            .flat_map(|c| c.referenced_slots().map(move |(role, id)| (c.key(), role, id)))
            .collect();
        for row in &outcome.rows {
            assert!(slots.contains(&(row.decay_instance_key, row.role, row.track_id)));
        }
    }
}

#[test]
fn test_hit_order_preserved_within_track() {
    let batch = noisy_batch(20, 4);
    let matcher = DecayMatcher::default();
    for event in &batch.events {
        let forest = matcher.forest(&event.particles);
        let candidates = matcher.match_event(&forest);
        let groups = associate_hits(&candidates, &event.hits);

        for (track, hits) in groups.iter() {
            let expected: Vec<_> = event.hits.iter().filter(|h| h.track_id == track).collect();
            let got: Vec<_> = hits.iter().collect();
            assert_eq!(got, expected);
        }
        assert_eq!(groups.num_hits() + groups.dropped(), event.hits.len());
    }
}

#[test]
fn test_rerun_is_identical() {
    let batch = noisy_batch(30, 5);
    let pipeline = default_pipeline();
    let first = pipeline.collect_rows(&batch).unwrap();
    let second = pipeline.collect_rows(&batch).unwrap();
    assert_eq!(first, second);

    let matcher = pipeline.matcher();
    for event in &batch.events {
        let once = matcher.match_event(&matcher.forest(&event.particles));
        let again = matcher.match_event(&matcher.forest(&event.particles));
        assert_eq!(once, again);
    }
}

#[test]
fn test_parallel_output_matches_sequential() {
    let batch = noisy_batch(200, 6);
    let sequential = default_pipeline();
    let parallel =
        DecayPipeline::new(PipelineConfig::builder().parallel(true).build().unwrap()).unwrap();

    let mut seq_reporter = DebugReporter::new();
    let mut par_reporter = DebugReporter::new();
    let mut seq_rows: Vec<OutputRow> = Vec::new();
    let mut par_rows: Vec<OutputRow> = Vec::new();
    let seq = sequential
        .run_with_reporter(&batch, &mut seq_rows, &mut seq_reporter)
        .unwrap();
    let par = parallel
        .run_with_reporter(&batch, &mut par_rows, &mut par_reporter)
        .unwrap();

    assert_eq!(seq, par);
    assert_eq!(seq_rows, par_rows);
    let seq_order: Vec<_> = seq_reporter.row_events().iter().map(|(i, _)| *i).collect();
    let par_order: Vec<_> = par_reporter.row_events().iter().map(|(i, _)| *i).collect();
    assert_eq!(seq_order, par_order);
}

#[test]
fn test_summary_matches_rows() {
    let batch = noisy_batch(40, 7);
    let (rows, summary) = default_pipeline().collect_rows(&batch).unwrap();

    assert_eq!(summary.events, batch.len());
    assert_eq!(summary.rows, rows.len());
    let hits: usize = batch.events.iter().map(EventData::num_hits).sum();
    assert_eq!(summary.associated_hits + summary.dropped_hits, hits);
    assert!(summary.dropped_hits > 0);
    assert!(summary.dangling_mothers > 0);
    assert!(summary.complete_candidates <= summary.candidates);
}

//=============================================================================
// Sources and sinks
//=============================================================================

struct FailingSource;

impl EventSource for FailingSource {
    fn event_count(&self) -> usize {
        3
    }

    fn event(&self, index: usize) -> Result<std::borrow::Cow<'_, EventData>, PipelineError> {
        if index == 1 {
            Err(PipelineError::EventOutOfRange { index, count: 1 })
        } else {
            Ok(std::borrow::Cow::Owned(omega_scenario()))
        }
    }
}

#[test]
fn test_source_failure_terminates_batch() {
    for parallel in [false, true] {
        let config = PipelineConfig::builder().parallel(parallel).build().unwrap();
        let mut rows: Vec<OutputRow> = Vec::new();
        let err = DecayPipeline::new(config)
            .unwrap()
            .run(&FailingSource, &mut rows)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EventOutOfRange { index: 1, .. }));
        // The first event was already streamed out
        assert_eq!(rows.len(), 2, "parallel={}", parallel);
    }
}

#[test]
fn test_json_lines_output() {
    let batch = EventBatch::new(vec![omega_scenario(), bare_primary_scenario(), omega_scenario()]);
    let mut sink = JsonLinesSink::new(Vec::new());
    let reporter = CompositeReporter::new(DebugReporter::new(), LoggingReporter::new());
    let summary = default_pipeline()
        .run_with_reporter(&batch, &mut sink, reporter)
        .unwrap();
    sink.finish().unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let rows: Vec<OutputRow> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(rows.len(), summary.rows);
    let events: Vec<_> = rows.iter().map(|r| r.event_index).collect();
    assert_eq!(events, vec![0, 0, 2, 2]);
    assert!(text.starts_with(r#"{"event_index":0,"decay_instance_key":10,"role":0,"#));
}

#[test]
fn test_batch_json_round_trip_through_pipeline() {
    let batch = noisy_batch(5, 8);
    let reloaded = EventBatch::from_json_str(&batch.to_json()).unwrap();
    let pipeline = default_pipeline();
    let (rows, summary) = pipeline.collect_rows(&batch).unwrap();
    let (reloaded_rows, reloaded_summary) = pipeline.collect_rows(&reloaded).unwrap();

    let keys = |rows: &[OutputRow]| -> Vec<_> {
        rows.iter()
            .map(|r| (r.event_index, r.decay_instance_key, r.role, r.track_id, r.detector_id))
            .collect()
    };
    assert_eq!(summary, reloaded_summary);
    assert_eq!(keys(&rows), keys(&reloaded_rows));
}
