//! Collection cycle engine
//!
//! One cycle sweeps young then middle, measures fragmentation, compacts if
//! needed and re-tunes the survival threshold. Objects promoted into middle
//! during a cycle are not looked at again until the next cycle.

use tracing::debug;

use crate::compactor::Compactor;
use crate::events::{EventSink, SimEvent};
use crate::fragmentation;
use crate::generational::{Generation, GenerationalHeap};
use crate::oracle::ReferenceOracle;
use crate::random::RandomSource;
use crate::state::SimulationState;
use crate::stats::CycleOutcome;
use crate::tuner;

/// Bucket changes made by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepResult {
    pub collected: usize,
    pub promoted_to_middle: usize,
    pub promoted_to_old: usize,
}

/// Sweep young and middle once against `oracle`
///
/// Young survivors whose age reaches `threshold` move to the end of middle.
/// Middle survivors whose age reaches `threshold * 2` move to the end of old.
/// Middle is processed as it was before this sweep's promotions.
pub fn sweep(
    heap: &mut GenerationalHeap,
    oracle: &dyn ReferenceOracle,
    threshold: u32,
    sink: &mut dyn EventSink,
) -> SweepResult {
    let mut result = SweepResult::default();
    let middle_snapshot = std::mem::take(heap.bucket_mut(Generation::Middle));
    let young = std::mem::take(heap.bucket_mut(Generation::Young));
    let mut promoted = Vec::new();

    // 1. young
    for object in young {
        let id = object.id();
        if !oracle.is_strongly_referenced(id) {
            heap.forget_age(id);
            result.collected += 1;
            sink.emit(&SimEvent::Collected {
                id,
                generation: Generation::Young,
            });
            continue;
        }

        let age = heap.increment_age(id);
        if age >= threshold {
            sink.emit(&SimEvent::Promoted {
                id,
                from: Generation::Young,
                to: Generation::Middle,
                age,
            });
            promoted.push(object);
        } else {
            heap.bucket_mut(Generation::Young).push(object);
        }
    }

    // 2. middle, pre-promotion snapshot
    let old_threshold = threshold.saturating_mul(2);
    let mut middle = Vec::with_capacity(middle_snapshot.len() + promoted.len());
    for object in middle_snapshot {
        let id = object.id();
        if !oracle.is_strongly_referenced(id) {
            heap.forget_age(id);
            result.collected += 1;
            sink.emit(&SimEvent::Collected {
                id,
                generation: Generation::Middle,
            });
            continue;
        }

        let age = heap.increment_age(id);
        if age >= old_threshold {
            sink.emit(&SimEvent::Promoted {
                id,
                from: Generation::Middle,
                to: Generation::Old,
                age,
            });
            heap.bucket_mut(Generation::Old).push(object);
            result.promoted_to_old += 1;
        } else {
            middle.push(object);
        }
    }

    result.promoted_to_middle = promoted.len();
    middle.extend(promoted);
    *heap.bucket_mut(Generation::Middle) = middle;

    result
}

/// Run one full collection cycle against the state's strong references
pub fn run_cycle(
    state: &mut SimulationState,
    rng: &mut dyn RandomSource,
    sink: &mut dyn EventSink,
) -> CycleOutcome {
    let cycle = state.totals.cycles + 1;
    let threshold = state.survival_threshold;

    let swept = sweep(&mut state.heap, &state.strong_refs, threshold, sink);

    // 3. fragmentation
    let reading = fragmentation::measure(&state.heap, state.active_override(), rng);
    state.fragmentation_history.push(reading.level);
    sink.emit(&SimEvent::FragmentationMeasured {
        cycle,
        level: reading.level,
        overridden: reading.overridden,
    });

    // 4. compaction
    let compaction_ms = if reading.level > state.config.fragmentation_threshold {
        let report = Compactor::from_config(&state.config).compact(cycle, rng, sink);
        Some(report.cost_ms)
    } else {
        None
    };

    // 5. tuning
    let tuned = tuner::tune(threshold, swept.collected);
    state.survival_threshold = tuned;
    sink.emit(&SimEvent::ThresholdTuned {
        previous: threshold,
        current: tuned,
        collected: swept.collected,
    });

    let outcome = CycleOutcome {
        cycle,
        collected: swept.collected,
        frag_level: reading.level,
        threshold: tuned,
        promoted_to_middle: swept.promoted_to_middle,
        promoted_to_old: swept.promoted_to_old,
        compaction_ms,
    };
    state.totals.record(&outcome);
    debug!(
        cycle,
        young = state.heap.len(Generation::Young),
        middle = state.heap.len(Generation::Middle),
        old = state.heap.len(Generation::Old),
        "generation sizes after cycle"
    );
    sink.emit(&SimEvent::CycleCompleted(outcome.clone()));

    outcome
}
