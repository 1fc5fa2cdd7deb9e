//! Structured simulation event log
//!
//! The simulator reports everything it does as a [`SimEvent`] delivered to an
//! [`EventSink`]. Sinks must be cheap and must not fail the simulation; a
//! sink that cannot write logs a warning and carries on.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::generational::Generation;
use crate::object::ObjectId;
use crate::stats::{CycleOutcome, SimulationReport};

/// One entry of the event log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    /// Object allocated into the young generation
    ObjectCreated { id: ObjectId },
    /// Link appended to a new object's refs
    ReferenceLinked { from: ObjectId, to: ObjectId },
    /// Object registered in the leak tracker
    LeakMarked { id: ObjectId },
    /// Strong reference dropped by the driver
    RootReleased { id: ObjectId },
    /// Unreferenced object removed from its generation
    Collected { id: ObjectId, generation: Generation },
    /// Survivor moved to an older generation
    Promoted {
        id: ObjectId,
        from: Generation,
        to: Generation,
        age: u32,
    },
    /// Fragmentation level measured at the end of a sweep
    FragmentationMeasured {
        cycle: u64,
        level: f64,
        overridden: bool,
    },
    /// Compaction pass ran
    Compacted {
        cycle: u64,
        cost_ms: u64,
        suspended: bool,
    },
    /// Survival threshold re-evaluated
    ThresholdTuned {
        previous: u32,
        current: u32,
        collected: usize,
    },
    /// Cycle finished
    CycleCompleted(CycleOutcome),
    /// Final statistics
    Report(SimulationReport),
}

impl SimEvent {
    /// Short machine name, matching the serialized `event` tag
    pub fn kind(&self) -> &'static str {
        match self {
            SimEvent::ObjectCreated { .. } => "object_created",
            SimEvent::ReferenceLinked { .. } => "reference_linked",
            SimEvent::LeakMarked { .. } => "leak_marked",
            SimEvent::RootReleased { .. } => "root_released",
            SimEvent::Collected { .. } => "collected",
            SimEvent::Promoted { .. } => "promoted",
            SimEvent::FragmentationMeasured { .. } => "fragmentation_measured",
            SimEvent::Compacted { .. } => "compacted",
            SimEvent::ThresholdTuned { .. } => "threshold_tuned",
            SimEvent::CycleCompleted(_) => "cycle_completed",
            SimEvent::Report(_) => "report",
        }
    }
}

/// Receives simulation events as they happen
pub trait EventSink {
    fn emit(&mut self, event: &SimEvent);

    /// Push buffered output to its destination
    ///
    /// Sinks that write nothing keep the default no-op.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &SimEvent) {
        (**self).emit(event);
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: &SimEvent) {
        (**self).emit(event);
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Fan out to two sinks
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &SimEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()?;
        self.1.flush()
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SimEvent) {}
}

/// Forwards events to `tracing`
///
/// Per-object events go out at DEBUG, cycle summaries and the report at INFO.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &SimEvent) {
        match event {
            SimEvent::ObjectCreated { id } => debug!(id = %id, "object created"),
            SimEvent::ReferenceLinked { from, to } => {
                debug!(from = %from, to = %to, "reference linked")
            }
            SimEvent::LeakMarked { id } => debug!(id = %id, "object marked as leaked"),
            SimEvent::RootReleased { id } => debug!(id = %id, "strong reference released"),
            SimEvent::Collected { id, generation } => {
                debug!(id = %id, generation = %generation, "object collected")
            }
            SimEvent::Promoted { id, from, to, age } => {
                debug!(id = %id, from = %from, to = %to, age, "object promoted")
            }
            SimEvent::FragmentationMeasured {
                cycle,
                level,
                overridden,
            } => debug!(cycle, level, overridden, "fragmentation measured"),
            SimEvent::Compacted {
                cycle,
                cost_ms,
                suspended,
            } => info!(cycle, cost_ms, suspended, "heap compacted"),
            SimEvent::ThresholdTuned {
                previous,
                current,
                collected,
            } => {
                if previous != current {
                    info!(previous, current, collected, "survival threshold tuned");
                } else {
                    debug!(current, collected, "survival threshold unchanged");
                }
            }
            SimEvent::CycleCompleted(outcome) => info!(
                cycle = outcome.cycle,
                collected = outcome.collected,
                promoted = outcome.promoted(),
                frag_level = outcome.frag_level,
                threshold = outcome.threshold,
                "collection cycle completed"
            ),
            SimEvent::Report(report) => info!(
                young = report.young_count,
                middle = report.middle_count,
                old = report.old_count,
                leaks = report.leak_count,
                avg_fragmentation = report.avg_fragmentation,
                threshold = report.survival_threshold,
                created = report.total_created,
                "simulation finished"
            ),
        }
    }
}

/// Keeps every event in memory
///
/// Clones share one buffer, so a handle kept outside the simulation sees
/// everything the simulation emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SimEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub fn events(&self) -> Vec<SimEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of recorded events of the given kind
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &SimEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Writes one JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &SimEvent) {
        if self.failed {
            return;
        }
        let written = serde_json::to_writer(&mut self.writer, event)
            .map_err(io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = written {
            // stop after the first failure instead of warning per event
            warn!(error = %e, "event log write failed, disabling JSON event output");
            self.failed = true;
        }
    }

    /// Flushes the writer; an earlier dropped write is reported here too
    fn flush(&mut self) -> io::Result<()> {
        if self.failed {
            return Err(io::Error::other("event log is incomplete after a failed write"));
        }
        self.writer.flush()
    }
}
