//! Simulation driver
//!
//! Populate creates objects and runs a cycle every `cycle_interval`
//! creations, drain runs one last cycle, report summarizes the run.

use std::io;

use tracing::info;

use crate::config::SimulationConfig;
use crate::cycle;
use crate::error::SimResult;
use crate::events::{EventSink, SimEvent, TracingSink};
use crate::object::{ObjectId, SimulatedObject};
use crate::random::{RandomSource, StdRandom};
use crate::state::SimulationState;
use crate::stats::{CycleOutcome, SimulationReport};

/// A single simulation run with its random source and event sink
pub struct Simulation {
    state: SimulationState,
    rng: Box<dyn RandomSource>,
    sink: Box<dyn EventSink>,
}

impl Simulation {
    /// Validate `config` and build a simulation logging through `tracing`
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let rng = StdRandom::new(config.seed);
        Ok(Self {
            state: SimulationState::new(config),
            rng: Box::new(rng),
            sink: Box::new(TracingSink),
        })
    }

    /// Replace the random source
    pub fn with_random(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        self.state.config()
    }

    /// See [`SimulationState::set_fragmentation_override`]
    pub fn set_fragmentation_override(&mut self, level: Option<f64>) -> SimResult<()> {
        self.state.set_fragmentation_override(level)
    }

    /// Create one object: maybe link it to an existing root, maybe make it a
    /// root itself, maybe mark it leaked, then allocate it into young.
    pub fn create_object(&mut self) -> ObjectId {
        let id = self.state.next_object_id();
        let mut object = SimulatedObject::new(id);
        self.sink.emit(&SimEvent::ObjectCreated { id });

        if id.0 > 0 && self.rng.chance(self.state.config.link_probability) {
            let target = self
                .rng
                .index(self.state.strong_refs.len())
                .and_then(|pos| self.state.strong_refs.get(pos));
            if let Some(target) = target {
                object.link(target);
                self.sink.emit(&SimEvent::ReferenceLinked { from: id, to: target });
            }
        }

        if self.rng.chance(self.state.config.root_probability) {
            self.state.strong_refs.insert(id);
        }

        if self.rng.chance(self.state.config.leak_probability)
            && self.state.leaks.mark_leaked(id, object.clone())
        {
            self.sink.emit(&SimEvent::LeakMarked { id });
        }

        self.state.heap.allocate(object);
        id
    }

    /// Drop strong references at random before a cycle
    ///
    /// Does nothing, and draws nothing from the random source, when
    /// `release_probability` is 0.
    pub fn release_roots(&mut self) -> usize {
        let probability = self.state.config.release_probability;
        if probability <= 0.0 {
            return 0;
        }

        let candidates: Vec<_> = self.state.strong_refs.iter().collect();
        let mut released = 0;
        for id in candidates {
            if self.rng.chance(probability) {
                self.state.strong_refs.remove(id);
                self.sink.emit(&SimEvent::RootReleased { id });
                released += 1;
            }
        }
        released
    }

    /// Release roots (if configured) and run one collection cycle
    pub fn run_cycle(&mut self) -> CycleOutcome {
        self.release_roots();
        cycle::run_cycle(&mut self.state, self.rng.as_mut(), self.sink.as_mut())
    }

    /// Create `total_objects` objects, collecting every `cycle_interval`
    pub fn populate(&mut self) -> Vec<CycleOutcome> {
        let total = self.state.config.total_objects;
        let interval = self.state.config.cycle_interval;
        let mut outcomes = Vec::with_capacity(total / interval + 1);

        for i in 0..total {
            self.create_object();
            if i > 0 && i % interval == 0 {
                outcomes.push(self.run_cycle());
            }
        }
        outcomes
    }

    /// Final unconditional cycle
    pub fn drain(&mut self) -> CycleOutcome {
        self.run_cycle()
    }

    /// Build the statistics record and emit it
    pub fn report(&mut self) -> SimulationReport {
        let report = self.state.report();
        self.sink.emit(&SimEvent::Report(report.clone()));
        report
    }

    /// Flush the event sink; errors from buffered writes surface here
    pub fn flush_events(&mut self) -> io::Result<()> {
        self.sink.flush()
    }

    /// Populate, drain, report
    pub fn run(&mut self) -> SimulationReport {
        info!(
            objects = self.state.config.total_objects,
            interval = self.state.config.cycle_interval,
            test_mode = self.state.config.test_mode,
            "starting simulation"
        );
        self.populate();
        self.drain();
        self.report()
    }

    /// Restart from an empty heap with the initial survival threshold
    ///
    /// The random source keeps its position; reseed it with
    /// [`Simulation::with_random`] for a repeatable restart.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}
