//! # Generational GC Simulator
//!
//! A discrete simulation of a three-generation garbage collector:
//! - objects are allocated into the young generation and age by surviving cycles
//! - survivors are promoted young -> middle -> old as their age crosses the
//!   survival threshold (and twice the threshold for middle -> old)
//! - reachability is a flat strong-reference flag per object, never a graph walk
//! - a stochastic fragmentation estimate triggers simulated compaction
//! - the survival threshold is re-tuned after every cycle
//! - a leak tracker records objects that would be held outside the heap
//!
//! ## Usage
//!
//! ```no_run
//! use gc_simulator::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     seed: Some(42),
//!     ..SimulationConfig::default()
//! };
//! let mut sim = Simulation::new(config)?;
//! let report = sim.run();
//! println!("{} objects survived", report.survivors());
//! # Ok::<(), gc_simulator::SimError>(())
//! ```
//!
//! Each [`Simulation`] owns all of its state, so independent simulations can
//! run side by side, one per thread if needed.

#![warn(unused_extern_crates)]
#![warn(unused_imports)]

pub mod compactor;
pub mod config;
pub mod cycle;
pub mod driver;
pub mod error;
pub mod events;
pub mod fragmentation;
pub mod generational;
pub mod leak;
pub mod object;
pub mod oracle;
pub mod random;
pub mod state;
pub mod stats;
pub mod tuner;

pub use compactor::{CompactionReport, Compactor};
pub use config::SimulationConfig;
pub use cycle::{SweepResult, run_cycle, sweep};
pub use driver::Simulation;
pub use error::{SimError, SimResult};
pub use events::{EventSink, JsonLinesSink, NullSink, RecordingSink, SimEvent, TracingSink};
pub use fragmentation::FragmentationReading;
pub use generational::{Generation, GenerationalHeap};
pub use leak::LeakTracker;
pub use object::{ObjectId, SimulatedObject};
pub use oracle::{ReferenceOracle, StrongReferenceSet};
pub use random::{FixedRandom, RandomSource, StdRandom};
pub use state::SimulationState;
pub use stats::{CycleOutcome, RunTotals, SimulationReport};
