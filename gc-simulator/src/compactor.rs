//! Simulated compaction
//!
//! No objects move. A compaction pass costs a random number of milliseconds,
//! spent as a blocking sleep outside test mode.

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::SimulationConfig;
use crate::events::{EventSink, SimEvent};
use crate::random::RandomSource;

/// Outcome of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionReport {
    /// Simulated cost in milliseconds
    pub cost_ms: u64,
    /// Whether the cost was actually slept
    pub suspended: bool,
}

#[derive(Debug, Clone)]
pub struct Compactor {
    cost_ms: RangeInclusive<u64>,
    suspend: bool,
}

impl Compactor {
    pub fn new(cost_ms: RangeInclusive<u64>, suspend: bool) -> Self {
        Self { cost_ms, suspend }
    }

    /// Cost range from the config; sleeps unless in test mode
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.compaction_cost_min_ms..=config.compaction_cost_max_ms,
            !config.test_mode,
        )
    }

    pub fn cost_range(&self) -> &RangeInclusive<u64> {
        &self.cost_ms
    }

    /// Run one compaction pass
    pub fn compact(
        &self,
        cycle: u64,
        rng: &mut dyn RandomSource,
        sink: &mut dyn EventSink,
    ) -> CompactionReport {
        let cost_ms = rng.range_inclusive(*self.cost_ms.start(), *self.cost_ms.end());

        if self.suspend {
            std::thread::sleep(Duration::from_millis(cost_ms));
        }

        sink.emit(&SimEvent::Compacted {
            cycle,
            cost_ms,
            suspended: self.suspend,
        });

        CompactionReport {
            cost_ms,
            suspended: self.suspend,
        }
    }
}
