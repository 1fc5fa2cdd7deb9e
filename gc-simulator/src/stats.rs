//! Cycle results and run statistics

use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// Result of one collection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleOutcome {
    /// 1-based cycle number within the run
    pub cycle: u64,
    /// Objects removed from young and middle
    pub collected: usize,
    /// Fragmentation level measured after the sweep
    pub frag_level: f64,
    /// Survival threshold after tuning
    pub threshold: u32,
    /// Objects moved young -> middle
    pub promoted_to_middle: usize,
    /// Objects moved middle -> old
    pub promoted_to_old: usize,
    /// Simulated compaction cost, if compaction ran
    pub compaction_ms: Option<u64>,
}

impl CycleOutcome {
    pub fn promoted(&self) -> usize {
        self.promoted_to_middle + self.promoted_to_old
    }

    pub fn compacted(&self) -> bool {
        self.compaction_ms.is_some()
    }
}

/// Running totals across all cycles of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of cycles run
    pub cycles: u64,
    /// Objects collected across all cycles
    pub collected: u64,
    /// Promotions across all cycles
    pub promoted: u64,
    /// Compactions triggered
    pub compactions: u64,
    /// Sum of simulated compaction costs
    pub compaction_ms: u64,
}

impl RunTotals {
    /// Record a finished cycle
    pub fn record(&mut self, outcome: &CycleOutcome) {
        self.cycles += 1;
        self.collected += outcome.collected as u64;
        self.promoted += outcome.promoted() as u64;
        if let Some(cost) = outcome.compaction_ms {
            self.compactions += 1;
            self.compaction_ms += cost;
        }
    }
}

/// Final statistics record of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub young_count: usize,
    pub middle_count: usize,
    pub old_count: usize,
    pub leak_count: usize,
    /// Mean of the fragmentation history, 0 with no cycles
    pub avg_fragmentation: f64,
    pub survival_threshold: u32,
    pub total_created: u64,
    pub cycles: u64,
    pub total_collected: u64,
    pub total_promoted: u64,
    pub compactions: u64,
    pub total_compaction_ms: u64,
    /// Leaked objects no longer present in any generation
    pub detached_leaks: Vec<ObjectId>,
}

impl SimulationReport {
    /// Objects still in a generation
    pub fn survivors(&self) -> usize {
        self.young_count + self.middle_count + self.old_count
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> crate::SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
