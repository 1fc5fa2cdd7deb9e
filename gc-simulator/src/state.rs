//! Owned state of one simulation
//!
//! Everything a run mutates lives here and is passed by `&mut`. Two
//! `SimulationState`s never share anything.

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::generational::{Generation, GenerationalHeap};
use crate::leak::LeakTracker;
use crate::object::ObjectId;
use crate::oracle::StrongReferenceSet;
use crate::stats::{self, RunTotals, SimulationReport};

#[derive(Debug, Clone)]
pub struct SimulationState {
    pub(crate) config: SimulationConfig,
    pub(crate) heap: GenerationalHeap,
    pub(crate) strong_refs: StrongReferenceSet,
    pub(crate) leaks: LeakTracker,
    pub(crate) survival_threshold: u32,
    pub(crate) fragmentation_history: Vec<f64>,
    pub(crate) fragmentation_override: Option<f64>,
    pub(crate) next_id: u64,
    pub(crate) totals: RunTotals,
}

impl SimulationState {
    /// Fresh state; the config is assumed to be validated
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            survival_threshold: config.initial_survival_threshold,
            fragmentation_override: config.mock_fragmentation,
            config,
            heap: GenerationalHeap::new(),
            strong_refs: StrongReferenceSet::new(),
            leaks: LeakTracker::new(),
            fragmentation_history: Vec::new(),
            next_id: 0,
            totals: RunTotals::default(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn heap(&self) -> &GenerationalHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut GenerationalHeap {
        &mut self.heap
    }

    pub fn strong_refs(&self) -> &StrongReferenceSet {
        &self.strong_refs
    }

    pub fn strong_refs_mut(&mut self) -> &mut StrongReferenceSet {
        &mut self.strong_refs
    }

    pub fn leaks(&self) -> &LeakTracker {
        &self.leaks
    }

    pub fn leaks_mut(&mut self) -> &mut LeakTracker {
        &mut self.leaks
    }

    pub fn survival_threshold(&self) -> u32 {
        self.survival_threshold
    }

    /// Overwrite the threshold; values below 1 are raised to 1
    pub fn set_survival_threshold(&mut self, threshold: u32) {
        self.survival_threshold = threshold.max(1);
    }

    /// One entry per cycle, oldest first
    pub fn fragmentation_history(&self) -> &[f64] {
        &self.fragmentation_history
    }

    pub fn average_fragmentation(&self) -> f64 {
        stats::mean(&self.fragmentation_history)
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Number of objects created so far
    pub fn total_created(&self) -> u64 {
        self.next_id
    }

    /// Hand out the next sequential id
    pub fn next_object_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inject a fixed fragmentation level for subsequent cycles
    ///
    /// Only accepted in test mode. `None` restores the random estimate.
    pub fn set_fragmentation_override(&mut self, level: Option<f64>) -> SimResult<()> {
        if let Some(level) = level {
            if !self.config.test_mode {
                return Err(SimError::OverrideRequiresTestMode);
            }
            if !(0.0..=1.0).contains(&level) {
                return Err(SimError::InvalidFragmentation(level));
            }
        }
        self.fragmentation_override = level;
        Ok(())
    }

    /// Override to use for the next measurement, if any
    pub(crate) fn active_override(&self) -> Option<f64> {
        if self.config.test_mode {
            self.fragmentation_override
        } else {
            None
        }
    }

    /// Back to a freshly created state with the same config
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }

    /// Statistics record for the current state
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            young_count: self.heap.len(Generation::Young),
            middle_count: self.heap.len(Generation::Middle),
            old_count: self.heap.len(Generation::Old),
            leak_count: self.leaks.len(),
            avg_fragmentation: self.average_fragmentation(),
            survival_threshold: self.survival_threshold,
            total_created: self.next_id,
            cycles: self.totals.cycles,
            total_collected: self.totals.collected,
            total_promoted: self.totals.promoted,
            compactions: self.totals.compactions,
            total_compaction_ms: self.totals.compaction_ms,
            detached_leaks: self.leaks.detached(&self.heap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SimulatedObject;

    #[test]
    fn test_new_uses_initial_threshold() {
        let state = SimulationState::new(SimulationConfig::default());
        assert_eq!(state.survival_threshold(), 3);
        assert!(state.fragmentation_history().is_empty());
        assert_eq!(state.total_created(), 0);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut state = SimulationState::new(SimulationConfig::testing());
        assert_eq!(state.next_object_id(), ObjectId(0));
        assert_eq!(state.next_object_id(), ObjectId(1));
        assert_eq!(state.total_created(), 2);
    }

    #[test]
    fn test_override_requires_test_mode() {
        let mut state = SimulationState::new(SimulationConfig::default());
        assert!(matches!(
            state.set_fragmentation_override(Some(0.5)),
            Err(SimError::OverrideRequiresTestMode)
        ));
        assert!(state.set_fragmentation_override(None).is_ok());
        assert_eq!(state.active_override(), None);
    }

    #[test]
    fn test_override_range_checked() {
        let mut state = SimulationState::new(SimulationConfig::testing());
        assert!(state.set_fragmentation_override(Some(1.2)).is_err());
        state.set_fragmentation_override(Some(0.3)).unwrap();
        assert_eq!(state.active_override(), Some(0.3));
    }

    #[test]
    fn test_mock_fragmentation_from_config() {
        let config = SimulationConfig {
            mock_fragmentation: Some(0.25),
            ..SimulationConfig::testing()
        };
        let state = SimulationState::new(config);
        assert_eq!(state.active_override(), Some(0.25));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut state = SimulationState::new(SimulationConfig::testing());
        let id = state.next_object_id();
        state.heap_mut().allocate(SimulatedObject::new(id));
        state.strong_refs_mut().insert(id);
        state
            .leaks_mut()
            .mark_leaked(id, SimulatedObject::new(id));
        state.set_survival_threshold(9);
        state.fragmentation_history.push(0.4);

        state.reset();

        assert_eq!(state.survival_threshold(), 3);
        assert!(state.heap().is_empty());
        assert!(state.strong_refs().is_empty());
        assert!(state.leaks().is_empty());
        assert!(state.fragmentation_history().is_empty());
        assert_eq!(state.next_object_id(), ObjectId(0));
    }

    #[test]
    fn test_threshold_setter_floors_at_one() {
        let mut state = SimulationState::new(SimulationConfig::testing());
        state.set_survival_threshold(0);
        assert_eq!(state.survival_threshold(), 1);
    }
}
