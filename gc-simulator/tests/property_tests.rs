//! Property-Based Collection Tests
//!
//! Uses proptest to build random heaps and check the cycle invariants.

use std::collections::HashSet;

use proptest::prelude::*;

use gc_simulator::{
    Generation, NullSink, ObjectId, SimulatedObject, Simulation, SimulationConfig,
    SimulationState, StdRandom, run_cycle,
};

/// (generation, age, referenced) per object
fn heap_strategy() -> impl Strategy<Value = Vec<(u8, u32, bool)>> {
    prop::collection::vec((0u8..3, 0u32..12, any::<bool>()), 0..80)
}

fn build_state(objects: &[(u8, u32, bool)], threshold: u32) -> SimulationState {
    let mut state = SimulationState::new(SimulationConfig::testing());
    state.set_survival_threshold(threshold);
    for (generation, age, referenced) in objects {
        let id = state.next_object_id();
        let generation = match *generation {
            0 => Generation::Young,
            1 => Generation::Middle,
            _ => Generation::Old,
        };
        state
            .heap_mut()
            .insert(generation, SimulatedObject::new(id));
        state.heap_mut().set_age(id, *age);
        if *referenced {
            state.strong_refs_mut().insert(id);
        }
    }
    state
}

proptest! {
    /// Property: unreferenced young/middle objects are gone after one cycle
    #[test]
    fn prop_unreferenced_objects_are_collected(
        objects in heap_strategy(),
        threshold in 1u32..6,
        seed in any::<u64>(),
    ) {
        let mut state = build_state(&objects, threshold);
        let doomed: Vec<ObjectId> = objects
            .iter()
            .enumerate()
            .filter(|(_, (generation, _, referenced))| *generation < 2 && !*referenced)
            .map(|(i, _)| ObjectId(i as u64))
            .collect();

        let outcome = run_cycle(&mut state, &mut StdRandom::seeded(seed), &mut NullSink);

        prop_assert_eq!(outcome.collected, doomed.len());
        for id in doomed {
            prop_assert_eq!(state.heap().generation_of(id), None);
            prop_assert_eq!(state.heap().age(id), None);
        }
    }

    /// Property: referenced objects stay live and never move backwards
    #[test]
    fn prop_referenced_objects_survive(
        objects in heap_strategy(),
        threshold in 1u32..6,
    ) {
        let mut state = build_state(&objects, threshold);
        let before: Vec<_> = (0..objects.len() as u64)
            .map(|i| state.heap().generation_of(ObjectId(i)))
            .collect();

        run_cycle(&mut state, &mut StdRandom::seeded(0), &mut NullSink);

        for (i, (_, _, referenced)) in objects.iter().enumerate() {
            if !referenced {
                continue;
            }
            let id = ObjectId(i as u64);
            let after = state.heap().generation_of(id);
            prop_assert!(after.is_some());
            prop_assert!(after >= before[i]);
        }
    }

    /// Property: buckets stay disjoint and the live count only drops by `collected`
    #[test]
    fn prop_buckets_stay_disjoint(
        objects in heap_strategy(),
        threshold in 1u32..6,
    ) {
        let mut state = build_state(&objects, threshold);
        let live_before = state.heap().live_count();

        let outcome = run_cycle(&mut state, &mut StdRandom::seeded(1), &mut NullSink);

        let mut seen = HashSet::new();
        for generation in Generation::ALL {
            for obj in state.heap().bucket(generation) {
                prop_assert!(seen.insert(obj.id()));
            }
        }
        prop_assert_eq!(state.heap().live_count(), live_before - outcome.collected);
    }

    /// Property: threshold never drops below 1 and history grows by one per cycle
    #[test]
    fn prop_threshold_floor_and_history(
        cycles in prop::collection::vec(0usize..60, 1..20),
        start in 1u32..4,
    ) {
        let mut state = SimulationState::new(SimulationConfig::testing());
        state.set_survival_threshold(start);

        for (n, batch) in cycles.iter().enumerate() {
            for _ in 0..*batch {
                let id = state.next_object_id();
                state.heap_mut().allocate(SimulatedObject::new(id));
            }
            let history_before = state.fragmentation_history().to_vec();

            let outcome = run_cycle(&mut state, &mut StdRandom::seeded(n as u64), &mut NullSink);

            prop_assert!(outcome.threshold >= 1);
            prop_assert!((0.0..=1.0).contains(&outcome.frag_level));
            prop_assert_eq!(state.fragmentation_history().len(), n + 1);
            prop_assert_eq!(&state.fragmentation_history()[..n], &history_before[..]);
        }
    }

    /// Property: leaks are never forgotten during a run
    #[test]
    fn prop_leaks_persist(seed in any::<u64>(), total in 100usize..800) {
        let config = SimulationConfig {
            total_objects: total,
            cycle_interval: 50,
            leak_probability: 0.2,
            ..SimulationConfig::testing()
        };
        let mut sim = Simulation::new(config).unwrap().with_random(StdRandom::seeded(seed));

        let mut leaked_so_far = 0;
        for i in 0..total {
            sim.create_object();
            if i > 0 && i % 50 == 0 {
                sim.run_cycle();
                let leaks = sim.state().leaks().len();
                prop_assert!(leaks >= leaked_so_far);
                leaked_so_far = leaks;
            }
        }
        sim.drain();
        prop_assert!(sim.state().leaks().len() >= leaked_so_far);
    }
}
