//! Fragmentation estimator
//!
//! Stochastic stand-in for a real layout measurement: every object slot in
//! the young and middle generations is declared empty on a fair coin flip.
//! The old generation is not measured.

use crate::generational::{Generation, GenerationalHeap};
use crate::random::RandomSource;

/// A measured (or injected) fragmentation level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentationReading {
    /// Ratio of empty slots in [0, 1]
    pub level: f64,
    /// True when the level came from an override
    pub overridden: bool,
}

/// Empty-slot ratio over `slots` coin flips, 0 when there are no slots
pub fn estimate(slots: usize, rng: &mut dyn RandomSource) -> f64 {
    if slots == 0 {
        return 0.0;
    }
    let empty = (0..slots).filter(|_| rng.coin()).count();
    empty as f64 / slots as f64
}

/// Measure the heap, or return `override_level` verbatim when given
pub fn measure(
    heap: &GenerationalHeap,
    override_level: Option<f64>,
    rng: &mut dyn RandomSource,
) -> FragmentationReading {
    match override_level {
        Some(level) => FragmentationReading {
            level,
            overridden: true,
        },
        None => FragmentationReading {
            level: estimate(
                heap.len(Generation::Young) + heap.len(Generation::Middle),
                rng,
            ),
            overridden: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectId, SimulatedObject};
    use crate::random::{FixedRandom, StdRandom};

    #[test]
    fn test_no_slots_is_zero() {
        let mut rng = FixedRandom::always();
        assert_eq!(estimate(0, &mut rng), 0.0);
    }

    #[test]
    fn test_all_empty_and_all_full() {
        assert_eq!(estimate(40, &mut FixedRandom::always()), 1.0);
        assert_eq!(estimate(40, &mut FixedRandom::never()), 0.0);
    }

    #[test]
    fn test_random_estimate_in_unit_range() {
        let mut rng = StdRandom::seeded(11);
        for slots in [1, 7, 100, 1000] {
            let level = estimate(slots, &mut rng);
            assert!((0.0..=1.0).contains(&level));
        }
    }

    #[test]
    fn test_old_generation_is_ignored() {
        let mut heap = GenerationalHeap::new();
        for i in 0..10 {
            heap.insert(Generation::Old, SimulatedObject::new(ObjectId(i)));
        }

        let reading = measure(&heap, None, &mut FixedRandom::always());
        assert_eq!(reading.level, 0.0);
        assert!(!reading.overridden);
    }

    #[test]
    fn test_override_is_verbatim() {
        let heap = GenerationalHeap::new();
        let reading = measure(&heap, Some(0.3), &mut FixedRandom::never());
        assert_eq!(reading.level, 0.3);
        assert!(reading.overridden);
    }
}
