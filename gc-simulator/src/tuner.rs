//! Adaptive survival threshold
//!
//! Re-evaluated at the end of every cycle from the number of objects that
//! cycle collected.

/// Below this many collections the threshold goes up
pub const RAISE_BELOW: usize = 10;
/// Above this many collections the threshold goes down
pub const LOWER_ABOVE: usize = 30;

/// Direction of a tuning step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Raised,
    Lowered,
    Unchanged,
}

/// Next threshold for a cycle that collected `collected` objects
///
/// Never goes below 1. There is no upper bound.
pub fn tune(threshold: u32, collected: usize) -> u32 {
    match adjustment(threshold, collected) {
        Adjustment::Raised => threshold.saturating_add(1),
        Adjustment::Lowered => threshold - 1,
        Adjustment::Unchanged => threshold,
    }
}

pub fn adjustment(threshold: u32, collected: usize) -> Adjustment {
    if collected < RAISE_BELOW {
        Adjustment::Raised
    } else if collected > LOWER_ABOVE && threshold > 1 {
        Adjustment::Lowered
    } else {
        Adjustment::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_on_few_collections() {
        assert_eq!(tune(3, 0), 4);
        assert_eq!(tune(3, 9), 4);
    }

    #[test]
    fn test_lower_on_many_collections() {
        assert_eq!(tune(3, 31), 2);
        assert_eq!(tune(3, 35), 2);
    }

    #[test]
    fn test_band_is_inclusive() {
        assert_eq!(tune(3, 10), 3);
        assert_eq!(tune(3, 30), 3);
    }

    #[test]
    fn test_floor_at_one() {
        assert_eq!(tune(1, 1000), 1);
        assert_eq!(adjustment(1, 1000), Adjustment::Unchanged);
        assert_eq!(tune(2, 1000), 1);
    }

    #[test]
    fn test_no_upper_bound() {
        let mut threshold = 3;
        for _ in 0..100 {
            threshold = tune(threshold, 0);
        }
        assert_eq!(threshold, 103);
    }
}
