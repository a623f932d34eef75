//! Level derivation from cumulative experience.
//!
//! Players start at level 1. Advancing from level `n` to `n + 1` costs
//! `50·n² + 150·n` experience. Level is never stored; it is recomputed from
//! the cumulative total whenever a view is built or a level gate is checked.

use serde::{Deserialize, Serialize};

/// Level of a player with zero experience.
pub const STARTING_LEVEL: u32 = 1;

/// Hard ceiling on derived levels.
pub const MAX_LEVEL: u32 = 999;

/// Experience needed to advance from `level` to the next level.
pub const fn exp_to_next_level(level: u32) -> u64 {
    let level = level as u64;
    50_u64
        .saturating_mul(level)
        .saturating_mul(level)
        .saturating_add(150_u64.saturating_mul(level))
}

/// Where a player stands on the leveling curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Derived level.
    pub level: u32,
    /// Experience earned since reaching `level`.
    pub exp_into_level: u64,
    /// Experience the current level requires to advance.
    pub exp_to_next_level: u64,
}

/// Full progress for a cumulative experience total.
pub fn progress(total_exp: u64) -> LevelProgress {
    let mut level = STARTING_LEVEL;
    let mut remaining = total_exp;
    loop {
        let needed = exp_to_next_level(level);
        if level >= MAX_LEVEL || remaining < needed {
            return LevelProgress {
                level,
                exp_into_level: remaining,
                exp_to_next_level: needed,
            };
        }
        remaining = remaining.saturating_sub(needed);
        level = level.saturating_add(1);
    }
}

/// Derived level for a cumulative experience total.
pub fn level_for_exp(total_exp: u64) -> u32 {
    progress(total_exp).level
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_matches_formula() {
        assert_eq!(exp_to_next_level(1), 200);
        assert_eq!(exp_to_next_level(2), 500);
        assert_eq!(exp_to_next_level(10), 6500);
    }

    #[test]
    fn levels_advance_at_cumulative_thresholds() {
        assert_eq!(level_for_exp(0), 1);
        assert_eq!(level_for_exp(199), 1);
        assert_eq!(level_for_exp(200), 2);
        assert_eq!(level_for_exp(699), 2);
        assert_eq!(level_for_exp(700), 3);
    }

    #[test]
    fn progress_reports_position_within_level() {
        let p = progress(250);
        assert_eq!(p.level, 2);
        assert_eq!(p.exp_into_level, 50);
        assert_eq!(p.exp_to_next_level, 500);
    }

    #[test]
    fn level_is_capped() {
        assert_eq!(level_for_exp(u64::MAX), MAX_LEVEL);
    }

    #[test]
    fn level_is_monotonic_in_exp() {
        let mut last = 0;
        for exp in (0..20_000).step_by(37) {
            let level = level_for_exp(exp);
            assert!(level >= last);
            last = level;
        }
    }
}
