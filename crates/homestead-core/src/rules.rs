//! Game-rule constants and the arithmetic built on them.
//!
//! All experience, steal, fertilizer, quota, and pricing numbers live here
//! so the engines never embed magic values. Every function uses checked or
//! saturating arithmetic.

use rust_decimal::Decimal;

use homestead_types::ReductionKind;

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// Experience unit for tending actions. Batch tending grants this per plot.
pub const BASE_INTERACTION_EXP: u32 = 30;

/// Single-plot tending (water, fertilize, weed, pest) grants a third of the
/// base unit.
pub const LIGHT_ACTION_DIVISOR: u32 = 3;

/// Experience credited to a friend who clears a hazard for the owner.
pub const HELP_INTERACTION_EXP: u32 = 15;

/// Experience for one single-plot tending action.
pub const fn light_action_exp() -> u32 {
    match BASE_INTERACTION_EXP.checked_div(LIGHT_ACTION_DIVISOR) {
        Some(exp) => exp,
        None => 0,
    }
}

/// Experience for a batch tending action over `plots` plots.
///
/// Returns `None` on overflow.
pub fn batch_exp(plots: u32) -> Option<u64> {
    u64::from(plots).checked_mul(u64::from(BASE_INTERACTION_EXP))
}

// ---------------------------------------------------------------------------
// Stealing and harvesting
// ---------------------------------------------------------------------------

/// Share of a crop's yield a single steal takes, in percent.
pub const STEAL_PERCENT: u32 = 10;

/// Units the owner would still receive from a harvest.
pub const fn harvestable_units(yield_units: u32, stolen_num: u32) -> u32 {
    yield_units.saturating_sub(stolen_num)
}

/// Units one steal takes: `max(1, floor(yield * 10%))`, clamped to what is
/// left. Zero means the crop is fully stolen.
pub fn steal_amount(yield_units: u32, stolen_num: u32) -> u32 {
    let remaining = harvestable_units(yield_units, stolen_num);
    let share = u64::from(yield_units)
        .saturating_mul(u64::from(STEAL_PERCENT))
        .checked_div(100)
        .and_then(|units| u32::try_from(units).ok())
        .unwrap_or(0)
        .max(1);
    share.min(remaining)
}

// ---------------------------------------------------------------------------
// Fertilizer
// ---------------------------------------------------------------------------

/// Seconds a fertilizer application takes off the growth time.
///
/// `Percentage` takes `floor(total_seconds * value / 100)`; `Seconds` takes
/// `value` directly.
pub fn fertilizer_reduction(kind: ReductionKind, value: u32, total_seconds: u32) -> u32 {
    match kind {
        ReductionKind::Seconds => value,
        ReductionKind::Percentage => u64::from(total_seconds)
            .saturating_mul(u64::from(value))
            .checked_div(100)
            .and_then(|secs| u32::try_from(secs).ok())
            .unwrap_or(u32::MAX),
    }
}

// ---------------------------------------------------------------------------
// Sabotage quota
// ---------------------------------------------------------------------------

/// Sabotage actions of one kind a player may perform per calendar day.
pub const MAX_SABOTAGE_ACTIONS_PER_DAY: u32 = 5;

/// Whether a counter that stands at `count` after an increment is still
/// within the daily cap.
pub const fn within_daily_quota(count: u32) -> bool {
    count <= MAX_SABOTAGE_ACTIONS_PER_DAY
}

// ---------------------------------------------------------------------------
// Shop pricing
// ---------------------------------------------------------------------------

/// Price the shop pays for one seed: half its buy price, rounded down.
pub fn seed_resale_price(buy_price: Decimal) -> Decimal {
    buy_price
        .checked_div(Decimal::TWO)
        .map_or(Decimal::ZERO, |half| half.floor())
}

/// `unit_price * quantity`, or `None` on overflow.
pub fn total_price(unit_price: Decimal, quantity: u32) -> Option<Decimal> {
    unit_price.checked_mul(Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_batch_exp_constants_are_pinned() {
        assert_eq!(BASE_INTERACTION_EXP, 30);
        assert_eq!(light_action_exp(), 10);
        assert_eq!(batch_exp(3), Some(90));
        assert_eq!(HELP_INTERACTION_EXP, 15);
    }

    #[test]
    fn steal_takes_ten_percent_with_floor_of_one() {
        assert_eq!(steal_amount(10, 0), 1);
        assert_eq!(steal_amount(50, 0), 5);
        assert_eq!(steal_amount(5, 0), 1);
        assert_eq!(steal_amount(99, 0), 9);
    }

    #[test]
    fn steal_is_clamped_to_remaining_yield() {
        assert_eq!(steal_amount(50, 48), 2);
        assert_eq!(steal_amount(10, 10), 0);
        assert_eq!(steal_amount(10, 12), 0);
    }

    #[test]
    fn harvest_gets_yield_minus_stolen() {
        assert_eq!(harvestable_units(10, 2), 8);
        assert_eq!(harvestable_units(10, 11), 0);
    }

    #[test]
    fn percentage_fertilizer_floors() {
        assert_eq!(fertilizer_reduction(ReductionKind::Percentage, 50, 1000), 500);
        assert_eq!(fertilizer_reduction(ReductionKind::Percentage, 33, 100), 33);
        assert_eq!(fertilizer_reduction(ReductionKind::Percentage, 10, 15), 1);
        assert_eq!(fertilizer_reduction(ReductionKind::Seconds, 900, 1000), 900);
    }

    #[test]
    fn quota_allows_exactly_five() {
        assert!(within_daily_quota(5));
        assert!(!within_daily_quota(6));
    }

    #[test]
    fn seed_resale_is_half_rounded_down() {
        assert_eq!(seed_resale_price(Decimal::new(25, 0)), Decimal::new(12, 0));
        assert_eq!(seed_resale_price(Decimal::new(10, 0)), Decimal::new(5, 0));
    }

    #[test]
    fn total_price_multiplies() {
        assert_eq!(total_price(Decimal::new(50, 0), 3), Some(Decimal::new(150, 0)));
    }
}
