//! The growth clock: derives a plot's lifecycle status from stored facts.
//!
//! A plot stores only *when* its crop was planted and how many seconds of
//! fertilizer reduction it has accumulated. Everything else (status, stage,
//! remaining time, percentage) is computed here on read, against an explicit
//! `now`. Given identical inputs the result is always identical.
//!
//! Fertilizer shortens the effective total growth time. Elapsed time is
//! never adjusted:
//!
//! ```text
//! effective_total = max(0, total_seconds - growth_time_reduced_seconds)
//! elapsed         = now - plant_time
//! ```
//!
//! Elapsed time is measured in milliseconds so that `remaining_seconds`
//! rounds the same way a client would expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homestead_types::{CropStatus, GrowthStageName, LandPlot, Plant};

/// Milliseconds per second.
const MILLIS_PER_SECOND: i64 = 1_000;

/// Stage reported when a crop has matured but its curve lists no stages.
const FALLBACK_FINAL_STAGE: GrowthStageName = GrowthStageName::InitialMaturity;

/// Stage reported for a growing crop whose curve lists no stages.
const FALLBACK_FIRST_STAGE: GrowthStageName = GrowthStageName::Germination;

// ---------------------------------------------------------------------------
// GrowthStatus
// ---------------------------------------------------------------------------

/// Derived status of a single plot at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStatus {
    /// Lifecycle status.
    pub status: CropStatus,
    /// Current stage, `None` for an empty plot.
    pub current_stage: Option<GrowthStageName>,
    /// Whole seconds until maturity (0 when empty or matured).
    pub remaining_seconds: u64,
    /// Growth progress. Reaches 100 only when matured.
    pub growth_percentage: u8,
}

impl GrowthStatus {
    /// Status of a plot with nothing planted.
    pub const EMPTY: Self = Self {
        status: CropStatus::Empty,
        current_stage: None,
        remaining_seconds: 0,
        growth_percentage: 0,
    };

    /// Whether the crop can be harvested or stolen.
    pub const fn is_matured(&self) -> bool {
        matches!(self.status, CropStatus::Matured)
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute a plot's status at `now`.
///
/// `plant` is the catalog entry for `plot.plant_id`. Callers resolve it
/// first and treat a missing entry as an internal error; passing `None`
/// here reports the plot as empty.
pub fn calculate_status(plot: &LandPlot, plant: Option<&Plant>, now: DateTime<Utc>) -> GrowthStatus {
    let (Some(plant_time), Some(plant)) = (plot.plant_time, plant) else {
        return GrowthStatus::EMPTY;
    };
    if plot.plant_id.is_none() {
        return GrowthStatus::EMPTY;
    }

    let effective_total_ms = i64::from(plant.growth.total_seconds)
        .saturating_sub(i64::from(plot.growth_time_reduced_seconds))
        .max(0)
        .saturating_mul(MILLIS_PER_SECOND);
    let elapsed_ms = now
        .signed_duration_since(plant_time)
        .num_milliseconds()
        .max(0);

    if elapsed_ms >= effective_total_ms {
        return GrowthStatus {
            status: CropStatus::Matured,
            current_stage: Some(final_stage(plant)),
            remaining_seconds: 0,
            growth_percentage: 100,
        };
    }

    let remaining_ms = effective_total_ms.saturating_sub(elapsed_ms);
    // Round half up to whole seconds.
    let remaining_seconds = remaining_ms
        .saturating_add(MILLIS_PER_SECOND / 2)
        .checked_div(MILLIS_PER_SECOND)
        .and_then(|secs| u64::try_from(secs).ok())
        .unwrap_or(0);

    // Floor, so a growing crop never reports 100.
    let growth_percentage = elapsed_ms
        .saturating_mul(100)
        .checked_div(effective_total_ms)
        .and_then(|pct| u8::try_from(pct).ok())
        .unwrap_or(0)
        .min(99);

    GrowthStatus {
        status: CropStatus::Growing,
        current_stage: Some(stage_at(plant, elapsed_ms)),
        remaining_seconds,
        growth_percentage,
    }
}

/// The first stage (by ascending end offset) that ends after `elapsed_ms`,
/// or the first stage when none does.
fn stage_at(plant: &Plant, elapsed_ms: i64) -> GrowthStageName {
    let mut stages: Vec<_> = plant.growth.stages.iter().collect();
    stages.sort_by_key(|stage| stage.end_seconds);

    stages
        .iter()
        .find(|stage| i64::from(stage.end_seconds).saturating_mul(MILLIS_PER_SECOND) > elapsed_ms)
        .or_else(|| stages.first())
        .map_or(FALLBACK_FIRST_STAGE, |stage| stage.name)
}

/// The stage with the greatest end offset.
fn final_stage(plant: &Plant) -> GrowthStageName {
    plant
        .growth
        .stages
        .iter()
        .max_by_key(|stage| stage.end_seconds)
        .map_or(FALLBACK_FINAL_STAGE, |stage| stage.name)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use homestead_types::{
        CropEconomics, CropRevenue, CropRewards, FarmId, GrowthCurve, GrowthStage, PlantId, PlotId,
        SeedCost,
    };

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn plant(total_seconds: u32, stages: Vec<GrowthStage>) -> Plant {
        Plant {
            id: PlantId::new(1),
            name: "Radish".to_owned(),
            image: None,
            required_level: 1,
            category: None,
            growth: GrowthCurve {
                total_seconds,
                stages,
            },
            economics: CropEconomics {
                cost: SeedCost {
                    gold: Decimal::new(10, 0),
                    premium: 0,
                },
                revenue: CropRevenue {
                    sell_price_per_unit: Decimal::new(3, 0),
                    yield_units: 10,
                },
            },
            rewards: CropRewards { exp: 12 },
        }
    }

    fn single_stage_radish() -> Plant {
        plant(
            3600,
            vec![GrowthStage {
                name: GrowthStageName::InitialMaturity,
                end_seconds: 3600,
            }],
        )
    }

    fn four_stage_crop() -> Plant {
        plant(
            1000,
            vec![
                GrowthStage { name: GrowthStageName::Germination, end_seconds: 100 },
                GrowthStage { name: GrowthStageName::Leaflet, end_seconds: 300 },
                GrowthStage { name: GrowthStageName::Largeleaf, end_seconds: 800 },
                GrowthStage { name: GrowthStageName::InitialMaturity, end_seconds: 1000 },
            ],
        )
    }

    fn planted_plot(reduced: u32) -> LandPlot {
        let mut plot = LandPlot::empty(PlotId::new(1), FarmId::new(1), 1).planted(
            PlantId::new(1),
            t0(),
            1,
        );
        plot.growth_time_reduced_seconds = reduced;
        plot
    }

    #[test]
    fn empty_plot_reports_empty() {
        let plot = LandPlot::empty(PlotId::new(1), FarmId::new(1), 1);
        let radish = single_stage_radish();
        assert_eq!(calculate_status(&plot, Some(&radish), t0()), GrowthStatus::EMPTY);
    }

    #[test]
    fn one_second_before_maturity_is_still_growing() {
        let radish = single_stage_radish();
        let status = calculate_status(&planted_plot(0), Some(&radish), t0() + Duration::seconds(3599));
        assert_eq!(status.status, CropStatus::Growing);
        assert_eq!(status.remaining_seconds, 1);
        assert_eq!(status.growth_percentage, 99);
        assert_eq!(status.current_stage, Some(GrowthStageName::InitialMaturity));
    }

    #[test]
    fn matures_exactly_at_total_seconds() {
        let radish = single_stage_radish();
        let status = calculate_status(&planted_plot(0), Some(&radish), t0() + Duration::seconds(3600));
        assert!(status.is_matured());
        assert_eq!(status.remaining_seconds, 0);
        assert_eq!(status.growth_percentage, 100);
        assert_eq!(status.current_stage, Some(GrowthStageName::InitialMaturity));
    }

    #[test]
    fn fertilizer_shortens_effective_total() {
        let crop = four_stage_crop();
        let plot = planted_plot(500);
        let growing = calculate_status(&plot, Some(&crop), t0() + Duration::seconds(250));
        assert_eq!(growing.status, CropStatus::Growing);
        assert_eq!(growing.remaining_seconds, 250);
        assert_eq!(growing.growth_percentage, 50);
        let matured = calculate_status(&plot, Some(&crop), t0() + Duration::seconds(500));
        assert!(matured.is_matured());
    }

    #[test]
    fn reduction_beyond_total_matures_immediately() {
        let crop = four_stage_crop();
        let status = calculate_status(&planted_plot(5_000), Some(&crop), t0());
        assert!(status.is_matured());
    }

    #[test]
    fn stage_is_first_boundary_after_elapsed() {
        let crop = four_stage_crop();
        let plot = planted_plot(0);
        let at = |secs| calculate_status(&plot, Some(&crop), t0() + Duration::seconds(secs)).current_stage;
        assert_eq!(at(0), Some(GrowthStageName::Germination));
        assert_eq!(at(100), Some(GrowthStageName::Leaflet));
        assert_eq!(at(299), Some(GrowthStageName::Leaflet));
        assert_eq!(at(300), Some(GrowthStageName::Largeleaf));
        assert_eq!(at(999), Some(GrowthStageName::InitialMaturity));
    }

    #[test]
    fn unsorted_stages_are_ordered_before_lookup() {
        let mut crop = four_stage_crop();
        crop.growth.stages.reverse();
        let status = calculate_status(&planted_plot(0), Some(&crop), t0() + Duration::seconds(50));
        assert_eq!(status.current_stage, Some(GrowthStageName::Germination));
    }

    #[test]
    fn growing_never_reports_one_hundred_percent() {
        let radish = single_stage_radish();
        let plot = planted_plot(0);
        let almost = t0() + Duration::milliseconds(3_599_999);
        let status = calculate_status(&plot, Some(&radish), almost);
        assert_eq!(status.status, CropStatus::Growing);
        assert!(status.growth_percentage < 100);
    }

    #[test]
    fn calculation_is_idempotent_for_fixed_now() {
        let crop = four_stage_crop();
        let plot = planted_plot(120);
        let now = t0() + Duration::seconds(333);
        assert_eq!(
            calculate_status(&plot, Some(&crop), now),
            calculate_status(&plot, Some(&crop), now)
        );
    }

    #[test]
    fn clock_skew_before_planting_counts_as_zero_elapsed() {
        let radish = single_stage_radish();
        let status = calculate_status(&planted_plot(0), Some(&radish), t0() - Duration::seconds(30));
        assert_eq!(status.growth_percentage, 0);
        assert_eq!(status.remaining_seconds, 3600);
    }
}
