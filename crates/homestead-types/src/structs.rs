//! Core entity structs for the Homestead game.
//!
//! Covers the immutable catalog (`Plant`, `Prop`), the mutable farm state
//! (`Farm`, `LandPlot`, `User`, inventory stock), social edges, and the
//! append-only logs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::enums::{
    ActionType, FriendshipStatus, GrowthStageName, Hazard, ItemType, PropType,
    ShopTransactionKind, TargetModel, WaterState,
};
use crate::ids::{FarmId, PlantId, PlotId, PropId, UserId};

// ---------------------------------------------------------------------------
// Catalog: crops
// ---------------------------------------------------------------------------

/// One named stage on a crop's growth curve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GrowthStage {
    /// Stage name.
    pub name: GrowthStageName,
    /// Offset in seconds from planting at which this stage ends.
    pub end_seconds: u32,
}

/// Growth curve of a crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GrowthCurve {
    /// Seconds from planting until maturity.
    pub total_seconds: u32,
    /// Stages ordered by ascending `end_seconds`.
    pub stages: Vec<GrowthStage>,
}

/// Purchase cost of a crop's seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SeedCost {
    /// Gold price per seed.
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Premium currency price per seed (zero for ordinary crops).
    #[serde(default)]
    pub premium: u32,
}

/// What a harvest of the crop yields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CropRevenue {
    /// Shop price for one unit of fruit.
    #[ts(as = "String")]
    pub sell_price_per_unit: Decimal,
    /// Fruit units produced by one planting.
    #[serde(rename = "yield")]
    pub yield_units: u32,
}

/// Economic parameters of a crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CropEconomics {
    /// Seed cost.
    pub cost: SeedCost,
    /// Harvest revenue.
    pub revenue: CropRevenue,
}

/// Experience granted for harvesting a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CropRewards {
    /// Experience per harvested plot.
    pub exp: u32,
}

/// An immutable crop definition from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Plant {
    /// Catalog identifier.
    pub id: PlantId,
    /// Display name.
    pub name: String,
    /// Image URL, if any.
    pub image: Option<String>,
    /// Minimum player level to buy or plant the seed.
    pub required_level: u32,
    /// Free-form crop category used in shop descriptions.
    pub category: Option<String>,
    /// Growth curve.
    pub growth: GrowthCurve,
    /// Costs and yield.
    pub economics: CropEconomics,
    /// Harvest rewards.
    pub rewards: CropRewards,
}

// ---------------------------------------------------------------------------
// Catalog: props
// ---------------------------------------------------------------------------

/// An immutable shop prop definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Prop {
    /// Catalog identifier.
    pub id: PropId,
    /// Display name.
    pub name: String,
    /// Shop description.
    pub description: String,
    /// Prop category.
    pub prop_type: PropType,
    /// Shop price, or `None` when the prop cannot be bought.
    #[ts(as = "Option<String>")]
    pub buy_price: Option<Decimal>,
    /// Price the shop pays per unit.
    #[ts(as = "String")]
    pub sell_price: Decimal,
    /// Free-form effect description, e.g. `{"type":"timeReduction","value":900}`.
    pub effect: serde_json::Value,
    /// Image URL, if any.
    pub image: Option<String>,
}

// ---------------------------------------------------------------------------
// Farm state
// ---------------------------------------------------------------------------

/// A player's farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Farm {
    /// Farm identifier.
    pub id: FarmId,
    /// Owner of the farm.
    pub user_id: UserId,
    /// Last maturity cycle id handed out. Only ever increases.
    pub maturity_cycle_counter: i64,
}

/// A single farmable cell within a farm.
///
/// The cycle-scoped fields (`maturity_cycle_id`, water and fertilizer
/// flags, hazards, `stolen_num`, `growth_time_reduced_seconds`) are reset
/// together by [`LandPlot::cleared`] and [`LandPlot::planted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LandPlot {
    /// Plot identifier.
    pub id: PlotId,
    /// Owning farm.
    pub farm_id: FarmId,
    /// Stable position within the farm.
    pub plot_index: i32,
    /// Crop currently planted.
    pub plant_id: Option<PlantId>,
    /// When the current crop was planted.
    pub plant_time: Option<DateTime<Utc>>,
    /// Cycle id of the current planting.
    pub maturity_cycle_id: Option<i64>,
    /// Watering state.
    pub water_state: WaterState,
    /// Whether fertilizer was applied this cycle.
    pub fertilized: bool,
    /// Weeds present.
    pub has_weeds: bool,
    /// Friend who placed the weeds.
    pub weed_placed_by: Option<UserId>,
    /// Pests present.
    pub has_pests: bool,
    /// Friend who placed the pests.
    pub pest_placed_by: Option<UserId>,
    /// Fruit units stolen from the current planting.
    pub stolen_num: u32,
    /// Accumulated fertilizer reduction for the current planting.
    pub growth_time_reduced_seconds: u32,
}

impl LandPlot {
    /// A freshly created, empty plot.
    pub const fn empty(id: PlotId, farm_id: FarmId, plot_index: i32) -> Self {
        Self {
            id,
            farm_id,
            plot_index,
            plant_id: None,
            plant_time: None,
            maturity_cycle_id: None,
            water_state: WaterState::Fresh,
            fertilized: false,
            has_weeds: false,
            weed_placed_by: None,
            has_pests: false,
            pest_placed_by: None,
            stolen_num: 0,
            growth_time_reduced_seconds: 0,
        }
    }

    /// Whether a crop is currently planted.
    pub const fn is_planted(&self) -> bool {
        self.plant_id.is_some() && self.plant_time.is_some()
    }

    /// This plot reset to the empty state, keeping identity only.
    #[must_use]
    pub const fn cleared(&self) -> Self {
        Self::empty(self.id, self.farm_id, self.plot_index)
    }

    /// This plot carrying a new planting stamped with `cycle_id`.
    #[must_use]
    pub fn planted(&self, plant_id: PlantId, at: DateTime<Utc>, cycle_id: i64) -> Self {
        Self {
            plant_id: Some(plant_id),
            plant_time: Some(at),
            maturity_cycle_id: Some(cycle_id),
            ..self.cleared()
        }
    }

    /// Whether the given hazard is present.
    pub const fn has_hazard(&self, hazard: Hazard) -> bool {
        match hazard {
            Hazard::Weed => self.has_weeds,
            Hazard::Pest => self.has_pests,
        }
    }

    /// Who placed the given hazard, if a friend did.
    pub const fn hazard_placed_by(&self, hazard: Hazard) -> Option<UserId> {
        match hazard {
            Hazard::Weed => self.weed_placed_by,
            Hazard::Pest => self.pest_placed_by,
        }
    }

    /// This plot with the hazard set (`Some`) or cleared (`None`).
    #[must_use]
    pub fn with_hazard(&self, hazard: Hazard, placed_by: Option<UserId>) -> Self {
        let mut next = self.clone();
        let present = placed_by.is_some();
        match hazard {
            Hazard::Weed => {
                next.has_weeds = present;
                next.weed_placed_by = placed_by;
            }
            Hazard::Pest => {
                next.has_pests = present;
                next.pest_placed_by = placed_by;
            }
        }
        next
    }
}

/// A player account's game state.
///
/// Level is derived from `exp` and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct User {
    /// Player identifier.
    pub id: UserId,
    /// Display name.
    pub nick_name: String,
    /// Cumulative experience.
    pub exp: u64,
    /// Gold balance, an integer amount.
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Premium currency balance.
    pub premium_currency: u32,
}

/// Quantity of a crop item (seed or fruit) held by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CropStock {
    /// Crop the item belongs to.
    pub plant_id: PlantId,
    /// `Seed` or `Fruit`.
    pub item_type: ItemType,
    /// Units held.
    pub quantity: u32,
}

/// Quantity of a prop held by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PropStock {
    /// Prop held.
    pub prop_id: PropId,
    /// Units held.
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// A directed friendship edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Friendship {
    /// Player who created the edge.
    pub requester_id: UserId,
    /// Player the edge points at.
    pub addressee_id: UserId,
    /// Edge status.
    pub status: FriendshipStatus,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

/// Key of the per-day sabotage counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DailyCounterKey {
    /// Acting player.
    pub user_id: UserId,
    /// Counted action.
    pub action: ActionType,
    /// Calendar day (UTC).
    pub day: NaiveDate,
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// One row of the append-only player audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerLogEntry {
    /// Row identifier (UUID v7).
    pub id: Uuid,
    /// Acting player.
    pub user_id: UserId,
    /// What the player did.
    pub action_type: ActionType,
    /// Kind of entity affected.
    pub target_model: TargetModel,
    /// Key of the affected entity.
    pub target_id: Option<i64>,
    /// Snapshot before the action.
    pub old_data: Option<serde_json::Value>,
    /// Snapshot after the action.
    pub new_data: Option<serde_json::Value>,
    /// Human-readable description.
    pub param: String,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

/// One shop transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ShopLogEntry {
    /// Row identifier (UUID v7).
    pub id: Uuid,
    /// Trading player.
    pub user_id: UserId,
    /// Kind of item traded.
    pub item_type: ItemType,
    /// Plant id for seeds and fruit, prop id for props.
    pub item_id: i64,
    /// Units traded.
    pub quantity: u32,
    /// Unit price.
    #[ts(as = "String")]
    pub price_per_unit: Decimal,
    /// Total price.
    #[ts(as = "String")]
    pub total_price: Decimal,
    /// Buy or sell.
    pub transaction: ShopTransactionKind,
    /// When the trade happened.
    pub created_at: DateTime<Utc>,
}
