//! Response payloads handed to the HTTP boundary.
//!
//! Every field is `camelCase` on the wire. Currency amounts are
//! [`Decimal`] values, which serialize as decimal strings so the client
//! never sees a lossy floating point number.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CropStatus, GrowthStageName, ItemType, LeaderboardKind, PropType};
use crate::ids::{FarmId, PlantId, PlotId, UserId};

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Crop summary embedded in a plot view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlotPlantView {
    /// Crop id.
    pub id: PlantId,
    /// Crop name.
    pub name: String,
    /// Crop image.
    pub image: Option<String>,
}

/// A plot with its derived growth status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlotView {
    /// Plot id.
    pub id: PlotId,
    /// Position within the farm.
    pub plot_index: i32,
    /// Planted crop, if any.
    pub plant: Option<PlotPlantView>,
    /// Derived lifecycle status.
    pub status: CropStatus,
    /// Derived growth stage.
    pub current_stage: Option<GrowthStageName>,
    /// Derived growth progress, 0 to 100.
    pub growth_percentage: u8,
    /// Derived seconds until maturity.
    pub remaining_seconds: u64,
    /// `0` fresh, `1` watered, `2` needs water.
    pub water_state: u8,
    /// `1` when fertilized this cycle.
    pub fertilizer_state: u8,
    /// Weeds present.
    pub has_weeds: bool,
    /// Pests present.
    pub has_pests: bool,
    /// Units already stolen this cycle.
    pub stolen_num: u32,
}

/// Public player state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserView {
    /// Player id.
    pub id: UserId,
    /// Display name.
    pub nick_name: String,
    /// Derived level.
    pub level: u32,
    /// Cumulative experience.
    pub exp: u64,
    /// Experience the current level requires to advance.
    pub exp_to_next_level: u64,
    /// Gold as a decimal string.
    #[ts(as = "String")]
    pub gold: Decimal,
    /// Premium currency.
    pub premium_currency: u32,
}

/// One inventory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ItemView {
    /// Plant id for seeds and fruit, prop id for props.
    pub item_id: i64,
    /// Item name.
    pub name: String,
    /// Units.
    pub quantity: u32,
}

/// A player's inventory. Only lines with a positive quantity appear.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InventoryView {
    /// Seeds.
    pub seeds: Vec<ItemView>,
    /// Harvested and stolen fruit.
    pub fruits: Vec<ItemView>,
    /// Props grouped by prop type.
    pub props: BTreeMap<PropType, Vec<ItemView>>,
}

/// User and inventory together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlayerStateView {
    /// Player.
    pub user: UserView,
    /// Inventory.
    pub inventory: InventoryView,
}

/// A farm with every plot's derived status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FarmView {
    /// Farm id.
    pub farm_id: FarmId,
    /// Owner.
    pub owner_id: UserId,
    /// Plots ordered by index.
    pub plots: Vec<PlotView>,
}

/// Result of registering a new player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RegistrationView {
    /// New player.
    pub user: UserView,
    /// Starter farm.
    pub farm: FarmView,
    /// Starter inventory.
    pub inventory: InventoryView,
}

// ---------------------------------------------------------------------------
// Single-plot responses
// ---------------------------------------------------------------------------

/// Plot and inventory after planting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlantResponse {
    /// Updated plot.
    pub plot: PlotView,
    /// Updated inventory.
    pub inventory: InventoryView,
}

/// Plot and user after a tending action (water, weed, pest).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TendResponse {
    /// Updated plot.
    pub plot: PlotView,
    /// Updated player.
    pub user: UserView,
}

/// Plot, user, and inventory after fertilizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FertilizeResponse {
    /// Updated plot.
    pub plot: PlotView,
    /// Updated player.
    pub user: UserView,
    /// Updated inventory.
    pub inventory: InventoryView,
    /// Seconds taken off the growth time.
    pub reduced_seconds: u32,
}

/// Gains from one harvested plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestGains {
    /// Experience earned.
    pub exp: u32,
    /// Fruit earned.
    pub item: ItemView,
}

/// Harvest line for one plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestDetail {
    /// Harvested plot.
    pub plot_index: i32,
    /// Gains.
    pub gains: HarvestGains,
}

/// Result of harvesting a single plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestResponse {
    /// What the harvest produced.
    pub harvest: HarvestDetail,
    /// The now empty plot.
    pub plot: PlotView,
    /// Updated player.
    pub user: UserView,
    /// Updated inventory.
    pub inventory: InventoryView,
}

// ---------------------------------------------------------------------------
// Batch responses
// ---------------------------------------------------------------------------

/// Water-all outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WaterAllResult {
    /// Plots watered.
    pub watered_count: u32,
    /// Experience earned.
    pub gained_exp: u64,
}

/// Water-all response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WaterAllResponse {
    /// Outcome.
    pub result: WaterAllResult,
    /// Updated player.
    pub user: UserView,
}

/// Weed-all or pest-all outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ClearAllResult {
    /// Plots cleared.
    pub removed_count: u32,
    /// Experience earned.
    pub gained_exp: u64,
}

/// Weed-all or pest-all response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ClearAllResponse {
    /// Outcome.
    pub result: ClearAllResult,
    /// Updated player.
    pub user: UserView,
}

/// Harvest-all totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestTotals {
    /// Experience earned across all plots.
    pub total_exp: u64,
    /// Fruit earned, one line per crop.
    pub total_items: Vec<ItemView>,
}

/// Harvest-all summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestSummary {
    /// Plots that produced fruit.
    pub harvested_plots_count: u32,
    /// Totals.
    pub total_gains: HarvestTotals,
}

/// Harvest-all report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestReport {
    /// Summary.
    pub summary: HarvestSummary,
    /// Per-plot lines.
    pub details: Vec<HarvestDetail>,
}

/// Harvest-all response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HarvestAllResponse {
    /// Report.
    pub harvest_report: HarvestReport,
    /// Plots cleared by the harvest.
    pub plots: Vec<PlotView>,
    /// Updated player.
    pub user: UserView,
    /// Updated inventory.
    pub inventory: InventoryView,
}

/// Plant-all outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlantReport {
    /// Plots planted.
    pub plant_count: u32,
}

/// Plant-all response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlantAllResponse {
    /// Outcome.
    pub plant_report: PlantReport,
    /// Newly planted plots.
    pub plots: Vec<PlotView>,
    /// Updated inventory.
    pub inventory: InventoryView,
}

// ---------------------------------------------------------------------------
// Social responses
// ---------------------------------------------------------------------------

/// Steal line for one plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealDetail {
    /// Plot stolen from.
    pub plot_index: i32,
    /// Fruit taken.
    pub stolen_item: ItemView,
}

/// Single steal response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealResponse {
    /// What was taken.
    pub steal: StealDetail,
    /// Stealer's updated inventory.
    pub inventory: InventoryView,
}

/// Steal-all totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealTotals {
    /// Fruit taken, one line per crop.
    pub items: Vec<ItemView>,
}

/// Steal-all summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealSummary {
    /// Plots stolen from.
    pub stolen_plots_count: u32,
    /// Totals.
    pub total_gains: StealTotals,
}

/// Steal-all report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealReport {
    /// Summary.
    pub summary: StealSummary,
    /// Per-plot lines.
    pub details: Vec<StealDetail>,
}

/// Steal-all response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StealAllResponse {
    /// Report.
    pub stolen_report: StealReport,
    /// Stealer's updated inventory.
    pub inventory: InventoryView,
}

/// Single sabotage response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SabotageResponse {
    /// The friend's updated plot.
    pub plot: PlotView,
    /// Sabotage actions of this kind used today, including this one.
    pub used_today: u32,
}

/// Batch sabotage response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SabotageAllResponse {
    /// Plots that received the hazard.
    pub placed_count: u32,
}

/// Help response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HelpResponse {
    /// The friend's updated plot.
    pub plot: PlotView,
    /// Helper's updated state.
    pub user: UserView,
}

/// A friend (or requester) as shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FriendView {
    /// Player id.
    pub id: UserId,
    /// Display name.
    pub nick_name: String,
    /// Derived level.
    pub level: u32,
}

/// An incoming friend request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PendingRequestView {
    /// Who sent the request.
    pub requester: FriendView,
    /// When it was sent.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Shop and leaderboard
// ---------------------------------------------------------------------------

/// One shop listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ShopListingItem {
    /// Plant id for seeds, prop id for props.
    pub item_id: i64,
    /// Item name.
    pub name: String,
    /// `SEED` or `PROP`.
    pub item_type: ItemType,
    /// Unit price.
    #[ts(as = "String")]
    pub buy_price: Decimal,
    /// Minimum level to buy.
    pub required_level: u32,
    /// Shop description.
    pub description: String,
    /// Image URL.
    pub image: Option<String>,
}

/// Everything the shop sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ShopListings {
    /// Seeds ordered by required level.
    pub seeds: Vec<ShopListingItem>,
    /// Purchasable props.
    pub props: Vec<ShopListingItem>,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// 1-based rank.
    pub rank: u32,
    /// Player id.
    pub user_id: UserId,
    /// Display name.
    pub nick_name: String,
    /// Derived level.
    pub level: u32,
    /// Ranked value as a decimal string.
    pub value: String,
}

/// A leaderboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardView {
    /// Board kind.
    #[serde(rename = "type")]
    pub kind: LeaderboardKind,
    /// Rows.
    pub entries: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gold_serializes_as_string() {
        let view = UserView {
            id: UserId::new(1),
            nick_name: "ada".to_owned(),
            level: 2,
            exp: 250,
            exp_to_next_level: 500,
            gold: Decimal::new(123_456_789_012_345, 0),
            premium_currency: 0,
        };
        let json = serde_json::to_value(&view).ok();
        let gold = json.as_ref().and_then(|v| v.get("gold")).cloned();
        assert_eq!(gold, Some(serde_json::json!("123456789012345")));
        let key = json.as_ref().and_then(|v| v.get("expToNextLevel")).cloned();
        assert_eq!(key, Some(serde_json::json!(500)));
    }

    #[test]
    fn props_are_grouped_by_type_name() {
        let mut inventory = InventoryView::default();
        inventory.props.insert(
            PropType::Fertilizer,
            vec![ItemView { item_id: 1, name: "Compost".to_owned(), quantity: 2 }],
        );
        let json = serde_json::to_value(&inventory).ok();
        let grouped = json
            .as_ref()
            .and_then(|v| v.pointer("/props/FERTILIZER/0/quantity"))
            .cloned();
        assert_eq!(grouped, Some(serde_json::json!(2)));
    }
}
