//! Enumeration types for the Homestead game.
//!
//! Wire names follow the web client's conventions: item, prop, and action
//! kinds travel in `SCREAMING_SNAKE_CASE`, crop status in lowercase, and
//! growth stage names in `camelCase`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Plot state
// ---------------------------------------------------------------------------

/// Watering state of a land plot.
///
/// Persisted and rendered as a small integer: `0` fresh, `1` watered,
/// `2` needs water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum WaterState {
    /// Newly planted or empty ground, no watering pending.
    #[default]
    Fresh,
    /// Watered during the current cycle.
    Watered,
    /// The crop is dry and can be watered for experience.
    NeedsWater,
}

impl WaterState {
    /// Numeric code used in storage and in plot views.
    pub const fn code(self) -> u8 {
        match self {
            Self::Fresh => 0,
            Self::Watered => 1,
            Self::NeedsWater => 2,
        }
    }

    /// Decode a stored numeric code. Unknown codes yield `None`.
    pub const fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::Fresh),
            1 => Some(Self::Watered),
            2 => Some(Self::NeedsWater),
            _ => None,
        }
    }
}

/// Lifecycle status of a plot, derived from its planting facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum CropStatus {
    /// Nothing is planted.
    Empty,
    /// A crop is planted and still growing.
    Growing,
    /// The crop has finished growing and can be harvested or stolen.
    Matured,
}

/// Named growth stage of a crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum GrowthStageName {
    /// Seed has just sprouted.
    Germination,
    /// First small leaves.
    Leaflet,
    /// Large leaves, most of the growing time.
    Largeleaf,
    /// Ready for harvest.
    InitialMaturity,
}

/// A hazard that friends can place on (or clear from) a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Hazard {
    /// Weeds choking the crop.
    Weed,
    /// Pests eating the crop.
    Pest,
}

impl Hazard {
    /// Action recorded when the plot owner clears this hazard.
    pub const fn tend_action(self) -> ActionType {
        match self {
            Self::Weed => ActionType::Weed,
            Self::Pest => ActionType::Pest,
        }
    }

    /// Action recorded (and quota-counted) when a friend places this hazard.
    pub const fn sabotage_action(self) -> ActionType {
        match self {
            Self::Weed => ActionType::SabotageWeed,
            Self::Pest => ActionType::SabotagePest,
        }
    }

    /// Action recorded when a friend clears this hazard for the owner.
    pub const fn help_action(self) -> ActionType {
        match self {
            Self::Weed => ActionType::HelpWeed,
            Self::Pest => ActionType::HelpPest,
        }
    }

    /// Lowercase noun used in log descriptions.
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Weed => "weeds",
            Self::Pest => "pests",
        }
    }
}

// ---------------------------------------------------------------------------
// Items and catalog
// ---------------------------------------------------------------------------

/// Kind of an inventory or shop item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ItemType {
    /// Plantable seed of a crop.
    Seed,
    /// Harvested (or stolen) produce of a crop.
    Fruit,
    /// A shop prop such as fertilizer or decoration.
    Prop,
}

/// Category of a shop prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum PropType {
    /// Shortens crop growth time.
    Fertilizer,
    /// Cosmetic farm decoration.
    Decoration,
    /// Single-use buff.
    Consumable,
    /// Special upgrade item.
    Special,
}

/// How a fertilizer reduction value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ReductionKind {
    /// Percentage of the crop's total growth time.
    Percentage,
    /// Flat number of seconds.
    Seconds,
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

/// Kind of player action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ActionType {
    /// Planting a seed on an own plot.
    Plant,
    /// Watering an own plot.
    Water,
    /// Fertilizing an own plot.
    Fertilize,
    /// Removing weeds from an own plot.
    Weed,
    /// Removing pests from an own plot.
    Pest,
    /// Harvesting an own plot.
    Harvest,
    /// Stealing from a friend's plot.
    Steal,
    /// Placing weeds on a friend's plot.
    SabotageWeed,
    /// Placing pests on a friend's plot.
    SabotagePest,
    /// Removing weeds from a friend's plot.
    HelpWeed,
    /// Removing pests from a friend's plot.
    HelpPest,
}

/// Kind of entity an audit row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TargetModel {
    /// A single land plot.
    #[serde(rename = "LANDPLOT")]
    LandPlot,
    /// A whole farm (batch summary rows).
    #[serde(rename = "FARM")]
    Farm,
}

/// Direction of a shop transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ShopTransactionKind {
    /// Player bought from the shop.
    Buy,
    /// Player sold to the shop.
    Sell,
}

// ---------------------------------------------------------------------------
// Social
// ---------------------------------------------------------------------------

/// Status of a directed friendship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum FriendshipStatus {
    /// Request sent, not yet answered.
    Pending,
    /// Both players are friends (stored as a mirrored pair).
    Accepted,
    /// The addressee blocked the requester.
    Blocked,
}

/// Leaderboard category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LeaderboardKind {
    /// Ranked by gold.
    Wealth,
    /// Ranked by experience (and therefore level).
    Level,
    /// Ranked by number of successful steals.
    StealCount,
    /// Ranked by number of harvested plots.
    HarvestCount,
    /// Ranked by weeds and pests placed on friends' farms.
    SabotageCount,
    /// Ranked by weeds and pests cleared from friends' farms.
    HelpCount,
}

impl LeaderboardKind {
    /// Audit actions counted by this board, or `None` for boards that rank
    /// a user column directly.
    pub const fn counted_actions(self) -> Option<&'static [ActionType]> {
        match self {
            Self::Wealth | Self::Level => None,
            Self::StealCount => Some(&[ActionType::Steal]),
            Self::HarvestCount => Some(&[ActionType::Harvest]),
            Self::SabotageCount => Some(&[ActionType::SabotageWeed, ActionType::SabotagePest]),
            Self::HelpCount => Some(&[ActionType::HelpWeed, ActionType::HelpPest]),
        }
    }

    /// Stable key fragment used by the leaderboard cache.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wealth => "wealth",
            Self::Level => "level",
            Self::StealCount => "steal_count",
            Self::HarvestCount => "harvest_count",
            Self::SabotageCount => "sabotage_count",
            Self::HelpCount => "help_count",
        }
    }
}
