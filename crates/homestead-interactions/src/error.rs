//! Error taxonomy for every game operation.
//!
//! Each [`GameError`] variant belongs to exactly one [`ErrorKind`] and has a
//! stable numeric code that clients switch on. Preconditions are checked
//! inside the unit of work before any write, so an error always means
//! nothing was changed.

use std::fmt;

use serde::Serialize;

use homestead_db::DbError;
use homestead_types::{Hazard, PlantId, PropId, UserId};

/// Coarse error category, used by the HTTP layer to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Malformed or out-of-range input.
    Validation,
    /// Plot, crop, friend, or request absent.
    NotFound,
    /// Wrong state for the action.
    PreconditionFailed,
    /// Daily sabotage cap reached.
    QuotaExceeded,
    /// Duplicate or self-directed action.
    Conflict,
    /// Not enough seeds, gold, or stock.
    InsufficientResources,
    /// Not friends, blocked, or helping one's own sabotage.
    AuthorizationFailed,
    /// Missing data that should exist, or a store failure.
    Internal,
}

/// Errors returned by the game engines.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    // --- Input ---
    /// A request value is out of range.
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What is wrong.
        reason: String,
    },

    /// The acting player does not exist.
    #[error("player {user_id} does not exist")]
    UserNotFound {
        /// Unknown player.
        user_id: UserId,
    },

    // --- Plots ---
    /// No plot with this index on the farm.
    #[error("plot {plot_index} not found")]
    PlotNotFound {
        /// Requested index.
        plot_index: i32,
    },

    /// Planting needs an empty plot.
    #[error(fmt = fmt_plot_not_empty)]
    PlotNotEmpty {
        /// Occupied plot, or `None` when no plot on the farm is empty.
        plot_index: Option<i32>,
    },

    /// The action needs a planted crop.
    #[error("plot {plot_index} is empty")]
    PlotEmpty {
        /// Empty plot.
        plot_index: i32,
    },

    /// The crop is still growing.
    #[error("crop on plot {plot_index} matures in {remaining_seconds}s")]
    CropNotMatured {
        /// Growing plot.
        plot_index: i32,
        /// Seconds until maturity.
        remaining_seconds: u64,
    },

    /// The player's level is below the crop's requirement.
    #[error("level {required} required, player is level {current}")]
    LevelTooLow {
        /// Required level.
        required: u32,
        /// Player's derived level.
        current: u32,
    },

    /// Not enough seeds of the crop.
    #[error("not enough seeds of crop {plant_id}: holding {held}")]
    InsufficientSeeds {
        /// Crop.
        plant_id: PlantId,
        /// Seeds held.
        held: u32,
    },

    /// No matured crop with fruit left.
    #[error("nothing to harvest")]
    NothingToHarvest,

    /// No plot needs water.
    #[error("nothing to water")]
    NothingToWater,

    /// The hazard is not present.
    #[error("no {} to remove", .hazard.noun())]
    NoHazardToRemove {
        /// Absent hazard.
        hazard: Hazard,
    },

    // --- Social ---
    /// The two players are not mutual friends.
    #[error("player {friend_id} is not your friend")]
    NotFriends {
        /// Other player.
        friend_id: UserId,
    },

    /// Social actions and friend requests cannot target oneself.
    #[error("cannot interact with yourself")]
    SelfInteraction,

    /// The friend does not exist or has no farm.
    #[error("player {friend_id} not found")]
    FriendNotFound {
        /// Unknown player.
        friend_id: UserId,
    },

    /// One steal per plot per planting cycle.
    #[error(fmt = fmt_already_stolen)]
    AlreadyStolen {
        /// Plot, or `None` for a farm-wide steal.
        plot_index: Option<i32>,
    },

    /// Nothing left on the plot to steal.
    #[error("crop on plot {plot_index} is fully stolen")]
    CropFullyStolen {
        /// Plot.
        plot_index: i32,
    },

    /// Daily cap for this sabotage kind reached.
    #[error("daily sabotage limit reached: {used} of {limit} used")]
    DailySabotageLimitExceeded {
        /// Actions already used today, before this request.
        used: u32,
        /// Daily cap.
        limit: u32,
    },

    /// A helper cannot clear a hazard they placed themselves.
    #[error("cannot clear {} you placed yourself", .hazard.noun())]
    CannotHelpSelfSabotage {
        /// Hazard.
        hazard: Hazard,
    },

    /// The hazard is already present.
    #[error("plot already has {}", .hazard.noun())]
    PlotAlreadyHasHazard {
        /// Present hazard.
        hazard: Hazard,
    },

    // --- Economy ---
    /// Unknown crop id.
    #[error("crop {plant_id} not found")]
    CropNotFound {
        /// Requested crop.
        plant_id: PlantId,
    },

    /// Unknown prop id.
    #[error("prop {prop_id} not found")]
    PropNotFound {
        /// Requested prop.
        prop_id: PropId,
    },

    /// Not enough gold.
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold {
        /// Total price.
        needed: rust_decimal::Decimal,
        /// Balance.
        available: rust_decimal::Decimal,
    },

    /// Not enough units of the item to sell.
    #[error("not enough stock of item {item_id}: holding {held}")]
    InsufficientStock {
        /// Plant or prop id.
        item_id: i64,
        /// Units held.
        held: u32,
    },

    /// The shop does not sell this item.
    #[error("item {item_id} cannot be bought")]
    ItemNotPurchasable {
        /// Plant or prop id.
        item_id: i64,
    },

    // --- Friends ---
    /// The players are already friends.
    #[error("already friends")]
    AlreadyFriends,

    /// A request between the two players is already pending.
    #[error("a friend request is already pending")]
    FriendRequestPending,

    /// One player has blocked the other.
    #[error("friend request blocked")]
    FriendRequestBlocked,

    /// No pending request from this player.
    #[error("no pending request from player {requester_id}")]
    FriendRequestNotFound {
        /// Supposed requester.
        requester_id: UserId,
    },

    /// A request can only be accepted or blocked.
    #[error("a friend request can only be accepted or blocked")]
    InvalidFriendResponse,

    // --- Internal ---
    /// The player has no farm.
    #[error("player {user_id} has no farm")]
    FarmNotInitialized {
        /// Player.
        user_id: UserId,
    },

    /// A plot references a crop the catalog does not have.
    #[error("catalog is missing crop {plant_id}")]
    CatalogMissing {
        /// Missing crop.
        plant_id: PlantId,
    },

    /// A computed amount overflowed.
    #[error("arithmetic overflow computing {context}")]
    Overflow {
        /// What was computed.
        context: &'static str,
    },

    /// The store failed.
    #[error("store error: {0}")]
    Store(#[from] DbError),
}

#[allow(clippy::ref_option)]
fn fmt_plot_not_empty(plot_index: &Option<i32>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match plot_index {
        Some(index) => write!(f, "plot {index} is not empty"),
        None => f.write_str("no empty plot on the farm"),
    }
}

#[allow(clippy::ref_option)]
fn fmt_already_stolen(plot_index: &Option<i32>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match plot_index {
        Some(index) => write!(f, "already stolen from plot {index} this cycle"),
        None => f.write_str("already stolen from every ripe plot this cycle"),
    }
}

impl GameError {
    /// Category of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } | Self::InvalidFriendResponse => ErrorKind::Validation,
            Self::UserNotFound { .. }
            | Self::PlotNotFound { .. }
            | Self::FriendNotFound { .. }
            | Self::CropNotFound { .. }
            | Self::PropNotFound { .. }
            | Self::FriendRequestNotFound { .. } => ErrorKind::NotFound,
            Self::PlotNotEmpty { .. }
            | Self::PlotEmpty { .. }
            | Self::CropNotMatured { .. }
            | Self::LevelTooLow { .. }
            | Self::NothingToHarvest
            | Self::NothingToWater
            | Self::NoHazardToRemove { .. }
            | Self::CropFullyStolen { .. }
            | Self::PlotAlreadyHasHazard { .. }
            | Self::ItemNotPurchasable { .. } => ErrorKind::PreconditionFailed,
            Self::DailySabotageLimitExceeded { .. } => ErrorKind::QuotaExceeded,
            Self::SelfInteraction
            | Self::AlreadyStolen { .. }
            | Self::AlreadyFriends
            | Self::FriendRequestPending => ErrorKind::Conflict,
            Self::InsufficientSeeds { .. }
            | Self::InsufficientGold { .. }
            | Self::InsufficientStock { .. } => ErrorKind::InsufficientResources,
            Self::NotFriends { .. }
            | Self::CannotHelpSelfSabotage { .. }
            | Self::FriendRequestBlocked => ErrorKind::AuthorizationFailed,
            Self::FarmNotInitialized { .. }
            | Self::CatalogMissing { .. }
            | Self::Overflow { .. }
            | Self::Store(_) => ErrorKind::Internal,
        }
    }

    /// Stable machine-readable code.
    pub const fn code(&self) -> u32 {
        match self {
            Self::InvalidInput { .. } => 1000,
            Self::UserNotFound { .. } => 1001,
            Self::PlotNotFound { .. } => 2001,
            Self::PlotNotEmpty { .. } => 2002,
            Self::PlotEmpty { .. } => 2003,
            Self::CropNotMatured { .. } => 2004,
            Self::LevelTooLow { .. } => 2005,
            Self::InsufficientSeeds { .. } => 2006,
            Self::NothingToHarvest => 2007,
            Self::NothingToWater => 2008,
            Self::NoHazardToRemove {
                hazard: Hazard::Weed,
            } => 2009,
            Self::NoHazardToRemove {
                hazard: Hazard::Pest,
            } => 2010,
            Self::NotFriends { .. } => 3001,
            Self::SelfInteraction => 3002,
            Self::FriendNotFound { .. } => 3003,
            Self::AlreadyStolen { .. } => 3004,
            Self::CropFullyStolen { .. } => 3005,
            Self::DailySabotageLimitExceeded { .. } => 3006,
            Self::CannotHelpSelfSabotage { .. } => 3007,
            Self::PlotAlreadyHasHazard {
                hazard: Hazard::Weed,
            } => 3008,
            Self::PlotAlreadyHasHazard {
                hazard: Hazard::Pest,
            } => 3009,
            Self::CropNotFound { .. } => 4001,
            Self::PropNotFound { .. } => 4002,
            Self::InsufficientGold { .. } => 4003,
            Self::InsufficientStock { .. } => 4004,
            Self::ItemNotPurchasable { .. } => 4005,
            Self::AlreadyFriends => 4101,
            Self::FriendRequestPending => 4102,
            Self::FriendRequestBlocked => 4103,
            Self::FriendRequestNotFound { .. } => 4104,
            Self::InvalidFriendResponse => 4105,
            Self::FarmNotInitialized { .. }
            | Self::CatalogMissing { .. }
            | Self::Overflow { .. }
            | Self::Store(_) => 9999,
        }
    }

    /// Symbolic name of [`GameError::code`].
    pub const fn code_name(&self) -> &'static str {
        match self.code() {
            1000 => "VALIDATION_ERROR",
            1001 => "USER_NOT_FOUND",
            2001 => "PLOT_NOT_FOUND",
            2002 => "PLOT_NOT_EMPTY",
            2003 => "PLOT_IS_EMPTY",
            2004 => "CROP_NOT_MATURED",
            2005 => "LEVEL_REQUIREMENT_NOT_MET",
            2006 => "INSUFFICIENT_SEEDS",
            2007 => "NOTHING_TO_HARVEST",
            2008 => "NOTHING_TO_WATER",
            2009 => "NO_WEEDS_TO_REMOVE",
            2010 => "NO_PESTS_TO_REMOVE",
            3001 => "NOT_FRIENDS",
            3002 => "CANNOT_INTERACT_WITH_SELF",
            3003 => "FRIEND_NOT_FOUND",
            3004 => "ALREADY_STOLEN",
            3005 => "CROP_FULLY_STOLEN",
            3006 => "DAILY_SABOTAGE_LIMIT_EXCEEDED",
            3007 => "CANNOT_HELP_SELF_SABOTAGE",
            3008 => "PLOT_ALREADY_HAS_WEED",
            3009 => "PLOT_ALREADY_HAS_PEST",
            4001 => "CROP_NOT_FOUND",
            4002 => "PROP_NOT_FOUND",
            4003 => "INSUFFICIENT_GOLD",
            4004 => "INSUFFICIENT_STOCK",
            4005 => "ITEM_NOT_PURCHASABLE",
            4101 => "ALREADY_FRIENDS",
            4102 => "FRIEND_REQUEST_PENDING",
            4103 => "FRIEND_REQUEST_BLOCKED",
            4104 => "FRIEND_REQUEST_NOT_FOUND",
            4105 => "INVALID_FRIEND_RESPONSE",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}
