//! Mappings between domain enums and their `PostgreSQL` enum labels.
//!
//! Writes bind the label as text and cast it (`$1::action_type`); reads
//! select the column as `::TEXT` and decode it here.

use homestead_types::{
    ActionType, FriendshipStatus, ItemType, PropType, ShopTransactionKind, TargetModel,
};

use crate::error::DbError;

/// Convert a [`PropType`] to its `PostgreSQL` enum string.
pub(crate) const fn prop_type_to_db(kind: PropType) -> &'static str {
    match kind {
        PropType::Fertilizer => "fertilizer",
        PropType::Decoration => "decoration",
        PropType::Consumable => "consumable",
        PropType::Special => "special",
    }
}

pub(crate) fn prop_type_from_db(raw: &str) -> Result<PropType, DbError> {
    match raw {
        "fertilizer" => Ok(PropType::Fertilizer),
        "decoration" => Ok(PropType::Decoration),
        "consumable" => Ok(PropType::Consumable),
        "special" => Ok(PropType::Special),
        other => Err(DbError::corrupt("props", format!("unknown prop_type {other:?}"))),
    }
}

/// Convert an [`ItemType`] to its `PostgreSQL` enum string.
pub(crate) const fn item_type_to_db(kind: ItemType) -> &'static str {
    match kind {
        ItemType::Seed => "seed",
        ItemType::Fruit => "fruit",
        ItemType::Prop => "prop",
    }
}

pub(crate) fn item_type_from_db(raw: &str) -> Result<ItemType, DbError> {
    match raw {
        "seed" => Ok(ItemType::Seed),
        "fruit" => Ok(ItemType::Fruit),
        "prop" => Ok(ItemType::Prop),
        other => Err(DbError::corrupt("crop_inventory", format!("unknown item_type {other:?}"))),
    }
}

/// Convert a [`FriendshipStatus`] to its `PostgreSQL` enum string.
pub(crate) const fn friendship_status_to_db(status: FriendshipStatus) -> &'static str {
    match status {
        FriendshipStatus::Pending => "pending",
        FriendshipStatus::Accepted => "accepted",
        FriendshipStatus::Blocked => "blocked",
    }
}

pub(crate) fn friendship_status_from_db(raw: &str) -> Result<FriendshipStatus, DbError> {
    match raw {
        "pending" => Ok(FriendshipStatus::Pending),
        "accepted" => Ok(FriendshipStatus::Accepted),
        "blocked" => Ok(FriendshipStatus::Blocked),
        other => Err(DbError::corrupt("friendships", format!("unknown status {other:?}"))),
    }
}

/// Convert an [`ActionType`] to its `PostgreSQL` enum string.
pub(crate) const fn action_type_to_db(action: ActionType) -> &'static str {
    match action {
        ActionType::Plant => "plant",
        ActionType::Water => "water",
        ActionType::Fertilize => "fertilize",
        ActionType::Weed => "weed",
        ActionType::Pest => "pest",
        ActionType::Harvest => "harvest",
        ActionType::Steal => "steal",
        ActionType::SabotageWeed => "sabotage_weed",
        ActionType::SabotagePest => "sabotage_pest",
        ActionType::HelpWeed => "help_weed",
        ActionType::HelpPest => "help_pest",
    }
}

/// Convert a [`TargetModel`] to its `PostgreSQL` enum string.
pub(crate) const fn target_model_to_db(model: TargetModel) -> &'static str {
    match model {
        TargetModel::LandPlot => "landplot",
        TargetModel::Farm => "farm",
    }
}

/// Convert a [`ShopTransactionKind`] to its `PostgreSQL` enum string.
pub(crate) const fn shop_transaction_to_db(kind: ShopTransactionKind) -> &'static str {
    match kind {
        ShopTransactionKind::Buy => "buy",
        ShopTransactionKind::Sell => "sell",
    }
}

/// Narrow a stored integer into an unsigned domain field.
pub(crate) fn unsigned<T: TryFrom<i64>>(
    table: &'static str,
    column: &str,
    raw: i64,
) -> Result<T, DbError> {
    T::try_from(raw)
        .ok()
        .ok_or_else(|| DbError::corrupt(table, format!("{column} out of range: {raw}")))
}

/// Widen an unsigned domain field for binding, saturating at `i32::MAX`.
pub(crate) fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
