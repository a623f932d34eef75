//! Row structs read from `PostgreSQL` and their conversion into domain types.
//!
//! Enum columns are selected as `::TEXT`. Integer columns are signed in the
//! schema; a negative value where the domain is unsigned is reported as
//! [`DbError::Corrupt`] rather than clamped.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;

use homestead_types::{
    CropEconomics, CropRewards, CropStock, Farm, FarmId, Friendship, GrowthCurve, LandPlot, Plant,
    PlantId, PlotId, Prop, PropId, PropStock, User, UserId, WaterState,
};

use crate::codec::{friendship_status_from_db, item_type_from_db, prop_type_from_db, unsigned};
use crate::error::DbError;
use crate::store::ActionCount;

/// A row from the `plants` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PlantRow {
    id: i64,
    name: String,
    image: Option<String>,
    required_level: i32,
    category: Option<String>,
    growth: Json<GrowthCurve>,
    economics: Json<CropEconomics>,
    rewards: Json<CropRewards>,
}

impl TryFrom<PlantRow> for Plant {
    type Error = DbError;

    fn try_from(row: PlantRow) -> Result<Self, DbError> {
        Ok(Self {
            id: PlantId::new(row.id),
            name: row.name,
            image: row.image,
            required_level: unsigned("plants", "required_level", i64::from(row.required_level))?,
            category: row.category,
            growth: row.growth.0,
            economics: row.economics.0,
            rewards: row.rewards.0,
        })
    }
}

/// A row from the `props` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PropRow {
    id: i64,
    name: String,
    description: String,
    prop_type: String,
    buy_price: Option<Decimal>,
    sell_price: Decimal,
    effect: serde_json::Value,
    image: Option<String>,
}

impl TryFrom<PropRow> for Prop {
    type Error = DbError;

    fn try_from(row: PropRow) -> Result<Self, DbError> {
        Ok(Self {
            id: PropId::new(row.id),
            name: row.name,
            description: row.description,
            prop_type: prop_type_from_db(&row.prop_type)?,
            buy_price: row.buy_price,
            sell_price: row.sell_price,
            effect: row.effect,
            image: row.image,
        })
    }
}

/// A row from the `users` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    nick_name: String,
    exp: i64,
    gold: Decimal,
    premium_currency: i32,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, DbError> {
        Ok(Self {
            id: UserId::new(row.id),
            nick_name: row.nick_name,
            exp: unsigned("users", "exp", row.exp)?,
            gold: row.gold,
            premium_currency: unsigned("users", "premium_currency", i64::from(row.premium_currency))?,
        })
    }
}

/// A row from the `farms` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FarmRow {
    id: i64,
    user_id: i64,
    maturity_cycle_counter: i64,
}

impl From<FarmRow> for Farm {
    fn from(row: FarmRow) -> Self {
        Self {
            id: FarmId::new(row.id),
            user_id: UserId::new(row.user_id),
            maturity_cycle_counter: row.maturity_cycle_counter,
        }
    }
}

/// A row from the `land_plots` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PlotRow {
    id: i64,
    farm_id: i64,
    plot_index: i32,
    plant_id: Option<i64>,
    plant_time: Option<DateTime<Utc>>,
    maturity_cycle_id: Option<i64>,
    water_state: i16,
    fertilized: bool,
    has_weeds: bool,
    weed_placed_by: Option<i64>,
    has_pests: bool,
    pest_placed_by: Option<i64>,
    stolen_num: i32,
    growth_time_reduced_seconds: i32,
}

impl TryFrom<PlotRow> for LandPlot {
    type Error = DbError;

    fn try_from(row: PlotRow) -> Result<Self, DbError> {
        let water_state = WaterState::from_code(row.water_state).ok_or_else(|| {
            DbError::corrupt("land_plots", format!("water_state {}", row.water_state))
        })?;
        Ok(Self {
            id: PlotId::new(row.id),
            farm_id: FarmId::new(row.farm_id),
            plot_index: row.plot_index,
            plant_id: row.plant_id.map(PlantId::new),
            plant_time: row.plant_time,
            maturity_cycle_id: row.maturity_cycle_id,
            water_state,
            fertilized: row.fertilized,
            has_weeds: row.has_weeds,
            weed_placed_by: row.weed_placed_by.map(UserId::new),
            has_pests: row.has_pests,
            pest_placed_by: row.pest_placed_by.map(UserId::new),
            stolen_num: unsigned("land_plots", "stolen_num", i64::from(row.stolen_num))?,
            growth_time_reduced_seconds: unsigned(
                "land_plots",
                "growth_time_reduced_seconds",
                i64::from(row.growth_time_reduced_seconds),
            )?,
        })
    }
}

/// A row from the `crop_inventory` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CropStockRow {
    plant_id: i64,
    item_type: String,
    quantity: i32,
}

impl TryFrom<CropStockRow> for CropStock {
    type Error = DbError;

    fn try_from(row: CropStockRow) -> Result<Self, DbError> {
        Ok(Self {
            plant_id: PlantId::new(row.plant_id),
            item_type: item_type_from_db(&row.item_type)?,
            quantity: unsigned("crop_inventory", "quantity", i64::from(row.quantity))?,
        })
    }
}

/// A row from the `prop_inventory` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PropStockRow {
    prop_id: i64,
    quantity: i32,
}

impl TryFrom<PropStockRow> for PropStock {
    type Error = DbError;

    fn try_from(row: PropStockRow) -> Result<Self, DbError> {
        Ok(Self {
            prop_id: PropId::new(row.prop_id),
            quantity: unsigned("prop_inventory", "quantity", i64::from(row.quantity))?,
        })
    }
}

/// A row from the `friendships` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FriendshipRow {
    requester_id: i64,
    addressee_id: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FriendshipRow> for Friendship {
    type Error = DbError;

    fn try_from(row: FriendshipRow) -> Result<Self, DbError> {
        Ok(Self {
            requester_id: UserId::new(row.requester_id),
            addressee_id: UserId::new(row.addressee_id),
            status: friendship_status_from_db(&row.status)?,
            created_at: row.created_at,
        })
    }
}

/// An aggregate row from `player_logs`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ActionCountRow {
    user_id: i64,
    count: i64,
}

impl TryFrom<ActionCountRow> for ActionCount {
    type Error = DbError;

    fn try_from(row: ActionCountRow) -> Result<Self, DbError> {
        Ok(Self {
            user_id: UserId::new(row.user_id),
            count: unsigned("player_logs", "count", row.count)?,
        })
    }
}

/// Convert every row, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DbError>
where
    T: TryFrom<R, Error = DbError>,
{
    rows.into_iter().map(T::try_from).collect()
}
