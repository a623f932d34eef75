//! One `PostgreSQL` transaction behind the [`UnitOfWork`] port.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};

use homestead_types::{
    CropStock, DailyCounterKey, Farm, FarmId, Friendship, FriendshipStatus, ItemType, LandPlot,
    Plant, PlantId, PlotId, Prop, PropId, PropStock, ShopLogEntry, User, UserId,
};

use crate::codec::{
    action_type_to_db, friendship_status_to_db, item_type_to_db, shop_transaction_to_db, to_i32,
    unsigned,
};
use crate::error::DbError;
use crate::rows::{
    CropStockRow, FarmRow, FriendshipRow, PlantRow, PlotRow, PropRow, PropStockRow, UserRow,
    convert_all,
};
use crate::store::UnitOfWork;

const PLANT_SELECT: &str = r"SELECT id, name, image, required_level, category, growth, economics, rewards FROM plants";

const PROP_SELECT: &str = r"SELECT id, name, description, prop_type::TEXT AS prop_type, buy_price, sell_price, effect, image FROM props";

const USER_SELECT: &str = r"SELECT id, nick_name, exp, gold, premium_currency FROM users";

const PLOT_SELECT: &str = r"SELECT id, farm_id, plot_index, plant_id, plant_time, maturity_cycle_id, water_state, fertilized, has_weeds, weed_placed_by, has_pests, pest_placed_by, stolen_num, growth_time_reduced_seconds FROM land_plots";

const FRIENDSHIP_SELECT: &str = r"SELECT requester_id, addressee_id, status::TEXT AS status, created_at FROM friendships";

/// A [`UnitOfWork`] over one open transaction. Dropping it rolls back.
#[derive(Debug)]
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub(crate) const fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

fn exp_to_db(exp: u64) -> i64 {
    i64::try_from(exp).unwrap_or(i64::MAX)
}

impl UnitOfWork for PgUnitOfWork {
    // --- Catalog ---

    async fn plant(&mut self, id: PlantId) -> Result<Option<Plant>, DbError> {
        let row = sqlx::query_as::<_, PlantRow>(&format!("{PLANT_SELECT} WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Plant::try_from).transpose()
    }

    async fn plants(&mut self) -> Result<Vec<Plant>, DbError> {
        let rows = sqlx::query_as::<_, PlantRow>(&format!("{PLANT_SELECT} ORDER BY required_level, id"))
            .fetch_all(&mut *self.tx)
            .await?;
        convert_all(rows)
    }

    async fn prop(&mut self, id: PropId) -> Result<Option<Prop>, DbError> {
        let row = sqlx::query_as::<_, PropRow>(&format!("{PROP_SELECT} WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(Prop::try_from).transpose()
    }

    async fn props(&mut self) -> Result<Vec<Prop>, DbError> {
        let rows = sqlx::query_as::<_, PropRow>(&format!("{PROP_SELECT} ORDER BY id"))
            .fetch_all(&mut *self.tx)
            .await?;
        convert_all(rows)
    }

    // --- Users ---

    async fn insert_user(&mut self, nick_name: &str, gold: Decimal) -> Result<User, DbError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"INSERT INTO users (nick_name, gold) VALUES ($1, $2)
              RETURNING id, nick_name, exp, gold, premium_currency",
        )
        .bind(nick_name)
        .bind(gold)
        .fetch_one(&mut *self.tx)
        .await?;
        User::try_from(row)
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn lock_user(&mut self, id: UserId) -> Result<Option<User>, DbError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE id = $1 FOR UPDATE"))
            .bind(id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn users(&mut self, ids: &[UserId]) -> Result<Vec<User>, DbError> {
        let raw: Vec<i64> = ids.iter().map(|id| id.into_inner()).collect();
        let rows = sqlx::query_as::<_, UserRow>(&format!("{USER_SELECT} WHERE id = ANY($1) ORDER BY id"))
            .bind(&raw)
            .fetch_all(&mut *self.tx)
            .await?;
        convert_all(rows)
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DbError> {
        let result = sqlx::query(
            r"UPDATE users SET exp = $2, gold = $3, premium_currency = $4 WHERE id = $1",
        )
        .bind(user.id.into_inner())
        .bind(exp_to_db(user.exp))
        .bind(user.gold)
        .bind(to_i32(user.premium_currency))
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::Missing {
                table: "users",
                id: user.id.into_inner(),
            });
        }
        Ok(())
    }

    // --- Farms and plots ---

    async fn insert_farm(&mut self, user: UserId) -> Result<Farm, DbError> {
        let row = sqlx::query_as::<_, FarmRow>(
            r"INSERT INTO farms (user_id) VALUES ($1) RETURNING id, user_id, maturity_cycle_counter",
        )
        .bind(user.into_inner())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(Farm::from(row))
    }

    async fn farm_of(&mut self, user: UserId) -> Result<Option<Farm>, DbError> {
        let row = sqlx::query_as::<_, FarmRow>(
            r"SELECT id, user_id, maturity_cycle_counter FROM farms WHERE user_id = $1",
        )
        .bind(user.into_inner())
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row.map(Farm::from))
    }

    async fn reserve_cycle_ids(&mut self, farm: FarmId, count: u32) -> Result<i64, DbError> {
        // The UPDATE row lock serializes concurrent reservations on one farm.
        let last: Option<i64> = sqlx::query_scalar(
            r"UPDATE farms SET maturity_cycle_counter = maturity_cycle_counter + $2
              WHERE id = $1 RETURNING maturity_cycle_counter",
        )
        .bind(farm.into_inner())
        .bind(i64::from(count))
        .fetch_optional(&mut *self.tx)
        .await?;
        let last = last.ok_or(DbError::Missing {
            table: "farms",
            id: farm.into_inner(),
        })?;
        Ok(last.saturating_sub(i64::from(count)).saturating_add(1))
    }

    async fn insert_plots(&mut self, farm: FarmId, indices: &[i32]) -> Result<Vec<LandPlot>, DbError> {
        let rows = sqlx::query_as::<_, PlotRow>(
            r"INSERT INTO land_plots (farm_id, plot_index)
              SELECT $1, idx FROM UNNEST($2::INTEGER[]) AS idx
              RETURNING id, farm_id, plot_index, plant_id, plant_time, maturity_cycle_id, water_state, fertilized, has_weeds, weed_placed_by, has_pests, pest_placed_by, stolen_num, growth_time_reduced_seconds",
        )
        .bind(farm.into_inner())
        .bind(indices)
        .fetch_all(&mut *self.tx)
        .await?;
        let mut plots: Vec<LandPlot> = convert_all(rows)?;
        plots.sort_by_key(|plot| plot.plot_index);
        Ok(plots)
    }

    async fn plots(&mut self, farm: FarmId) -> Result<Vec<LandPlot>, DbError> {
        let rows = sqlx::query_as::<_, PlotRow>(&format!(
            "{PLOT_SELECT} WHERE farm_id = $1 ORDER BY plot_index"
        ))
        .bind(farm.into_inner())
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn lock_plots(&mut self, farm: FarmId) -> Result<Vec<LandPlot>, DbError> {
        let rows = sqlx::query_as::<_, PlotRow>(&format!(
            "{PLOT_SELECT} WHERE farm_id = $1 ORDER BY plot_index FOR UPDATE"
        ))
        .bind(farm.into_inner())
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn lock_plot(&mut self, farm: FarmId, plot_index: i32) -> Result<Option<LandPlot>, DbError> {
        let row = sqlx::query_as::<_, PlotRow>(&format!(
            "{PLOT_SELECT} WHERE farm_id = $1 AND plot_index = $2 FOR UPDATE"
        ))
        .bind(farm.into_inner())
        .bind(plot_index)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(LandPlot::try_from).transpose()
    }

    async fn update_plots(&mut self, plots: &[LandPlot]) -> Result<(), DbError> {
        if plots.is_empty() {
            return Ok(());
        }

        let len = plots.len();
        let mut ids = Vec::with_capacity(len);
        let mut plant_ids: Vec<Option<i64>> = Vec::with_capacity(len);
        let mut plant_times: Vec<Option<DateTime<Utc>>> = Vec::with_capacity(len);
        let mut cycle_ids: Vec<Option<i64>> = Vec::with_capacity(len);
        let mut water_states: Vec<i16> = Vec::with_capacity(len);
        let mut fertilized = Vec::with_capacity(len);
        let mut has_weeds = Vec::with_capacity(len);
        let mut weed_placers: Vec<Option<i64>> = Vec::with_capacity(len);
        let mut has_pests = Vec::with_capacity(len);
        let mut pest_placers: Vec<Option<i64>> = Vec::with_capacity(len);
        let mut stolen = Vec::with_capacity(len);
        let mut reduced = Vec::with_capacity(len);

        for plot in plots {
            ids.push(plot.id.into_inner());
            plant_ids.push(plot.plant_id.map(PlantId::into_inner));
            plant_times.push(plot.plant_time);
            cycle_ids.push(plot.maturity_cycle_id);
            water_states.push(i16::from(plot.water_state.code()));
            fertilized.push(plot.fertilized);
            has_weeds.push(plot.has_weeds);
            weed_placers.push(plot.weed_placed_by.map(UserId::into_inner));
            has_pests.push(plot.has_pests);
            pest_placers.push(plot.pest_placed_by.map(UserId::into_inner));
            stolen.push(to_i32(plot.stolen_num));
            reduced.push(to_i32(plot.growth_time_reduced_seconds));
        }

        let result = sqlx::query(
            r"UPDATE land_plots AS p SET
                plant_id = u.plant_id,
                plant_time = u.plant_time,
                maturity_cycle_id = u.maturity_cycle_id,
                water_state = u.water_state,
                fertilized = u.fertilized,
                has_weeds = u.has_weeds,
                weed_placed_by = u.weed_placed_by,
                has_pests = u.has_pests,
                pest_placed_by = u.pest_placed_by,
                stolen_num = u.stolen_num,
                growth_time_reduced_seconds = u.growth_time_reduced_seconds
              FROM UNNEST($1::BIGINT[], $2::BIGINT[], $3::TIMESTAMPTZ[], $4::BIGINT[], $5::SMALLINT[], $6::BOOLEAN[], $7::BOOLEAN[], $8::BIGINT[], $9::BOOLEAN[], $10::BIGINT[], $11::INTEGER[], $12::INTEGER[])
                AS u(id, plant_id, plant_time, maturity_cycle_id, water_state, fertilized, has_weeds, weed_placed_by, has_pests, pest_placed_by, stolen_num, growth_time_reduced_seconds)
              WHERE p.id = u.id",
        )
        .bind(&ids)
        .bind(&plant_ids)
        .bind(&plant_times)
        .bind(&cycle_ids)
        .bind(&water_states)
        .bind(&fertilized)
        .bind(&has_weeds)
        .bind(&weed_placers)
        .bind(&has_pests)
        .bind(&pest_placers)
        .bind(&stolen)
        .bind(&reduced)
        .execute(&mut *self.tx)
        .await?;

        if usize::try_from(result.rows_affected()).ok() != Some(len) {
            return Err(DbError::corrupt(
                "land_plots",
                format!("updated {} of {len} plots", result.rows_affected()),
            ));
        }
        Ok(())
    }

    // --- Inventory ---

    async fn crop_stock(&mut self, user: UserId, plant: PlantId, kind: ItemType) -> Result<u32, DbError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            r"SELECT quantity FROM crop_inventory
              WHERE user_id = $1 AND plant_id = $2 AND item_type = $3::item_type",
        )
        .bind(user.into_inner())
        .bind(plant.into_inner())
        .bind(item_type_to_db(kind))
        .fetch_optional(&mut *self.tx)
        .await?;
        unsigned("crop_inventory", "quantity", i64::from(quantity.unwrap_or(0)))
    }

    async fn crop_stocks(&mut self, user: UserId) -> Result<Vec<CropStock>, DbError> {
        let rows = sqlx::query_as::<_, CropStockRow>(
            r"SELECT plant_id, item_type::TEXT AS item_type, quantity FROM crop_inventory
              WHERE user_id = $1 AND quantity > 0
              ORDER BY plant_id, item_type",
        )
        .bind(user.into_inner())
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn credit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO crop_inventory (user_id, plant_id, item_type, quantity)
              VALUES ($1, $2, $3::item_type, $4)
              ON CONFLICT (user_id, plant_id, item_type)
              DO UPDATE SET quantity = crop_inventory.quantity + EXCLUDED.quantity",
        )
        .bind(user.into_inner())
        .bind(plant.into_inner())
        .bind(item_type_to_db(kind))
        .bind(to_i32(quantity))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn debit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"UPDATE crop_inventory SET quantity = quantity - $4
              WHERE user_id = $1 AND plant_id = $2 AND item_type = $3::item_type AND quantity >= $4",
        )
        .bind(user.into_inner())
        .bind(plant.into_inner())
        .bind(item_type_to_db(kind))
        .bind(to_i32(quantity))
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn prop_stocks(&mut self, user: UserId) -> Result<Vec<PropStock>, DbError> {
        let rows = sqlx::query_as::<_, PropStockRow>(
            r"SELECT prop_id, quantity FROM prop_inventory
              WHERE user_id = $1 AND quantity > 0 ORDER BY prop_id",
        )
        .bind(user.into_inner())
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn credit_prop(&mut self, user: UserId, prop: PropId, quantity: u32) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO prop_inventory (user_id, prop_id, quantity) VALUES ($1, $2, $3)
              ON CONFLICT (user_id, prop_id)
              DO UPDATE SET quantity = prop_inventory.quantity + EXCLUDED.quantity",
        )
        .bind(user.into_inner())
        .bind(prop.into_inner())
        .bind(to_i32(quantity))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn debit_prop(&mut self, user: UserId, prop: PropId, quantity: u32) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"UPDATE prop_inventory SET quantity = quantity - $3
              WHERE user_id = $1 AND prop_id = $2 AND quantity >= $3",
        )
        .bind(user.into_inner())
        .bind(prop.into_inner())
        .bind(to_i32(quantity))
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    // --- Friendships ---

    async fn friendship(&mut self, from: UserId, to: UserId) -> Result<Option<Friendship>, DbError> {
        let row = sqlx::query_as::<_, FriendshipRow>(&format!(
            "{FRIENDSHIP_SELECT} WHERE requester_id = $1 AND addressee_id = $2"
        ))
        .bind(from.into_inner())
        .bind(to.into_inner())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.map(Friendship::try_from).transpose()
    }

    async fn upsert_friendship(&mut self, edge: &Friendship) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO friendships (requester_id, addressee_id, status, created_at)
              VALUES ($1, $2, $3::friendship_status, $4)
              ON CONFLICT (requester_id, addressee_id) DO UPDATE SET status = EXCLUDED.status",
        )
        .bind(edge.requester_id.into_inner())
        .bind(edge.addressee_id.into_inner())
        .bind(friendship_status_to_db(edge.status))
        .bind(edge.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_friendship(&mut self, from: UserId, to: UserId) -> Result<bool, DbError> {
        let result = sqlx::query(r"DELETE FROM friendships WHERE requester_id = $1 AND addressee_id = $2")
            .bind(from.into_inner())
            .bind(to.into_inner())
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn friendships_from(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DbError> {
        let rows = sqlx::query_as::<_, FriendshipRow>(&format!(
            "{FRIENDSHIP_SELECT} WHERE requester_id = $1 AND status = $2::friendship_status ORDER BY created_at"
        ))
        .bind(user.into_inner())
        .bind(friendship_status_to_db(status))
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    async fn friendships_to(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DbError> {
        let rows = sqlx::query_as::<_, FriendshipRow>(&format!(
            "{FRIENDSHIP_SELECT} WHERE addressee_id = $1 AND status = $2::friendship_status ORDER BY created_at"
        ))
        .bind(user.into_inner())
        .bind(friendship_status_to_db(status))
        .fetch_all(&mut *self.tx)
        .await?;
        convert_all(rows)
    }

    // --- Steal log, quota, shop log ---

    async fn has_stolen(&mut self, plot: PlotId, stealer: UserId, cycle_id: i64) -> Result<bool, DbError> {
        let exists: bool = sqlx::query_scalar(
            r"SELECT EXISTS (
                SELECT 1 FROM steal_logs
                WHERE land_plot_id = $1 AND stealer_id = $2 AND maturity_cycle_id = $3
              )",
        )
        .bind(plot.into_inner())
        .bind(stealer.into_inner())
        .bind(cycle_id)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(exists)
    }

    async fn record_steal(
        &mut self,
        plot: PlotId,
        stealer: UserId,
        cycle_id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"INSERT INTO steal_logs (land_plot_id, stealer_id, maturity_cycle_id, stolen_at)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT DO NOTHING",
        )
        .bind(plot.into_inner())
        .bind(stealer.into_inner())
        .bind(cycle_id)
        .bind(at)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn increment_daily_counter(&mut self, key: DailyCounterKey, by: u32) -> Result<u32, DbError> {
        let count: i32 = sqlx::query_scalar(
            r"INSERT INTO daily_interactions (user_id, action_type, day, count)
              VALUES ($1, $2::action_type, $3, $4)
              ON CONFLICT (user_id, action_type, day)
              DO UPDATE SET count = daily_interactions.count + EXCLUDED.count
              RETURNING count",
        )
        .bind(key.user_id.into_inner())
        .bind(action_type_to_db(key.action))
        .bind(key.day)
        .bind(to_i32(by))
        .fetch_one(&mut *self.tx)
        .await?;
        unsigned("daily_interactions", "count", i64::from(count))
    }

    async fn insert_shop_log(&mut self, entry: &ShopLogEntry) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO shop_logs (id, user_id, item_type, item_id, quantity, price_per_unit, total_price, transaction, created_at)
              VALUES ($1, $2, $3::item_type, $4, $5, $6, $7, $8::shop_transaction, $9)",
        )
        .bind(entry.id)
        .bind(entry.user_id.into_inner())
        .bind(item_type_to_db(entry.item_type))
        .bind(entry.item_id)
        .bind(to_i32(entry.quantity))
        .bind(entry.price_per_unit)
        .bind(entry.total_price)
        .bind(shop_transaction_to_db(entry.transaction))
        .bind(entry.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }
}
