//! Store ports: the repository interface the game engines call through.
//!
//! A [`FarmStore`] hands out [`UnitOfWork`] handles. Every read and write
//! that must be atomic goes through one handle, which is passed by `&mut`
//! through the engine functions that participate in the same scope.
//!
//! # Transaction semantics
//!
//! - `lock_*` methods take row locks (`SELECT ... FOR UPDATE`) so a
//!   precondition checked on the returned row still holds at commit.
//! - Nothing is visible to other units of work until [`UnitOfWork::commit`].
//! - Dropping a unit of work without committing rolls everything back.
//!
//! The player audit trail is written through [`FarmStore::append_player_logs`]
//! on its own connection, outside any unit of work.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use homestead_types::{
    ActionType, CropStock, DailyCounterKey, Farm, FarmId, Friendship, FriendshipStatus, ItemType,
    LandPlot, Plant, PlantId, PlayerLogEntry, PlotId, Prop, PropId, PropStock, ShopLogEntry, User,
    UserId,
};

use crate::error::DbError;

/// User column a ranking query orders by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRanking {
    /// Gold, richest first.
    Gold,
    /// Cumulative experience, highest first.
    Exp,
}

/// Number of audit rows a player has for a set of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionCount {
    /// Player.
    pub user_id: UserId,
    /// Matching per-plot audit rows.
    pub count: u64,
}

/// Entry point to a transactional store.
pub trait FarmStore: Send + Sync + 'static {
    /// Unit of work type handed out by [`FarmStore::begin`].
    type Tx: UnitOfWork;

    /// Open a new unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, DbError>> + Send;

    /// Append audit rows. Runs outside any unit of work.
    fn append_player_logs(
        &self,
        entries: &[PlayerLogEntry],
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Page of users ordered by `ranking` descending, ties by id.
    fn ranked_users(
        &self,
        ranking: UserRanking,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<User>, DbError>> + Send;

    /// Page of per-user counts of plot-level audit rows whose action is in
    /// `actions`, highest first, ties by user id.
    fn action_counts(
        &self,
        actions: &[ActionType],
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<ActionCount>, DbError>> + Send;
}

/// One atomic scope of reads and writes.
pub trait UnitOfWork: Send {
    // --- Catalog ---

    /// Crop definition by id.
    fn plant(&mut self, id: PlantId) -> impl Future<Output = Result<Option<Plant>, DbError>> + Send;

    /// All crops, ordered by required level then id.
    fn plants(&mut self) -> impl Future<Output = Result<Vec<Plant>, DbError>> + Send;

    /// Prop definition by id.
    fn prop(&mut self, id: PropId) -> impl Future<Output = Result<Option<Prop>, DbError>> + Send;

    /// All props, ordered by id.
    fn props(&mut self) -> impl Future<Output = Result<Vec<Prop>, DbError>> + Send;

    // --- Users ---

    /// Create a user with zero experience.
    fn insert_user(
        &mut self,
        nick_name: &str,
        gold: Decimal,
    ) -> impl Future<Output = Result<User, DbError>> + Send;

    /// Read a user without locking.
    fn user(&mut self, id: UserId) -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    /// Read and lock a user row.
    fn lock_user(&mut self, id: UserId)
    -> impl Future<Output = Result<Option<User>, DbError>> + Send;

    /// Read several users without locking, in id order.
    fn users(&mut self, ids: &[UserId]) -> impl Future<Output = Result<Vec<User>, DbError>> + Send;

    /// Persist experience, gold, and premium currency.
    fn update_user(&mut self, user: &User) -> impl Future<Output = Result<(), DbError>> + Send;

    // --- Farms and plots ---

    /// Create the farm of `user` with a zero cycle counter.
    fn insert_farm(&mut self, user: UserId) -> impl Future<Output = Result<Farm, DbError>> + Send;

    /// Farm owned by `user`.
    fn farm_of(&mut self, user: UserId) -> impl Future<Output = Result<Option<Farm>, DbError>> + Send;

    /// Advance the farm's cycle counter by `count` and return the first id
    /// of the reserved contiguous block `first..first + count`.
    fn reserve_cycle_ids(
        &mut self,
        farm: FarmId,
        count: u32,
    ) -> impl Future<Output = Result<i64, DbError>> + Send;

    /// Create empty plots at the given indices.
    fn insert_plots(
        &mut self,
        farm: FarmId,
        indices: &[i32],
    ) -> impl Future<Output = Result<Vec<LandPlot>, DbError>> + Send;

    /// All plots of a farm ordered by index, without locking.
    fn plots(&mut self, farm: FarmId) -> impl Future<Output = Result<Vec<LandPlot>, DbError>> + Send;

    /// All plots of a farm ordered by index, locked.
    fn lock_plots(
        &mut self,
        farm: FarmId,
    ) -> impl Future<Output = Result<Vec<LandPlot>, DbError>> + Send;

    /// One plot by farm and index, locked.
    fn lock_plot(
        &mut self,
        farm: FarmId,
        plot_index: i32,
    ) -> impl Future<Output = Result<Option<LandPlot>, DbError>> + Send;

    /// Persist every mutable column of the given plots.
    fn update_plots(&mut self, plots: &[LandPlot]) -> impl Future<Output = Result<(), DbError>> + Send;

    // --- Inventory ---

    /// Units of a crop item held.
    fn crop_stock(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
    ) -> impl Future<Output = Result<u32, DbError>> + Send;

    /// Every crop stock line of a user with a positive quantity.
    fn crop_stocks(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<CropStock>, DbError>> + Send;

    /// Add units of a crop item, creating the line if needed.
    fn credit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Remove units of a crop item. Returns `false` and changes nothing when
    /// fewer than `quantity` are held.
    fn debit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Every prop stock line of a user with a positive quantity.
    fn prop_stocks(
        &mut self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<PropStock>, DbError>> + Send;

    /// Add units of a prop, creating the line if needed.
    fn credit_prop(
        &mut self,
        user: UserId,
        prop: PropId,
        quantity: u32,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Remove units of a prop. Returns `false` and changes nothing when
    /// fewer than `quantity` are held.
    fn debit_prop(
        &mut self,
        user: UserId,
        prop: PropId,
        quantity: u32,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    // --- Friendships ---

    /// The directed edge `from -> to`.
    fn friendship(
        &mut self,
        from: UserId,
        to: UserId,
    ) -> impl Future<Output = Result<Option<Friendship>, DbError>> + Send;

    /// Create the edge, or overwrite its status if it exists.
    fn upsert_friendship(
        &mut self,
        edge: &Friendship,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Delete the directed edge. Returns whether it existed.
    fn delete_friendship(
        &mut self,
        from: UserId,
        to: UserId,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Edges leaving `user` with the given status, oldest first.
    fn friendships_from(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> impl Future<Output = Result<Vec<Friendship>, DbError>> + Send;

    /// Edges arriving at `user` with the given status, oldest first.
    fn friendships_to(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> impl Future<Output = Result<Vec<Friendship>, DbError>> + Send;

    // --- Steal log, quota, shop log ---

    /// Whether `stealer` already stole from this planting cycle.
    fn has_stolen(
        &mut self,
        plot: PlotId,
        stealer: UserId,
        cycle_id: i64,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Record a steal. Returns `false` when the (plot, stealer, cycle) row
    /// already exists; the unique key is the authoritative guard.
    fn record_steal(
        &mut self,
        plot: PlotId,
        stealer: UserId,
        cycle_id: i64,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Add `by` to the daily counter (starting from zero for a new day) and
    /// return the new count.
    fn increment_daily_counter(
        &mut self,
        key: DailyCounterKey,
        by: u32,
    ) -> impl Future<Output = Result<u32, DbError>> + Send;

    /// Append a shop transaction.
    fn insert_shop_log(
        &mut self,
        entry: &ShopLogEntry,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Make every write of this unit of work durable and visible.
    fn commit(self) -> impl Future<Output = Result<(), DbError>> + Send;
}
