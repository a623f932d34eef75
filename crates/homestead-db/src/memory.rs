//! Process-local implementation of the store ports.
//!
//! [`MemoryFarmStore`] keeps the whole game state behind one async mutex.
//! A [`MemoryUnitOfWork`] owns that mutex for its lifetime and works on a
//! private copy of the state, so units of work are fully serialized:
//!
//! - `commit` swaps the working copy in.
//! - Dropping without committing discards it.
//!
//! The audit trail lives behind its own lock so it can be appended to while
//! no unit of work is open, mirroring the separate connection the
//! `PostgreSQL` store uses.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use homestead_types::{
    ActionType, CropStock, DailyCounterKey, Farm, FarmId, Friendship, FriendshipStatus, ItemType,
    LandPlot, Plant, PlantId, PlayerLogEntry, PlotId, Prop, PropId, PropStock, ShopLogEntry,
    TargetModel, User, UserId,
};

use crate::catalog::Catalog;
use crate::error::DbError;
use crate::store::{ActionCount, FarmStore, UnitOfWork, UserRanking};

/// Every table of the game, held in ordered maps.
#[derive(Debug, Clone, Default)]
struct MemoryState {
    /// Last id handed out. Shared by all tables.
    last_id: i64,
    plants: BTreeMap<PlantId, Plant>,
    props: BTreeMap<PropId, Prop>,
    users: BTreeMap<UserId, User>,
    farms: BTreeMap<FarmId, Farm>,
    plots: BTreeMap<PlotId, LandPlot>,
    crop_stock: BTreeMap<(UserId, PlantId, ItemType), u32>,
    prop_stock: BTreeMap<(UserId, PropId), u32>,
    friendships: BTreeMap<(UserId, UserId), Friendship>,
    steals: BTreeSet<(PlotId, UserId, i64)>,
    daily_counters: BTreeMap<DailyCounterKey, u32>,
    shop_logs: Vec<ShopLogEntry>,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.last_id = self.last_id.saturating_add(1);
        self.last_id
    }
}

/// In-memory [`FarmStore`], cheap to clone.
#[derive(Debug, Clone)]
pub struct MemoryFarmStore {
    state: Arc<Mutex<MemoryState>>,
    player_logs: Arc<Mutex<Vec<PlayerLogEntry>>>,
    reject_log_writes: Arc<AtomicBool>,
}

impl Default for MemoryFarmStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFarmStore {
    /// A store holding the starter catalog and no players.
    pub fn new() -> Self {
        Self::with_catalog(&Catalog::starter())
    }

    /// A store holding `catalog` and no players.
    pub fn with_catalog(catalog: &Catalog) -> Self {
        let state = MemoryState {
            // Keep generated ids clear of catalog ids.
            last_id: 1000,
            plants: catalog.plants.iter().map(|p| (p.id, p.clone())).collect(),
            props: catalog.props.iter().map(|p| (p.id, p.clone())).collect(),
            ..MemoryState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            player_logs: Arc::new(Mutex::new(Vec::new())),
            reject_log_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Snapshot of the audit trail.
    pub async fn player_logs(&self) -> Vec<PlayerLogEntry> {
        self.player_logs.lock().await.clone()
    }

    /// Snapshot of committed shop transactions.
    pub async fn shop_logs(&self) -> Vec<ShopLogEntry> {
        self.state.lock().await.shop_logs.clone()
    }

    /// Make subsequent audit writes fail (or succeed again).
    pub fn set_player_log_failures(&self, fail: bool) {
        self.reject_log_writes.store(fail, Ordering::SeqCst);
    }
}

impl FarmStore for MemoryFarmStore {
    type Tx = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, DbError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let work = guard.clone();
        Ok(MemoryUnitOfWork { guard, work })
    }

    async fn append_player_logs(&self, entries: &[PlayerLogEntry]) -> Result<(), DbError> {
        if self.reject_log_writes.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("player log writes are disabled".to_owned()));
        }
        self.player_logs.lock().await.extend_from_slice(entries);
        Ok(())
    }

    async fn ranked_users(
        &self,
        ranking: UserRanking,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<User>, DbError> {
        let mut users: Vec<User> = self.state.lock().await.users.values().cloned().collect();
        match ranking {
            UserRanking::Gold => users.sort_by(|a, b| b.gold.cmp(&a.gold).then(a.id.cmp(&b.id))),
            UserRanking::Exp => users.sort_by(|a, b| b.exp.cmp(&a.exp).then(a.id.cmp(&b.id))),
        }
        Ok(page(users, limit, offset))
    }

    async fn action_counts(
        &self,
        actions: &[ActionType],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ActionCount>, DbError> {
        let mut counts: BTreeMap<UserId, u64> = BTreeMap::new();
        for entry in self.player_logs.lock().await.iter() {
            if entry.target_model == TargetModel::LandPlot && actions.contains(&entry.action_type) {
                let count = counts.entry(entry.user_id).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
        let mut ranked: Vec<ActionCount> = counts
            .into_iter()
            .map(|(user_id, count)| ActionCount { user_id, count })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.user_id.cmp(&b.user_id)));
        Ok(page(ranked, limit, offset))
    }
}

fn page<T>(items: Vec<T>, limit: u32, offset: u32) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}

/// Serialized unit of work over [`MemoryFarmStore`].
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

impl MemoryUnitOfWork {
    fn plot_at(&self, farm: FarmId, plot_index: i32) -> Option<&LandPlot> {
        self.work
            .plots
            .values()
            .find(|plot| plot.farm_id == farm && plot.plot_index == plot_index)
    }

    fn farm_plots(&self, farm: FarmId) -> Vec<LandPlot> {
        let mut plots: Vec<LandPlot> = self
            .work
            .plots
            .values()
            .filter(|plot| plot.farm_id == farm)
            .cloned()
            .collect();
        plots.sort_by_key(|plot| plot.plot_index);
        plots
    }

    fn edges(&self, status: FriendshipStatus, keep: impl Fn(&Friendship) -> bool) -> Vec<Friendship> {
        let mut edges: Vec<Friendship> = self
            .work
            .friendships
            .values()
            .filter(|edge| edge.status == status && keep(edge))
            .cloned()
            .collect();
        edges.sort_by_key(|edge| edge.created_at);
        edges
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    async fn plant(&mut self, id: PlantId) -> Result<Option<Plant>, DbError> {
        Ok(self.work.plants.get(&id).cloned())
    }

    async fn plants(&mut self) -> Result<Vec<Plant>, DbError> {
        let mut plants: Vec<Plant> = self.work.plants.values().cloned().collect();
        plants.sort_by_key(|plant| (plant.required_level, plant.id));
        Ok(plants)
    }

    async fn prop(&mut self, id: PropId) -> Result<Option<Prop>, DbError> {
        Ok(self.work.props.get(&id).cloned())
    }

    async fn props(&mut self) -> Result<Vec<Prop>, DbError> {
        Ok(self.work.props.values().cloned().collect())
    }

    async fn insert_user(&mut self, nick_name: &str, gold: Decimal) -> Result<User, DbError> {
        let user = User {
            id: UserId::new(self.work.next_id()),
            nick_name: nick_name.to_owned(),
            exp: 0,
            gold,
            premium_currency: 0,
        };
        self.work.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user(&mut self, id: UserId) -> Result<Option<User>, DbError> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn lock_user(&mut self, id: UserId) -> Result<Option<User>, DbError> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn users(&mut self, ids: &[UserId]) -> Result<Vec<User>, DbError> {
        Ok(self
            .work
            .users
            .values()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn update_user(&mut self, user: &User) -> Result<(), DbError> {
        let slot = self.work.users.get_mut(&user.id).ok_or(DbError::Missing {
            table: "users",
            id: user.id.into_inner(),
        })?;
        *slot = user.clone();
        Ok(())
    }

    async fn insert_farm(&mut self, user: UserId) -> Result<Farm, DbError> {
        let farm = Farm {
            id: FarmId::new(self.work.next_id()),
            user_id: user,
            maturity_cycle_counter: 0,
        };
        self.work.farms.insert(farm.id, farm.clone());
        Ok(farm)
    }

    async fn farm_of(&mut self, user: UserId) -> Result<Option<Farm>, DbError> {
        Ok(self.work.farms.values().find(|farm| farm.user_id == user).cloned())
    }

    async fn reserve_cycle_ids(&mut self, farm: FarmId, count: u32) -> Result<i64, DbError> {
        let record = self.work.farms.get_mut(&farm).ok_or(DbError::Missing {
            table: "farms",
            id: farm.into_inner(),
        })?;
        let first = record.maturity_cycle_counter.saturating_add(1);
        record.maturity_cycle_counter = record
            .maturity_cycle_counter
            .saturating_add(i64::from(count));
        Ok(first)
    }

    async fn insert_plots(&mut self, farm: FarmId, indices: &[i32]) -> Result<Vec<LandPlot>, DbError> {
        let mut created = Vec::with_capacity(indices.len());
        for &index in indices {
            if self.plot_at(farm, index).is_some() {
                return Err(DbError::corrupt(
                    "land_plots",
                    format!("farm {farm} already has plot {index}"),
                ));
            }
            let plot = LandPlot::empty(PlotId::new(self.work.next_id()), farm, index);
            self.work.plots.insert(plot.id, plot.clone());
            created.push(plot);
        }
        Ok(created)
    }

    async fn plots(&mut self, farm: FarmId) -> Result<Vec<LandPlot>, DbError> {
        Ok(self.farm_plots(farm))
    }

    async fn lock_plots(&mut self, farm: FarmId) -> Result<Vec<LandPlot>, DbError> {
        Ok(self.farm_plots(farm))
    }

    async fn lock_plot(&mut self, farm: FarmId, plot_index: i32) -> Result<Option<LandPlot>, DbError> {
        Ok(self.plot_at(farm, plot_index).cloned())
    }

    async fn update_plots(&mut self, plots: &[LandPlot]) -> Result<(), DbError> {
        for plot in plots {
            let slot = self.work.plots.get_mut(&plot.id).ok_or(DbError::Missing {
                table: "land_plots",
                id: plot.id.into_inner(),
            })?;
            *slot = plot.clone();
        }
        Ok(())
    }

    async fn crop_stock(&mut self, user: UserId, plant: PlantId, kind: ItemType) -> Result<u32, DbError> {
        Ok(self.work.crop_stock.get(&(user, plant, kind)).copied().unwrap_or(0))
    }

    async fn crop_stocks(&mut self, user: UserId) -> Result<Vec<CropStock>, DbError> {
        Ok(self
            .work
            .crop_stock
            .iter()
            .filter(|&(&(owner, _, _), &quantity)| owner == user && quantity > 0)
            .map(|(&(_, plant_id, item_type), &quantity)| CropStock {
                plant_id,
                item_type,
                quantity,
            })
            .collect())
    }

    async fn credit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> Result<(), DbError> {
        let held = self.work.crop_stock.entry((user, plant, kind)).or_insert(0);
        *held = held.saturating_add(quantity);
        Ok(())
    }

    async fn debit_crop(
        &mut self,
        user: UserId,
        plant: PlantId,
        kind: ItemType,
        quantity: u32,
    ) -> Result<bool, DbError> {
        match self.work.crop_stock.get_mut(&(user, plant, kind)) {
            Some(held) if *held >= quantity => {
                *held = held.saturating_sub(quantity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn prop_stocks(&mut self, user: UserId) -> Result<Vec<PropStock>, DbError> {
        Ok(self
            .work
            .prop_stock
            .iter()
            .filter(|&(&(owner, _), &quantity)| owner == user && quantity > 0)
            .map(|(&(_, prop_id), &quantity)| PropStock { prop_id, quantity })
            .collect())
    }

    async fn credit_prop(&mut self, user: UserId, prop: PropId, quantity: u32) -> Result<(), DbError> {
        let held = self.work.prop_stock.entry((user, prop)).or_insert(0);
        *held = held.saturating_add(quantity);
        Ok(())
    }

    async fn debit_prop(&mut self, user: UserId, prop: PropId, quantity: u32) -> Result<bool, DbError> {
        match self.work.prop_stock.get_mut(&(user, prop)) {
            Some(held) if *held >= quantity => {
                *held = held.saturating_sub(quantity);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn friendship(&mut self, from: UserId, to: UserId) -> Result<Option<Friendship>, DbError> {
        Ok(self.work.friendships.get(&(from, to)).cloned())
    }

    async fn upsert_friendship(&mut self, edge: &Friendship) -> Result<(), DbError> {
        self.work
            .friendships
            .entry((edge.requester_id, edge.addressee_id))
            .and_modify(|existing| existing.status = edge.status)
            .or_insert_with(|| edge.clone());
        Ok(())
    }

    async fn delete_friendship(&mut self, from: UserId, to: UserId) -> Result<bool, DbError> {
        Ok(self.work.friendships.remove(&(from, to)).is_some())
    }

    async fn friendships_from(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DbError> {
        Ok(self.edges(status, |edge| edge.requester_id == user))
    }

    async fn friendships_to(
        &mut self,
        user: UserId,
        status: FriendshipStatus,
    ) -> Result<Vec<Friendship>, DbError> {
        Ok(self.edges(status, |edge| edge.addressee_id == user))
    }

    async fn has_stolen(&mut self, plot: PlotId, stealer: UserId, cycle_id: i64) -> Result<bool, DbError> {
        Ok(self.work.steals.contains(&(plot, stealer, cycle_id)))
    }

    async fn record_steal(
        &mut self,
        plot: PlotId,
        stealer: UserId,
        cycle_id: i64,
        _at: DateTime<Utc>,
    ) -> Result<bool, DbError> {
        Ok(self.work.steals.insert((plot, stealer, cycle_id)))
    }

    async fn increment_daily_counter(&mut self, key: DailyCounterKey, by: u32) -> Result<u32, DbError> {
        let count = self.work.daily_counters.entry(key).or_insert(0);
        *count = count.saturating_add(by);
        Ok(*count)
    }

    async fn insert_shop_log(&mut self, entry: &ShopLogEntry) -> Result<(), DbError> {
        self.work.shop_logs.push(entry.clone());
        Ok(())
    }

    async fn commit(self) -> Result<(), DbError> {
        let Self { mut guard, work } = self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    async fn seeded() -> (MemoryFarmStore, UserId, FarmId) {
        let store = MemoryFarmStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user("ada", Decimal::from(100)).await.unwrap().id;
        let farm = tx.insert_farm(user).await.unwrap().id;
        tx.insert_plots(farm, &[1, 2, 3]).await.unwrap();
        tx.commit().await.unwrap();
        (store, user, farm)
    }

    fn log(user: UserId, action: ActionType, target_model: TargetModel) -> PlayerLogEntry {
        PlayerLogEntry {
            id: Uuid::now_v7(),
            user_id: user,
            action_type: action,
            target_model,
            target_id: None,
            old_data: None,
            new_data: None,
            param: String::new(),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let (store, user, farm) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.plots(farm).await.unwrap().len(), 3);
        assert_eq!(tx.farm_of(user).await.unwrap().map(|f| f.id), Some(farm));
    }

    #[tokio::test]
    async fn dropped_unit_of_work_rolls_back() {
        let (store, user, _farm) = seeded().await;
        {
            let mut tx = store.begin().await.unwrap();
            tx.credit_crop(user, PlantId::new(1), ItemType::Seed, 5).await.unwrap();
        }
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.crop_stock(user, PlantId::new(1), ItemType::Seed).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cycle_ids_are_reserved_in_contiguous_blocks() {
        let (store, _user, farm) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.reserve_cycle_ids(farm, 1).await.unwrap(), 1);
        assert_eq!(tx.reserve_cycle_ids(farm, 3).await.unwrap(), 2);
        assert_eq!(tx.reserve_cycle_ids(farm, 1).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn debit_fails_without_enough_stock() {
        let (store, user, _farm) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        tx.credit_prop(user, PropId::new(1), 2).await.unwrap();
        assert!(!tx.debit_prop(user, PropId::new(1), 3).await.unwrap());
        assert!(tx.debit_prop(user, PropId::new(1), 2).await.unwrap());
        assert!(tx.prop_stocks(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn steal_log_rejects_duplicates() {
        let (store, user, _farm) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let at = DateTime::<Utc>::UNIX_EPOCH;
        let plot = PlotId::new(7);
        assert!(tx.record_steal(plot, user, 1, at).await.unwrap());
        assert!(!tx.record_steal(plot, user, 1, at).await.unwrap());
        assert!(tx.record_steal(plot, user, 2, at).await.unwrap());
        assert!(tx.has_stolen(plot, user, 2).await.unwrap());
    }

    #[tokio::test]
    async fn daily_counter_is_keyed_by_day() {
        let (store, user, _farm) = seeded().await;
        let mut tx = store.begin().await.unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let key = DailyCounterKey {
            user_id: user,
            action: ActionType::SabotageWeed,
            day,
        };
        assert_eq!(tx.increment_daily_counter(key, 1).await.unwrap(), 1);
        assert_eq!(tx.increment_daily_counter(key, 3).await.unwrap(), 4);
        let next_day = DailyCounterKey {
            day: day.succ_opt().unwrap(),
            ..key
        };
        assert_eq!(tx.increment_daily_counter(next_day, 1).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn action_counts_ignore_farm_summaries() {
        let store = MemoryFarmStore::new();
        let (a, b) = (UserId::new(1), UserId::new(2));
        let entries = vec![
            log(a, ActionType::Steal, TargetModel::LandPlot),
            log(b, ActionType::Steal, TargetModel::LandPlot),
            log(b, ActionType::Steal, TargetModel::LandPlot),
            log(b, ActionType::Steal, TargetModel::Farm),
            log(a, ActionType::Harvest, TargetModel::LandPlot),
        ];
        store.append_player_logs(&entries).await.unwrap();
        let counts = store.action_counts(&[ActionType::Steal], 10, 0).await.unwrap();
        assert_eq!(
            counts,
            vec![
                ActionCount { user_id: b, count: 2 },
                ActionCount { user_id: a, count: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn log_failures_can_be_injected() {
        let store = MemoryFarmStore::new();
        store.set_player_log_failures(true);
        let entry = log(UserId::new(1), ActionType::Water, TargetModel::LandPlot);
        assert!(store.append_player_logs(&[entry]).await.is_err());
        assert!(store.player_logs().await.is_empty());
    }

    #[tokio::test]
    async fn users_rank_by_gold_then_id() {
        let store = MemoryFarmStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user("poor", Decimal::from(5)).await.unwrap();
        tx.insert_user("rich", Decimal::from(500)).await.unwrap();
        tx.insert_user("also-poor", Decimal::from(5)).await.unwrap();
        tx.commit().await.unwrap();
        let ranked = store.ranked_users(UserRanking::Gold, 10, 0).await.unwrap();
        let names: Vec<&str> = ranked.iter().map(|u| u.nick_name.as_str()).collect();
        assert_eq!(names, vec!["rich", "poor", "also-poor"]);
        let second_page = store.ranked_users(UserRanking::Gold, 1, 1).await.unwrap();
        assert_eq!(second_page.len(), 1);
    }
}
