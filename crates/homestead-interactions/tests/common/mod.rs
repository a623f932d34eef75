//! Shared fixture for the engine tests: an in-memory store, a manual clock,
//! and helpers that reach into the store for setup and assertions.

#![allow(dead_code, clippy::expect_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use homestead_core::{Clock, GameConfig, ManualClock};
use homestead_db::{Catalog, FarmStore, MemoryFarmStore, UnitOfWork};
use homestead_interactions::GameServices;
use homestead_types::{
    FriendshipStatus, ItemType, LandPlot, PlantId, PlayerLogEntry, TargetModel, User, UserId,
};

/// Radish: 3600 s, yield 10, 12 exp, level 1.
pub const RADISH: PlantId = PlantId(1);

/// Carrot: 7200 s, yield 12, 25 exp, level 2.
pub const CARROT: PlantId = PlantId(2);

/// Start of every test, 08:00 UTC.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0)
        .single()
        .expect("valid start time")
}

pub struct World {
    pub store: Arc<MemoryFarmStore>,
    pub clock: Arc<ManualClock>,
    pub game: GameServices<MemoryFarmStore>,
}

impl World {
    pub fn new() -> Self {
        Self::with_catalog(&Catalog::starter())
    }

    pub fn with_catalog(catalog: &Catalog) -> Self {
        let store = Arc::new(MemoryFarmStore::with_catalog(catalog));
        let clock = Arc::new(ManualClock::new(t0()));
        let game = GameServices::new(
            Arc::clone(&store),
            Arc::clone(&clock) as Arc<dyn Clock>,
            &GameConfig::default(),
        );
        Self { store, clock, game }
    }

    pub fn advance(&self, seconds: i64) {
        self.clock.advance(Duration::seconds(seconds));
    }

    /// Register a player with the default starter kit.
    pub async fn player(&self, name: &str) -> UserId {
        self.game
            .farms
            .register_player(name)
            .await
            .expect("register player")
            .user
            .id
    }

    pub async fn befriend(&self, a: UserId, b: UserId) {
        self.game.friends.send_request(a, b).await.expect("send request");
        self.game
            .friends
            .respond(b, a, FriendshipStatus::Accepted)
            .await
            .expect("accept request");
    }

    pub async fn plot(&self, owner: UserId, plot_index: i32) -> LandPlot {
        let mut tx = self.store.begin().await.expect("begin");
        let farm = tx.farm_of(owner).await.expect("farm").expect("has farm");
        tx.lock_plot(farm.id, plot_index)
            .await
            .expect("plot")
            .expect("plot exists")
    }

    /// Rewrite a plot directly in the store.
    pub async fn edit_plot(&self, owner: UserId, plot_index: i32, edit: impl FnOnce(&mut LandPlot)) {
        let mut tx = self.store.begin().await.expect("begin");
        let farm = tx.farm_of(owner).await.expect("farm").expect("has farm");
        let mut plot = tx
            .lock_plot(farm.id, plot_index)
            .await
            .expect("plot")
            .expect("plot exists");
        edit(&mut plot);
        tx.update_plots(&[plot]).await.expect("update plot");
        tx.commit().await.expect("commit");
    }

    pub async fn user(&self, id: UserId) -> User {
        let mut tx = self.store.begin().await.expect("begin");
        tx.user(id).await.expect("user").expect("user exists")
    }

    pub async fn set_exp(&self, id: UserId, exp: u64) {
        let mut tx = self.store.begin().await.expect("begin");
        let mut user = tx.lock_user(id).await.expect("user").expect("user exists");
        user.exp = exp;
        tx.update_user(&user).await.expect("update user");
        tx.commit().await.expect("commit");
    }

    pub async fn stock(&self, id: UserId, plant: PlantId, kind: ItemType) -> u32 {
        let mut tx = self.store.begin().await.expect("begin");
        tx.crop_stock(id, plant, kind).await.expect("stock")
    }

    pub async fn give(&self, id: UserId, plant: PlantId, kind: ItemType, quantity: u32) {
        let mut tx = self.store.begin().await.expect("begin");
        tx.credit_crop(id, plant, kind, quantity).await.expect("credit");
        tx.commit().await.expect("commit");
    }

    /// Plant radish on the given plots and let them mature.
    pub async fn grow_radishes(&self, owner: UserId, plots: &[i32]) {
        for &plot_index in plots {
            self.game
                .plots
                .plant(owner, plot_index, RADISH)
                .await
                .expect("plant radish");
        }
        self.advance(3600);
    }

    pub async fn logs(&self) -> Vec<PlayerLogEntry> {
        self.store.player_logs().await
    }

    pub async fn plot_logs(&self) -> usize {
        self.logs()
            .await
            .iter()
            .filter(|entry| entry.target_model == TargetModel::LandPlot)
            .count()
    }
}
