//! Onboarding and the read paths for farms and player state.

use std::sync::Arc;

use rust_decimal::Decimal;

use homestead_core::Clock;
use homestead_core::config::OnboardingConfig;
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{
    FarmView, ItemType, PlantId, PlayerStateView, RegistrationView, UserId,
};

use crate::error::GameError;
use crate::lookup;
use crate::view;

/// Longest accepted nickname, in characters.
pub const MAX_NICK_NAME_CHARS: usize = 32;

/// Player registration and farm views.
#[derive(Debug)]
pub struct FarmService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    onboarding: OnboardingConfig,
}

impl<S> Clone for FarmService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            onboarding: self.onboarding.clone(),
        }
    }
}

impl<S: FarmStore> FarmService<S> {
    /// Create a service that onboards players per `onboarding`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>, onboarding: OnboardingConfig) -> Self {
        Self {
            store,
            clock,
            onboarding,
        }
    }

    /// Create a player with a farm, starter plots, gold, and seeds, all in
    /// one unit of work.
    pub async fn register_player(&self, nick_name: &str) -> Result<RegistrationView, GameError> {
        let nick_name = nick_name.trim();
        if nick_name.is_empty() || nick_name.chars().count() > MAX_NICK_NAME_CHARS {
            return Err(GameError::InvalidInput {
                reason: format!("nickname must be 1 to {MAX_NICK_NAME_CHARS} characters"),
            });
        }
        let now = self.clock.now();
        let cfg = &self.onboarding;
        let mut tx = self.store.begin().await?;

        let user = tx.insert_user(nick_name, Decimal::from(cfg.starting_gold)).await?;
        let farm = tx.insert_farm(user.id).await?;
        let indices: Vec<i32> = (1..=i32::try_from(cfg.starting_plots).unwrap_or(i32::MAX)).collect();
        let plots = tx.insert_plots(farm.id, &indices).await?;
        if cfg.starting_seed_quantity > 0 {
            let plant_id = PlantId::new(cfg.starting_seed_plant_id);
            if tx.plant(plant_id).await?.is_none() {
                return Err(GameError::CatalogMissing { plant_id });
            }
            tx.credit_crop(user.id, plant_id, ItemType::Seed, cfg.starting_seed_quantity)
                .await?;
        }
        let inventory = view::inventory_view(&mut tx, user.id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, farm_id = %farm.id, plots = plots.len(), "Player registered");
        Ok(RegistrationView {
            user: view::user_view(&user),
            farm: FarmView {
                farm_id: farm.id,
                owner_id: user.id,
                plots: plots.iter().map(|plot| view::plot_view(plot, None, now)).collect(),
            },
            inventory,
        })
    }

    /// The player's own farm with every plot's derived status.
    pub async fn farm_overview(&self, user_id: UserId) -> Result<FarmView, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let plots = tx.plots(farm.id).await?;
        Ok(FarmView {
            farm_id: farm.id,
            owner_id: user_id,
            plots: view::plot_views(&mut tx, &plots, now).await?,
        })
    }

    /// A friend's farm, visible only to accepted friends.
    pub async fn friend_farm_overview(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<FarmView, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let plots = tx.plots(farm.id).await?;
        Ok(FarmView {
            farm_id: farm.id,
            owner_id: friend_id,
            plots: view::plot_views(&mut tx, &plots, now).await?,
        })
    }

    /// The player with their inventory.
    pub async fn player_state(&self, user_id: UserId) -> Result<PlayerStateView, GameError> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .user(user_id)
            .await?
            .ok_or(GameError::UserNotFound { user_id })?;
        Ok(PlayerStateView {
            user: view::user_view(&user),
            inventory: view::inventory_view(&mut tx, user_id).await?,
        })
    }
}
