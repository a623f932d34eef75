//! Single-plot actions on the player's own farm.
//!
//! Every action follows the same shape:
//!
//! 1. Open a unit of work and lock the player and the plot.
//! 2. Check the precondition. Nothing has been written when it fails.
//! 3. Write the plot, the player, and any inventory change.
//! 4. Commit, then append the audit row with before and after snapshots.
//! 5. Return views built from the committed state.
//!
//! Single tending actions (water, fertilize, weed, pest) grant
//! [`light_action_exp`]. Harvest grants the crop's own reward instead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use homestead_core::rules::{fertilizer_reduction, harvestable_units, light_action_exp};
use homestead_core::{Clock, calculate_status};
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{
    ActionType, FertilizeResponse, Hazard, HarvestDetail, HarvestGains, HarvestResponse, ItemType,
    ItemView, LandPlot, PlantId, PlantResponse, ReductionKind, TendResponse, UserId, WaterState,
};

use crate::audit;
use crate::error::GameError;
use crate::lookup;
use crate::view;

/// How much a fertilizer application shortens growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reduction {
    /// Percentage of total growth time, or flat seconds.
    #[serde(rename = "type")]
    pub kind: ReductionKind,
    /// Percent (1 to 100) or seconds (positive).
    pub value: u32,
}

impl Reduction {
    fn validate(self) -> Result<Self, GameError> {
        if self.value == 0 {
            return Err(GameError::InvalidInput {
                reason: "reduction value must be positive".to_owned(),
            });
        }
        if self.kind == ReductionKind::Percentage && self.value > 100 {
            return Err(GameError::InvalidInput {
                reason: "percentage reduction cannot exceed 100".to_owned(),
            });
        }
        Ok(self)
    }
}

/// Actions on one plot of the caller's own farm.
#[derive(Debug)]
pub struct InteractionEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for InteractionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: FarmStore> InteractionEngine<S> {
    /// Create an engine over `store`, reading time from `clock`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // -----------------------------------------------------------------------
    // Plant
    // -----------------------------------------------------------------------

    /// Plant one seed of `plant_id` on an empty plot.
    ///
    /// Consumes one seed and stamps the plot with a fresh cycle id from the
    /// farm counter.
    pub async fn plant(
        &self,
        user_id: UserId,
        plot_index: i32,
        plant_id: PlantId,
    ) -> Result<PlantResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        if before.is_planted() {
            return Err(GameError::PlotNotEmpty {
                plot_index: Some(plot_index),
            });
        }
        let plant = lookup::require_plant(&mut tx, plant_id).await?;
        lookup::ensure_level(&user, &plant)?;

        let held = tx.crop_stock(user_id, plant_id, ItemType::Seed).await?;
        if held == 0 || !tx.debit_crop(user_id, plant_id, ItemType::Seed, 1).await? {
            return Err(GameError::InsufficientSeeds { plant_id, held });
        }
        let cycle_id = tx.reserve_cycle_ids(farm.id, 1).await?;
        let after = before.planted(plant_id, now, cycle_id);
        tx.update_plots(std::slice::from_ref(&after)).await?;

        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, plot_index, %plant_id, cycle_id, "Planted");
        let param = format!("Planted {} on plot {plot_index}", plant.name);
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, ActionType::Plant, &before, &after, param, now)],
        )
        .await;

        Ok(PlantResponse {
            plot: view::plot_view(&after, Some(&plant), now),
            inventory,
        })
    }

    // -----------------------------------------------------------------------
    // Tending
    // -----------------------------------------------------------------------

    /// Water a plot that needs water.
    pub async fn water(&self, user_id: UserId, plot_index: i32) -> Result<TendResponse, GameError> {
        self.tend(user_id, plot_index, ActionType::Water, |plot| {
            if plot.water_state != WaterState::NeedsWater {
                return Err(GameError::NothingToWater);
            }
            Ok(LandPlot {
                water_state: WaterState::Watered,
                ..plot.clone()
            })
        })
        .await
    }

    /// Remove weeds from a plot.
    pub async fn remove_weeds(
        &self,
        user_id: UserId,
        plot_index: i32,
    ) -> Result<TendResponse, GameError> {
        self.clear_hazard(user_id, plot_index, Hazard::Weed).await
    }

    /// Remove pests from a plot.
    pub async fn remove_pests(
        &self,
        user_id: UserId,
        plot_index: i32,
    ) -> Result<TendResponse, GameError> {
        self.clear_hazard(user_id, plot_index, Hazard::Pest).await
    }

    async fn clear_hazard(
        &self,
        user_id: UserId,
        plot_index: i32,
        hazard: Hazard,
    ) -> Result<TendResponse, GameError> {
        self.tend(user_id, plot_index, hazard.tend_action(), |plot| {
            if !plot.has_hazard(hazard) {
                return Err(GameError::NoHazardToRemove { hazard });
            }
            Ok(plot.with_hazard(hazard, None))
        })
        .await
    }

    /// Shared body of water, weed, and pest: check and transform the plot,
    /// grant light experience.
    async fn tend<F>(
        &self,
        user_id: UserId,
        plot_index: i32,
        action: ActionType,
        apply: F,
    ) -> Result<TendResponse, GameError>
    where
        F: FnOnce(&LandPlot) -> Result<LandPlot, GameError> + Send,
    {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        let after = apply(&before)?;
        let plant = lookup::planted_crop(&mut tx, &after).await?;

        lookup::grant_exp(&mut user, u64::from(light_action_exp()));
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.update_user(&user).await?;
        tx.commit().await?;

        tracing::info!(%user_id, plot_index, ?action, "Plot tended");
        let param = format!("{action:?} on plot {plot_index}");
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, action, &before, &after, param, now)],
        )
        .await;

        Ok(TendResponse {
            plot: view::plot_view(&after, plant.as_ref(), now),
            user: view::user_view(&user),
        })
    }

    // -----------------------------------------------------------------------
    // Fertilize
    // -----------------------------------------------------------------------

    /// Shorten a planted crop's growth time.
    ///
    /// Percentage reductions are taken of the crop's total growth time.
    /// Reductions accumulate over the cycle.
    pub async fn fertilize(
        &self,
        user_id: UserId,
        plot_index: i32,
        reduction: Reduction,
    ) -> Result<FertilizeResponse, GameError> {
        let reduction = reduction.validate()?;
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        let Some(plant) = lookup::planted_crop(&mut tx, &before)
            .await?
            .filter(|_| before.is_planted())
        else {
            return Err(GameError::PlotEmpty { plot_index });
        };

        let reduced_seconds =
            fertilizer_reduction(reduction.kind, reduction.value, plant.growth.total_seconds);
        let after = LandPlot {
            fertilized: true,
            growth_time_reduced_seconds: before
                .growth_time_reduced_seconds
                .saturating_add(reduced_seconds),
            ..before.clone()
        };
        lookup::grant_exp(&mut user, u64::from(light_action_exp()));
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.update_user(&user).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, plot_index, reduced_seconds, "Fertilized");
        let param = format!("Fertilized plot {plot_index}, growth shortened by {reduced_seconds}s");
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, ActionType::Fertilize, &before, &after, param, now)],
        )
        .await;

        Ok(FertilizeResponse {
            plot: view::plot_view(&after, Some(&plant), now),
            user: view::user_view(&user),
            inventory,
            reduced_seconds,
        })
    }

    // -----------------------------------------------------------------------
    // Harvest
    // -----------------------------------------------------------------------

    /// Harvest a matured crop and reset the plot.
    ///
    /// The player receives the crop's experience reward and its yield minus
    /// what friends have stolen this cycle.
    pub async fn harvest(
        &self,
        user_id: UserId,
        plot_index: i32,
    ) -> Result<HarvestResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        let Some(plant) = lookup::planted_crop(&mut tx, &before)
            .await?
            .filter(|_| before.is_planted())
        else {
            return Err(GameError::PlotEmpty { plot_index });
        };

        let status = calculate_status(&before, Some(&plant), now);
        if !status.is_matured() {
            return Err(GameError::CropNotMatured {
                plot_index,
                remaining_seconds: status.remaining_seconds,
            });
        }
        let units = harvestable_units(plant.economics.revenue.yield_units, before.stolen_num);
        if units == 0 {
            return Err(GameError::NothingToHarvest);
        }

        let after = before.cleared();
        lookup::grant_exp(&mut user, u64::from(plant.rewards.exp));
        tx.credit_crop(user_id, plant.id, ItemType::Fruit, units).await?;
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.update_user(&user).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, plot_index, plant_id = %plant.id, units, "Harvested");
        let param = format!("Harvested {units} {} from plot {plot_index}", plant.name);
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, ActionType::Harvest, &before, &after, param, now)],
        )
        .await;

        Ok(HarvestResponse {
            harvest: HarvestDetail {
                plot_index,
                gains: HarvestGains {
                    exp: plant.rewards.exp,
                    item: ItemView {
                        item_id: plant.id.into_inner(),
                        name: plant.name.clone(),
                        quantity: units,
                    },
                },
            },
            plot: view::plot_view(&after, None, now),
            user: view::user_view(&user),
            inventory,
        })
    }
}
