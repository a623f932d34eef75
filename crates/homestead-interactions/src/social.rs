//! Actions on a friend's farm: stealing, sabotage, and help.
//!
//! Every entry point first rejects self-interaction, then requires an
//! accepted friendship in both directions, then resolves the friend's
//! farm.
//!
//! # Steal uniqueness
//!
//! A player may steal from a plot once per planting cycle. The steal log's
//! `(plot, stealer, cycle)` key is the authoritative guard: the engine
//! pre-checks it for a clean error, and a rejected insert is reported as
//! [`GameError::AlreadyStolen`] as well.
//!
//! # Sabotage quota
//!
//! Placing weeds and placing pests each have a daily cap of
//! [`MAX_SABOTAGE_ACTIONS_PER_DAY`]. The counter is incremented inside the
//! same unit of work as the placement, so a rejection rolls both back. A
//! batch placement reserves its whole count in one increment.

use std::sync::Arc;

use homestead_core::rules::{
    HELP_INTERACTION_EXP, MAX_SABOTAGE_ACTIONS_PER_DAY, steal_amount, within_daily_quota,
};
use homestead_core::{Clock, calculate_status};
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{
    ActionType, DailyCounterKey, Hazard, HelpResponse, ItemType, ItemView, LandPlot,
    PlayerLogEntry, SabotageAllResponse, SabotageResponse, StealAllResponse, StealDetail,
    StealReport, StealResponse, StealSummary, StealTotals, UserId,
};

use crate::audit;
use crate::batch::ItemTally;
use crate::error::GameError;
use crate::lookup;
use crate::view;

/// Actions a player performs on a friend's farm.
#[derive(Debug)]
pub struct SocialInteractionEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for SocialInteractionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: FarmStore> SocialInteractionEngine<S> {
    /// Create an engine over `store`, reading time from `clock`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // -----------------------------------------------------------------------
    // Steal
    // -----------------------------------------------------------------------

    /// Steal part of a matured crop from one of a friend's plots.
    ///
    /// Takes `max(1, 10% of yield)`, clamped to what is left. The friend's
    /// plot keeps its crop; only its stolen count grows.
    pub async fn steal(
        &self,
        user_id: UserId,
        friend_id: UserId,
        plot_index: i32,
    ) -> Result<StealResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        let (Some(plant), Some(cycle_id)) = (
            lookup::planted_crop(&mut tx, &before).await?,
            before.maturity_cycle_id,
        ) else {
            return Err(GameError::PlotEmpty { plot_index });
        };
        let status = calculate_status(&before, Some(&plant), now);
        if !status.is_matured() {
            return Err(GameError::CropNotMatured {
                plot_index,
                remaining_seconds: status.remaining_seconds,
            });
        }
        if tx.has_stolen(before.id, user_id, cycle_id).await? {
            return Err(GameError::AlreadyStolen {
                plot_index: Some(plot_index),
            });
        }
        let amount = steal_amount(plant.economics.revenue.yield_units, before.stolen_num);
        if amount == 0 {
            return Err(GameError::CropFullyStolen { plot_index });
        }
        if !tx.record_steal(before.id, user_id, cycle_id, now).await? {
            return Err(GameError::AlreadyStolen {
                plot_index: Some(plot_index),
            });
        }

        let after = LandPlot {
            stolen_num: before.stolen_num.saturating_add(amount),
            ..before.clone()
        };
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.credit_crop(user_id, plant.id, ItemType::Fruit, amount).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %friend_id, plot_index, amount, cycle_id, "Stole crop");
        let param = format!(
            "Stole {amount} {} from plot {plot_index} of player {friend_id}",
            plant.name
        );
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, ActionType::Steal, &before, &after, param, now)],
        )
        .await;

        Ok(StealResponse {
            steal: StealDetail {
                plot_index,
                stolen_item: ItemView {
                    item_id: plant.id.into_inner(),
                    name: plant.name,
                    quantity: amount,
                },
            },
            inventory,
        })
    }

    /// Steal from every qualifying plot of a friend's farm at once.
    ///
    /// Fails [`GameError::NothingToHarvest`] when no plot is matured with
    /// fruit left, and [`GameError::AlreadyStolen`] when the caller has
    /// already stolen from all of those this cycle.
    pub async fn steal_all(
        &self,
        user_id: UserId,
        friend_id: UserId,
    ) -> Result<StealAllResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let plots = tx.lock_plots(farm.id).await?;
        let catalog = lookup::crop_catalog(&mut tx).await?;

        let mut ripe = Vec::new();
        for plot in plots {
            let (Some(plant_id), Some(cycle_id)) = (plot.plant_id, plot.maturity_cycle_id) else {
                continue;
            };
            let plant = lookup::crop_of(&catalog, plant_id)?;
            let amount = steal_amount(plant.economics.revenue.yield_units, plot.stolen_num);
            if amount > 0 && calculate_status(&plot, Some(plant), now).is_matured() {
                ripe.push((plot, plant, cycle_id, amount));
            }
        }
        if ripe.is_empty() {
            return Err(GameError::NothingToHarvest);
        }

        let mut targets = Vec::with_capacity(ripe.len());
        for (plot, plant, cycle_id, amount) in ripe {
            if !tx.has_stolen(plot.id, user_id, cycle_id).await? {
                targets.push((plot, plant, cycle_id, amount));
            }
        }
        if targets.is_empty() {
            return Err(GameError::AlreadyStolen { plot_index: None });
        }

        let mut tally = ItemTally::default();
        let mut details = Vec::with_capacity(targets.len());
        let mut changed = Vec::with_capacity(targets.len());
        for (plot, plant, cycle_id, amount) in &targets {
            if !tx.record_steal(plot.id, user_id, *cycle_id, now).await? {
                return Err(GameError::AlreadyStolen {
                    plot_index: Some(plot.plot_index),
                });
            }
            let after = LandPlot {
                stolen_num: plot.stolen_num.saturating_add(*amount),
                ..plot.clone()
            };
            tally.add(plant.id, &plant.name, *amount);
            details.push(StealDetail {
                plot_index: plot.plot_index,
                stolen_item: ItemView {
                    item_id: plant.id.into_inner(),
                    name: plant.name.clone(),
                    quantity: *amount,
                },
            });
            changed.push((plot.clone(), after));
        }
        for (plant_id, quantity) in tally.lines() {
            tx.credit_crop(user_id, plant_id, ItemType::Fruit, quantity).await?;
        }
        let after: Vec<LandPlot> = changed.iter().map(|(_, new)| new.clone()).collect();
        tx.update_plots(&after).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        let stolen_plots_count = lookup::count_of(details.len())?;
        tracing::info!(%user_id, %friend_id, stolen_plots_count, "Stole from all plots");
        let mut entries: Vec<PlayerLogEntry> = changed
            .iter()
            .zip(&details)
            .map(|((old, new), detail)| {
                let param = format!(
                    "Stole {} {} from plot {} of player {friend_id} (batch)",
                    detail.stolen_item.quantity, detail.stolen_item.name, detail.plot_index
                );
                audit::plot_entry(user_id, ActionType::Steal, old, new, param, now)
            })
            .collect();
        let items = tally.into_items();
        entries.push(audit::farm_entry(
            user_id,
            ActionType::Steal,
            farm.id,
            serde_json::json!({ "stolenPlotsCount": stolen_plots_count, "items": items }),
            format!("Stole from {stolen_plots_count} plots of player {friend_id}"),
            now,
        ));
        audit::record(&*self.store, &entries).await;

        Ok(StealAllResponse {
            stolen_report: StealReport {
                summary: StealSummary {
                    stolen_plots_count,
                    total_gains: StealTotals { items },
                },
                details,
            },
            inventory,
        })
    }

    // -----------------------------------------------------------------------
    // Sabotage
    // -----------------------------------------------------------------------

    /// Place a hazard on one of a friend's planted plots.
    pub async fn sabotage(
        &self,
        user_id: UserId,
        friend_id: UserId,
        plot_index: i32,
        hazard: Hazard,
    ) -> Result<SabotageResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        if !before.is_planted() {
            return Err(GameError::PlotEmpty { plot_index });
        }
        if before.has_hazard(hazard) {
            return Err(GameError::PlotAlreadyHasHazard { hazard });
        }
        let used_today = self.reserve_quota(&mut tx, user_id, hazard, 1).await?;

        let after = before.with_hazard(hazard, Some(user_id));
        let plant = lookup::planted_crop(&mut tx, &after).await?;
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %friend_id, plot_index, ?hazard, used_today, "Sabotaged plot");
        let action = hazard.sabotage_action();
        let param = format!(
            "Placed {} on plot {plot_index} of player {friend_id}",
            hazard.noun()
        );
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, action, &before, &after, param, now)],
        )
        .await;

        Ok(SabotageResponse {
            plot: view::plot_view(&after, plant.as_ref(), now),
            used_today,
        })
    }

    /// Place a hazard on every planted plot of a friend's farm that does not
    /// already have it. The whole count is checked against the quota at
    /// once.
    pub async fn sabotage_all(
        &self,
        user_id: UserId,
        friend_id: UserId,
        hazard: Hazard,
    ) -> Result<SabotageAllResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let before: Vec<LandPlot> = tx
            .lock_plots(farm.id)
            .await?
            .into_iter()
            .filter(|plot| plot.is_planted() && !plot.has_hazard(hazard))
            .collect();
        if before.is_empty() {
            return Err(GameError::PlotAlreadyHasHazard { hazard });
        }
        let placed_count = lookup::count_of(before.len())?;
        let used_today = self.reserve_quota(&mut tx, user_id, hazard, placed_count).await?;

        let after: Vec<LandPlot> = before
            .iter()
            .map(|plot| plot.with_hazard(hazard, Some(user_id)))
            .collect();
        tx.update_plots(&after).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %friend_id, ?hazard, placed_count, used_today, "Sabotaged farm");
        let action = hazard.sabotage_action();
        let mut entries: Vec<PlayerLogEntry> = before
            .iter()
            .zip(&after)
            .map(|(old, new)| {
                let param = format!(
                    "Placed {} on plot {} of player {friend_id} (batch)",
                    hazard.noun(),
                    new.plot_index
                );
                audit::plot_entry(user_id, action, old, new, param, now)
            })
            .collect();
        entries.push(audit::farm_entry(
            user_id,
            action,
            farm.id,
            serde_json::json!({ "placedCount": placed_count, "usedToday": used_today }),
            format!("Placed {} on {placed_count} plots of player {friend_id}", hazard.noun()),
            now,
        ));
        audit::record(&*self.store, &entries).await;

        Ok(SabotageAllResponse { placed_count })
    }

    /// Add `count` to today's counter for this hazard and return the new
    /// total, or fail when it would pass the cap.
    async fn reserve_quota(
        &self,
        tx: &mut S::Tx,
        user_id: UserId,
        hazard: Hazard,
        count: u32,
    ) -> Result<u32, GameError> {
        let key = DailyCounterKey {
            user_id,
            action: hazard.sabotage_action(),
            day: self.clock.today(),
        };
        let total = tx.increment_daily_counter(key, count).await?;
        if !within_daily_quota(total) {
            tracing::warn!(%user_id, ?hazard, requested = count, "Daily sabotage limit reached");
            return Err(GameError::DailySabotageLimitExceeded {
                used: total.saturating_sub(count),
                limit: MAX_SABOTAGE_ACTIONS_PER_DAY,
            });
        }
        Ok(total)
    }

    // -----------------------------------------------------------------------
    // Help
    // -----------------------------------------------------------------------

    /// Clear a hazard from a friend's plot. The helper earns
    /// [`HELP_INTERACTION_EXP`], unless they placed the hazard themselves.
    pub async fn help(
        &self,
        user_id: UserId,
        friend_id: UserId,
        plot_index: i32,
        hazard: Hazard,
    ) -> Result<HelpResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut helper = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::friend_farm(&mut tx, user_id, friend_id).await?;
        let before = lookup::require_plot(&mut tx, farm.id, plot_index).await?;
        if !before.has_hazard(hazard) {
            return Err(GameError::NoHazardToRemove { hazard });
        }
        if before.hazard_placed_by(hazard) == Some(user_id) {
            return Err(GameError::CannotHelpSelfSabotage { hazard });
        }

        let after = before.with_hazard(hazard, None);
        let plant = lookup::planted_crop(&mut tx, &after).await?;
        lookup::grant_exp(&mut helper, u64::from(HELP_INTERACTION_EXP));
        tx.update_plots(std::slice::from_ref(&after)).await?;
        tx.update_user(&helper).await?;
        tx.commit().await?;

        tracing::info!(%user_id, %friend_id, plot_index, ?hazard, "Helped friend");
        let param = format!(
            "Cleared {} from plot {plot_index} of player {friend_id}",
            hazard.noun()
        );
        audit::record(
            &*self.store,
            &[audit::plot_entry(user_id, hazard.help_action(), &before, &after, param, now)],
        )
        .await;

        Ok(HelpResponse {
            plot: view::plot_view(&after, plant.as_ref(), now),
            user: view::user_view(&helper),
        })
    }
}
