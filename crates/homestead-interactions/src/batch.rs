//! Farm-wide versions of the tending, harvest, and planting actions.
//!
//! Each call locks every plot of the farm, filters the plots the action
//! applies to, and commits the whole qualifying set in one unit of work or
//! nothing. It then writes one audit row per affected plot plus one
//! farm-level summary row.
//!
//! Batch tending grants [`BASE_INTERACTION_EXP`] per plot, three times the
//! single-plot grant.
//!
//! [`BASE_INTERACTION_EXP`]: homestead_core::rules::BASE_INTERACTION_EXP

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use homestead_core::rules::{batch_exp, harvestable_units};
use homestead_core::{Clock, calculate_status};
use homestead_db::{FarmStore, UnitOfWork};
use homestead_types::{
    ActionType, ClearAllResponse, ClearAllResult, Hazard, HarvestAllResponse, HarvestDetail,
    HarvestGains, HarvestReport, HarvestSummary, HarvestTotals, ItemType, ItemView, LandPlot,
    PlantAllResponse, PlantId, PlantReport, PlayerLogEntry, User, UserId, WaterAllResponse,
    WaterAllResult, WaterState,
};

use crate::audit;
use crate::error::GameError;
use crate::lookup;
use crate::view;

/// Sum quantities per crop, keeping the crop name for the report line.
#[derive(Debug, Default)]
pub(crate) struct ItemTally {
    lines: BTreeMap<PlantId, ItemView>,
}

impl ItemTally {
    pub(crate) fn add(&mut self, plant_id: PlantId, name: &str, quantity: u32) {
        let line = self.lines.entry(plant_id).or_insert_with(|| ItemView {
            item_id: plant_id.into_inner(),
            name: name.to_owned(),
            quantity: 0,
        });
        line.quantity = line.quantity.saturating_add(quantity);
    }

    pub(crate) fn lines(&self) -> impl Iterator<Item = (PlantId, u32)> + '_ {
        self.lines.iter().map(|(id, line)| (*id, line.quantity))
    }

    pub(crate) fn into_items(self) -> Vec<ItemView> {
        self.lines.into_values().collect()
    }
}

/// Farm-wide actions on the caller's own farm.
#[derive(Debug)]
pub struct BatchInteractionEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for BatchInteractionEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: FarmStore> BatchInteractionEngine<S> {
    /// Create an engine over `store`, reading time from `clock`.
    pub const fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // -----------------------------------------------------------------------
    // Tending
    // -----------------------------------------------------------------------

    /// Water every plot that needs water.
    pub async fn water_all(&self, user_id: UserId) -> Result<WaterAllResponse, GameError> {
        let (count, gained_exp, user) = self
            .tend_all(
                user_id,
                ActionType::Water,
                |plot| plot.water_state == WaterState::NeedsWater,
                |plot| LandPlot {
                    water_state: WaterState::Watered,
                    ..plot.clone()
                },
                GameError::NothingToWater,
            )
            .await?;
        Ok(WaterAllResponse {
            result: WaterAllResult {
                watered_count: count,
                gained_exp,
            },
            user: view::user_view(&user),
        })
    }

    /// Remove weeds from every weedy plot.
    pub async fn weed_all(&self, user_id: UserId) -> Result<ClearAllResponse, GameError> {
        self.clear_all(user_id, Hazard::Weed).await
    }

    /// Remove pests from every infested plot.
    pub async fn pest_all(&self, user_id: UserId) -> Result<ClearAllResponse, GameError> {
        self.clear_all(user_id, Hazard::Pest).await
    }

    async fn clear_all(&self, user_id: UserId, hazard: Hazard) -> Result<ClearAllResponse, GameError> {
        let (count, gained_exp, user) = self
            .tend_all(
                user_id,
                hazard.tend_action(),
                |plot| plot.has_hazard(hazard),
                |plot| plot.with_hazard(hazard, None),
                GameError::NoHazardToRemove { hazard },
            )
            .await?;
        Ok(ClearAllResponse {
            result: ClearAllResult {
                removed_count: count,
                gained_exp,
            },
            user: view::user_view(&user),
        })
    }

    /// Shared body of the batch tending actions. Returns the number of plots
    /// changed, the experience granted, and the updated player.
    async fn tend_all<P, A>(
        &self,
        user_id: UserId,
        action: ActionType,
        applies: P,
        apply: A,
        nothing_to_do: GameError,
    ) -> Result<(u32, u64, User), GameError>
    where
        P: Fn(&LandPlot) -> bool + Send,
        A: Fn(&LandPlot) -> LandPlot + Send,
    {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let before: Vec<LandPlot> = tx
            .lock_plots(farm.id)
            .await?
            .into_iter()
            .filter(|plot| applies(plot))
            .collect();
        if before.is_empty() {
            return Err(nothing_to_do);
        }
        let count = lookup::count_of(before.len())?;
        let gained_exp = batch_exp(count).ok_or(GameError::Overflow {
            context: "batch experience",
        })?;

        let after: Vec<LandPlot> = before.iter().map(&apply).collect();
        lookup::grant_exp(&mut user, gained_exp);
        tx.update_plots(&after).await?;
        tx.update_user(&user).await?;
        tx.commit().await?;

        tracing::info!(%user_id, farm_id = %farm.id, ?action, count, gained_exp, "Batch tended");
        let mut entries: Vec<PlayerLogEntry> = before
            .iter()
            .zip(&after)
            .map(|(old, new)| {
                let param = format!("{action:?} on plot {} (batch)", new.plot_index);
                audit::plot_entry(user_id, action, old, new, param, now)
            })
            .collect();
        entries.push(audit::farm_entry(
            user_id,
            action,
            farm.id,
            serde_json::json!({ "count": count, "gainedExp": gained_exp }),
            format!("{action:?} on {count} plots"),
            now,
        ));
        audit::record(&*self.store, &entries).await;

        Ok((count, gained_exp, user))
    }

    // -----------------------------------------------------------------------
    // Harvest all
    // -----------------------------------------------------------------------

    /// Harvest every matured plot.
    ///
    /// Experience and fruit come only from plots with a positive harvestable
    /// quantity. Matured plots that friends have stolen bare are cleared in
    /// the same unit of work and audited as zero-quantity harvests, but do
    /// not appear in the report. When no plot yields anything the call fails
    /// and nothing is cleared.
    pub async fn harvest_all(&self, user_id: UserId) -> Result<HarvestAllResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let mut user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let plots = tx.lock_plots(farm.id).await?;
        let catalog = lookup::crop_catalog(&mut tx).await?;

        let mut harvested: Vec<(LandPlot, HarvestDetail)> = Vec::new();
        let mut stolen_bare: Vec<(LandPlot, String)> = Vec::new();
        for plot in plots.into_iter().filter(LandPlot::is_planted) {
            let Some(plant_id) = plot.plant_id else {
                continue;
            };
            let plant = lookup::crop_of(&catalog, plant_id)?;
            if !calculate_status(&plot, Some(plant), now).is_matured() {
                continue;
            }
            let units = harvestable_units(plant.economics.revenue.yield_units, plot.stolen_num);
            if units == 0 {
                stolen_bare.push((plot, plant.name.clone()));
                continue;
            }
            let detail = HarvestDetail {
                plot_index: plot.plot_index,
                gains: HarvestGains {
                    exp: plant.rewards.exp,
                    item: ItemView {
                        item_id: plant_id.into_inner(),
                        name: plant.name.clone(),
                        quantity: units,
                    },
                },
            };
            harvested.push((plot, detail));
        }
        if harvested.is_empty() {
            return Err(GameError::NothingToHarvest);
        }

        let mut tally = ItemTally::default();
        let mut total_exp: u64 = 0;
        for (plot, detail) in &harvested {
            total_exp = total_exp.saturating_add(u64::from(detail.gains.exp));
            if let Some(plant_id) = plot.plant_id {
                tally.add(plant_id, &detail.gains.item.name, detail.gains.item.quantity);
            }
        }
        for (plant_id, quantity) in tally.lines() {
            tx.credit_crop(user_id, plant_id, ItemType::Fruit, quantity).await?;
        }

        let cleared: Vec<LandPlot> = harvested
            .iter()
            .map(|(plot, _)| plot)
            .chain(stolen_bare.iter().map(|(plot, _)| plot))
            .map(LandPlot::cleared)
            .collect();
        lookup::grant_exp(&mut user, total_exp);
        tx.update_plots(&cleared).await?;
        tx.update_user(&user).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        let harvested_plots_count = lookup::count_of(harvested.len())?;
        tracing::info!(
            %user_id,
            farm_id = %farm.id,
            harvested = harvested_plots_count,
            cleared_bare = stolen_bare.len(),
            total_exp,
            "Harvested all"
        );
        let mut entries: Vec<PlayerLogEntry> = harvested
            .iter()
            .map(|(plot, detail)| {
                let param = format!(
                    "Harvested {} {} from plot {} (batch)",
                    detail.gains.item.quantity, detail.gains.item.name, plot.plot_index
                );
                audit::plot_entry(user_id, ActionType::Harvest, plot, &plot.cleared(), param, now)
            })
            .collect();
        entries.extend(stolen_bare.iter().map(|(plot, name)| {
            let param = format!("Harvested 0 {name} from plot {} (batch)", plot.plot_index);
            audit::plot_entry(user_id, ActionType::Harvest, plot, &plot.cleared(), param, now)
        }));
        let total_items = tally.into_items();
        entries.push(audit::farm_entry(
            user_id,
            ActionType::Harvest,
            farm.id,
            serde_json::json!({
                "harvestedPlotsCount": harvested_plots_count,
                "totalExp": total_exp,
                "totalItems": total_items,
            }),
            format!("Harvested {harvested_plots_count} plots"),
            now,
        ));
        audit::record(&*self.store, &entries).await;

        Ok(HarvestAllResponse {
            harvest_report: HarvestReport {
                summary: HarvestSummary {
                    harvested_plots_count,
                    total_gains: HarvestTotals {
                        total_exp,
                        total_items,
                    },
                },
                details: harvested.into_iter().map(|(_, detail)| detail).collect(),
            },
            plots: cleared.iter().map(|plot| view::plot_view(plot, None, now)).collect(),
            user: view::user_view(&user),
            inventory,
        })
    }

    // -----------------------------------------------------------------------
    // Plant all
    // -----------------------------------------------------------------------

    /// Plant `plant_id` on as many empty plots as the player has seeds for,
    /// in plot order.
    ///
    /// Cycle ids come from one contiguous block reserved on the farm
    /// counter.
    pub async fn plant_all(
        &self,
        user_id: UserId,
        plant_id: PlantId,
    ) -> Result<PlantAllResponse, GameError> {
        let now = self.clock.now();
        let mut tx = self.store.begin().await?;
        let user = lookup::require_user(&mut tx, user_id).await?;
        let farm = lookup::require_farm(&mut tx, user_id).await?;
        let empty: Vec<LandPlot> = tx
            .lock_plots(farm.id)
            .await?
            .into_iter()
            .filter(|plot| !plot.is_planted())
            .collect();
        if empty.is_empty() {
            return Err(GameError::PlotNotEmpty { plot_index: None });
        }
        let plant = lookup::require_plant(&mut tx, plant_id).await?;
        lookup::ensure_level(&user, &plant)?;

        let held = tx.crop_stock(user_id, plant_id, ItemType::Seed).await?;
        let count = lookup::count_of(empty.len())?.min(held);
        if count == 0 || !tx.debit_crop(user_id, plant_id, ItemType::Seed, count).await? {
            return Err(GameError::InsufficientSeeds { plant_id, held });
        }
        let first_cycle = tx.reserve_cycle_ids(farm.id, count).await?;
        let before: Vec<LandPlot> = empty.into_iter().take(usize::try_from(count).unwrap_or(0)).collect();
        let after = stamp_cycles(&before, plant_id, now, first_cycle)?;
        tx.update_plots(&after).await?;
        let inventory = view::inventory_view(&mut tx, user_id).await?;
        tx.commit().await?;

        tracing::info!(%user_id, farm_id = %farm.id, %plant_id, count, first_cycle, "Planted all");
        let mut entries: Vec<PlayerLogEntry> = before
            .iter()
            .zip(&after)
            .map(|(old, new)| {
                let param = format!("Planted {} on plot {} (batch)", plant.name, new.plot_index);
                audit::plot_entry(user_id, ActionType::Plant, old, new, param, now)
            })
            .collect();
        entries.push(audit::farm_entry(
            user_id,
            ActionType::Plant,
            farm.id,
            serde_json::json!({ "plantId": plant_id, "plantCount": count }),
            format!("Planted {} on {count} plots", plant.name),
            now,
        ));
        audit::record(&*self.store, &entries).await;

        Ok(PlantAllResponse {
            plant_report: PlantReport { plant_count: count },
            plots: after.iter().map(|plot| view::plot_view(plot, Some(&plant), now)).collect(),
            inventory,
        })
    }
}

/// Plant each plot with consecutive cycle ids starting at `first_cycle`.
fn stamp_cycles(
    plots: &[LandPlot],
    plant_id: PlantId,
    at: DateTime<Utc>,
    first_cycle: i64,
) -> Result<Vec<LandPlot>, GameError> {
    let mut cycle_id = first_cycle;
    let mut planted = Vec::with_capacity(plots.len());
    for plot in plots {
        planted.push(plot.planted(plant_id, at, cycle_id));
        cycle_id = cycle_id.checked_add(1).ok_or(GameError::Overflow {
            context: "maturity cycle id",
        })?;
    }
    Ok(planted)
}

#[cfg(test)]
mod tests {
    use homestead_types::{FarmId, PlotId};

    use super::*;

    #[test]
    fn tally_merges_same_crop() {
        let mut tally = ItemTally::default();
        tally.add(PlantId::new(2), "Carrot", 4);
        tally.add(PlantId::new(1), "Radish", 8);
        tally.add(PlantId::new(2), "Carrot", 5);
        let items = tally.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items.first().map(|i| (i.item_id, i.quantity)), Some((1, 8)));
        assert_eq!(items.get(1).map(|i| (i.item_id, i.quantity)), Some((2, 9)));
    }

    #[test]
    fn cycle_ids_are_consecutive() {
        let plots: Vec<LandPlot> = (1..=3)
            .map(|i| LandPlot::empty(PlotId::new(i), FarmId::new(1), i32::try_from(i).unwrap_or(0)))
            .collect();
        let planted = stamp_cycles(&plots, PlantId::new(1), Utc::now(), 7);
        let cycles: Vec<Option<i64>> = planted
            .unwrap_or_default()
            .iter()
            .map(|p| p.maturity_cycle_id)
            .collect();
        assert_eq!(cycles, vec![Some(7), Some(8), Some(9)]);
    }
}
