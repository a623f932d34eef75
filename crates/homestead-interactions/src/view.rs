//! Builders for the response views.
//!
//! Views are derived from committed rows at the moment of the response:
//! growth status through [`calculate_status`], level through the leveling
//! curve. Nothing here writes.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use homestead_core::{calculate_status, leveling};
use homestead_db::UnitOfWork;
use homestead_types::{
    InventoryView, ItemType, ItemView, LandPlot, Plant, PlantId, PlotPlantView, PlotView, User,
    UserId, UserView,
};

use crate::error::GameError;
use crate::lookup;

/// View of one plot. `plant` is the catalog entry of its crop, if planted.
pub fn plot_view(plot: &LandPlot, plant: Option<&Plant>, now: DateTime<Utc>) -> PlotView {
    let status = calculate_status(plot, plant, now);
    PlotView {
        id: plot.id,
        plot_index: plot.plot_index,
        plant: plant.filter(|_| plot.is_planted()).map(|p| PlotPlantView {
            id: p.id,
            name: p.name.clone(),
            image: p.image.clone(),
        }),
        status: status.status,
        current_stage: status.current_stage,
        growth_percentage: status.growth_percentage,
        remaining_seconds: status.remaining_seconds,
        water_state: plot.water_state.code(),
        fertilizer_state: u8::from(plot.fertilized),
        has_weeds: plot.has_weeds,
        has_pests: plot.has_pests,
        stolen_num: plot.stolen_num,
    }
}

/// Views of several plots against a preloaded crop catalog.
pub fn plot_views_with(
    catalog: &HashMap<PlantId, Plant>,
    plots: &[LandPlot],
    now: DateTime<Utc>,
) -> Result<Vec<PlotView>, GameError> {
    plots
        .iter()
        .map(|plot| {
            let plant = plot
                .plant_id
                .map(|id| lookup::crop_of(catalog, id))
                .transpose()?;
            Ok(plot_view(plot, plant, now))
        })
        .collect()
}

/// Views of several plots, loading the crop catalog once.
pub async fn plot_views<T: UnitOfWork>(
    tx: &mut T,
    plots: &[LandPlot],
    now: DateTime<Utc>,
) -> Result<Vec<PlotView>, GameError> {
    let catalog = lookup::crop_catalog(tx).await?;
    plot_views_with(&catalog, plots, now)
}

/// Public view of a player with derived level.
pub fn user_view(user: &User) -> UserView {
    let progress = leveling::progress(user.exp);
    UserView {
        id: user.id,
        nick_name: user.nick_name.clone(),
        level: progress.level,
        exp: user.exp,
        exp_to_next_level: progress.exp_to_next_level,
        gold: user.gold,
        premium_currency: user.premium_currency,
    }
}

/// Inventory of `user_id`: seeds and fruit ordered by crop id, props
/// grouped by type. Empty lines are left out.
pub async fn inventory_view<T: UnitOfWork>(
    tx: &mut T,
    user_id: UserId,
) -> Result<InventoryView, GameError> {
    let mut view = InventoryView::default();

    let crops = lookup::crop_catalog(tx).await?;
    let mut stocks = tx.crop_stocks(user_id).await?;
    stocks.sort_by_key(|s| (s.plant_id, s.item_type));
    for stock in stocks.into_iter().filter(|s| s.quantity > 0) {
        let plant = lookup::crop_of(&crops, stock.plant_id)?;
        let line = ItemView {
            item_id: stock.plant_id.into_inner(),
            name: plant.name.clone(),
            quantity: stock.quantity,
        };
        match stock.item_type {
            ItemType::Seed => view.seeds.push(line),
            ItemType::Fruit => view.fruits.push(line),
            ItemType::Prop => tracing::warn!(%user_id, "Prop stored as crop stock, skipped"),
        }
    }

    let props: HashMap<_, _> = tx.props().await?.into_iter().map(|p| (p.id, p)).collect();
    let mut held = tx.prop_stocks(user_id).await?;
    held.sort_by_key(|s| s.prop_id);
    for stock in held.into_iter().filter(|s| s.quantity > 0) {
        let Some(prop) = props.get(&stock.prop_id) else {
            tracing::warn!(%user_id, prop_id = %stock.prop_id, "Held prop missing from catalog");
            continue;
        };
        view.props.entry(prop.prop_type).or_default().push(ItemView {
            item_id: stock.prop_id.into_inner(),
            name: prop.name.clone(),
            quantity: stock.quantity,
        });
    }

    Ok(view)
}
