//! Farm-wide actions: batch tending, harvest-all, and plant-all.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

mod common;

use common::{CARROT, RADISH, World};
use homestead_interactions::GameError;
use homestead_types::{ActionType, CropStatus, ItemType, TargetModel, WaterState};

#[tokio::test]
async fn water_all_rewards_each_thirsty_plot() {
    let world = World::new();
    let alice = world.player("alice").await;
    for index in [1, 3, 5] {
        world
            .edit_plot(alice, index, |plot| plot.water_state = WaterState::NeedsWater)
            .await;
    }

    let response = world.game.batch.water_all(alice).await.unwrap();
    assert_eq!(response.result.watered_count, 3);
    assert_eq!(response.result.gained_exp, 90);
    assert_eq!(response.user.exp, 90);
    assert_eq!(world.plot(alice, 3).await.water_state, WaterState::Watered);
    assert_eq!(world.plot(alice, 2).await.water_state, WaterState::Fresh);

    let logs = world.logs().await;
    assert_eq!(logs.len(), 4);
    assert!(logs.iter().all(|entry| entry.action_type == ActionType::Water));
    let summaries: Vec<_> = logs
        .iter()
        .filter(|entry| entry.target_model == TargetModel::Farm)
        .collect();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].new_data.as_ref().unwrap()["count"], 3);
}

#[tokio::test]
async fn batch_tending_with_nothing_to_do_fails() {
    let world = World::new();
    let alice = world.player("alice").await;

    let water = world.game.batch.water_all(alice).await.unwrap_err();
    assert!(matches!(water, GameError::NothingToWater));
    let weeds = world.game.batch.weed_all(alice).await.unwrap_err();
    assert_eq!(weeds.code(), 2009);
    let pests = world.game.batch.pest_all(alice).await.unwrap_err();
    assert_eq!(pests.code(), 2010);
    assert_eq!(world.user(alice).await.exp, 0);
}

#[tokio::test]
async fn weed_all_and_pest_all_clear_only_their_hazard() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.edit_plot(alice, 1, |plot| plot.has_weeds = true).await;
    world
        .edit_plot(alice, 2, |plot| {
            plot.has_weeds = true;
            plot.has_pests = true;
        })
        .await;

    let weeded = world.game.batch.weed_all(alice).await.unwrap();
    assert_eq!(weeded.result.removed_count, 2);
    assert_eq!(weeded.result.gained_exp, 60);
    assert!(world.plot(alice, 2).await.has_pests);

    let debugged = world.game.batch.pest_all(alice).await.unwrap();
    assert_eq!(debugged.result.removed_count, 1);
    assert_eq!(debugged.user.exp, 90);
}

#[tokio::test]
async fn harvest_all_merges_yields_and_skips_growing_plots() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.grow_radishes(alice, &[1, 2]).await;
    world.game.plots.plant(alice, 3, RADISH).await.unwrap();

    let response = world.game.batch.harvest_all(alice).await.unwrap();
    let summary = &response.harvest_report.summary;
    assert_eq!(summary.harvested_plots_count, 2);
    assert_eq!(summary.total_gains.total_exp, 24);
    assert_eq!(summary.total_gains.total_items.len(), 1);
    assert_eq!(summary.total_gains.total_items[0].quantity, 20);
    assert_eq!(response.harvest_report.details.len(), 2);
    assert_eq!(response.user.exp, 24);

    assert_eq!(world.stock(alice, RADISH, ItemType::Fruit).await, 20);
    assert!(!world.plot(alice, 1).await.is_planted());
    assert!(world.plot(alice, 3).await.is_planted());
}

#[tokio::test]
async fn harvest_all_lists_each_crop_once() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.set_exp(alice, 200).await;
    world.give(alice, CARROT, ItemType::Seed, 1).await;
    world.game.plots.plant(alice, 1, RADISH).await.unwrap();
    world.game.plots.plant(alice, 2, CARROT).await.unwrap();
    world.game.plots.plant(alice, 3, RADISH).await.unwrap();
    world.advance(7200);

    let response = world.game.batch.harvest_all(alice).await.unwrap();
    let items = &response.harvest_report.summary.total_gains.total_items;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_id, RADISH.into_inner());
    assert_eq!(items[0].quantity, 20);
    assert_eq!(items[1].item_id, CARROT.into_inner());
    assert_eq!(items[1].quantity, 12);
    assert_eq!(response.harvest_report.summary.total_gains.total_exp, 12 + 25 + 12);
}

#[tokio::test]
async fn harvest_all_clears_and_audits_stolen_bare_plots() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.grow_radishes(alice, &[1, 2]).await;
    world.edit_plot(alice, 2, |plot| plot.stolen_num = 10).await;
    let bare_plot_id = world.plot(alice, 2).await.id.into_inner();

    let response = world.game.batch.harvest_all(alice).await.unwrap();
    assert_eq!(response.harvest_report.summary.harvested_plots_count, 1);
    assert_eq!(response.harvest_report.details[0].plot_index, 1);
    assert!(!world.plot(alice, 2).await.is_planted());

    let logs = world.logs().await;
    let harvest_rows: Vec<_> = logs
        .iter()
        .filter(|entry| {
            entry.action_type == ActionType::Harvest && entry.target_model == TargetModel::LandPlot
        })
        .collect();
    assert_eq!(harvest_rows.len(), 2);

    let bare_row = harvest_rows
        .iter()
        .find(|entry| entry.target_id == Some(bare_plot_id))
        .expect("stolen-bare plot is audited");
    assert!(bare_row.param.starts_with("Harvested 0 "));
    let before = bare_row.old_data.as_ref().unwrap();
    let after = bare_row.new_data.as_ref().unwrap();
    assert_eq!(before["stolenNum"], 10);
    assert!(after["plantId"].is_null());
}

#[tokio::test]
async fn harvest_all_without_yield_changes_nothing() {
    let world = World::new();
    let alice = world.player("alice").await;

    let empty = world.game.batch.harvest_all(alice).await.unwrap_err();
    assert!(matches!(empty, GameError::NothingToHarvest));

    world.grow_radishes(alice, &[4]).await;
    world.edit_plot(alice, 4, |plot| plot.stolen_num = 10).await;
    let bare = world.game.batch.harvest_all(alice).await.unwrap_err();
    assert!(matches!(bare, GameError::NothingToHarvest));
    assert!(world.plot(alice, 4).await.is_planted());
}

#[tokio::test]
async fn plant_all_fills_empty_plots_with_distinct_cycles() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.game.plots.plant(alice, 2, RADISH).await.unwrap();

    let response = world.game.batch.plant_all(alice, RADISH).await.unwrap();
    assert_eq!(response.plant_report.plant_count, 4);
    assert!(
        response
            .plots
            .iter()
            .all(|plot| plot.status == CropStatus::Growing)
    );
    assert_eq!(world.stock(alice, RADISH, ItemType::Seed).await, 5);

    let mut cycles = Vec::new();
    for index in 1..=5 {
        cycles.push(world.plot(alice, index).await.maturity_cycle_id.unwrap());
    }
    cycles.sort_unstable();
    assert_eq!(cycles, vec![1, 2, 3, 4, 5]);
    assert_eq!(world.plot_logs().await, 5);
}

#[tokio::test]
async fn plant_all_stops_when_seeds_run_out() {
    let world = World::new();
    let alice = world.player("alice").await;
    world
        .game
        .economy
        .sell(alice, ItemType::Seed, RADISH.into_inner(), 8)
        .await
        .unwrap();

    let response = world.game.batch.plant_all(alice, RADISH).await.unwrap();
    assert_eq!(response.plant_report.plant_count, 2);
    assert!(world.plot(alice, 1).await.is_planted());
    assert!(world.plot(alice, 2).await.is_planted());
    assert!(!world.plot(alice, 3).await.is_planted());

    let dry = world.game.batch.plant_all(alice, RADISH).await.unwrap_err();
    assert!(matches!(dry, GameError::InsufficientSeeds { held: 0, .. }));
}

#[tokio::test]
async fn plant_all_on_a_full_farm_fails() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.game.batch.plant_all(alice, RADISH).await.unwrap();

    let err = world.game.batch.plant_all(alice, RADISH).await.unwrap_err();
    assert!(matches!(err, GameError::PlotNotEmpty { plot_index: None }));
    assert_eq!(world.stock(alice, RADISH, ItemType::Seed).await, 5);
}
