//! Single-plot actions on the player's own farm, driven through the
//! in-memory store with a manual clock.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

mod common;

use common::{CARROT, RADISH, World, t0};
use homestead_db::Catalog;
use homestead_interactions::{GameError, Reduction};
use homestead_types::{
    ActionType, CropStatus, ItemType, PlantId, ReductionKind, TargetModel, WaterState,
};

#[tokio::test]
async fn registration_hands_out_the_starter_kit() {
    let world = World::new();
    let registration = world.game.farms.register_player("  Maple  ").await.unwrap();

    assert_eq!(registration.user.nick_name, "Maple");
    assert_eq!(registration.user.level, 1);
    assert_eq!(registration.user.gold.to_string(), "1000");
    let indices: Vec<i32> = registration.farm.plots.iter().map(|p| p.plot_index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert!(
        registration
            .farm
            .plots
            .iter()
            .all(|p| p.status == CropStatus::Empty)
    );
    assert_eq!(registration.inventory.seeds.len(), 1);
    assert_eq!(registration.inventory.seeds[0].item_id, RADISH.into_inner());
    assert_eq!(registration.inventory.seeds[0].quantity, 10);
}

#[tokio::test]
async fn registration_rejects_blank_and_overlong_nicknames() {
    let world = World::new();
    let blank = world.game.farms.register_player("   ").await.unwrap_err();
    assert!(matches!(blank, GameError::InvalidInput { .. }));
    let long = world
        .game
        .farms
        .register_player(&"x".repeat(33))
        .await
        .unwrap_err();
    assert!(matches!(long, GameError::InvalidInput { .. }));
}

#[tokio::test]
async fn crop_matures_exactly_at_its_growth_time() {
    let world = World::new();
    let alice = world.player("alice").await;

    let planted = world.game.plots.plant(alice, 1, RADISH).await.unwrap();
    assert_eq!(planted.plot.status, CropStatus::Growing);
    assert_eq!(planted.plot.remaining_seconds, 3600);
    assert_eq!(planted.inventory.seeds[0].quantity, 9);

    world.advance(3599);
    let farm = world.game.farms.farm_overview(alice).await.unwrap();
    assert_eq!(farm.plots[0].status, CropStatus::Growing);
    assert_eq!(farm.plots[0].remaining_seconds, 1);
    assert!(farm.plots[0].growth_percentage < 100);
    let early = world.game.plots.harvest(alice, 1).await.unwrap_err();
    assert!(matches!(
        early,
        GameError::CropNotMatured {
            plot_index: 1,
            remaining_seconds: 1
        }
    ));

    world.advance(1);
    let farm = world.game.farms.farm_overview(alice).await.unwrap();
    assert_eq!(farm.plots[0].status, CropStatus::Matured);
    assert_eq!(farm.plots[0].growth_percentage, 100);
    assert_eq!(farm.plots[0].remaining_seconds, 0);
}

#[tokio::test]
async fn planting_on_an_occupied_plot_keeps_the_seed() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.game.plots.plant(alice, 2, RADISH).await.unwrap();

    let err = world.game.plots.plant(alice, 2, RADISH).await.unwrap_err();
    assert!(matches!(err, GameError::PlotNotEmpty { plot_index: Some(2) }));
    assert_eq!(world.stock(alice, RADISH, ItemType::Seed).await, 9);
}

#[tokio::test]
async fn planting_checks_catalog_level_and_seeds_without_side_effects() {
    let world = World::new();
    let alice = world.player("alice").await;

    let unknown = world.game.plots.plant(alice, 1, PlantId::new(99)).await.unwrap_err();
    assert!(matches!(unknown, GameError::CropNotFound { .. }));

    let low = world.game.plots.plant(alice, 1, CARROT).await.unwrap_err();
    assert!(matches!(
        low,
        GameError::LevelTooLow {
            required: 2,
            current: 1
        }
    ));

    world.set_exp(alice, 200).await;
    let no_seeds = world.game.plots.plant(alice, 1, CARROT).await.unwrap_err();
    assert!(matches!(no_seeds, GameError::InsufficientSeeds { held: 0, .. }));
    assert_eq!(no_seeds.code(), 2006);

    let plot = world.plot(alice, 1).await;
    assert!(!plot.is_planted());
    assert!(world.logs().await.is_empty());
}

#[tokio::test]
async fn missing_plot_is_reported_by_index() {
    let world = World::new();
    let alice = world.player("alice").await;
    let err = world.game.plots.plant(alice, 42, RADISH).await.unwrap_err();
    assert!(matches!(err, GameError::PlotNotFound { plot_index: 42 }));
}

#[tokio::test]
async fn each_planting_gets_a_fresh_cycle_id() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.grow_radishes(alice, &[1, 2]).await;
    world.game.plots.harvest(alice, 1).await.unwrap();
    world.game.plots.plant(alice, 1, RADISH).await.unwrap();

    let first = world.plot(alice, 2).await.maturity_cycle_id;
    let second = world.plot(alice, 1).await.maturity_cycle_id;
    assert_eq!(first, Some(2));
    assert_eq!(second, Some(3));
}

#[tokio::test]
async fn watering_only_applies_to_thirsty_plots() {
    let world = World::new();
    let alice = world.player("alice").await;

    let err = world.game.plots.water(alice, 1).await.unwrap_err();
    assert!(matches!(err, GameError::NothingToWater));

    world
        .edit_plot(alice, 1, |plot| plot.water_state = WaterState::NeedsWater)
        .await;
    let watered = world.game.plots.water(alice, 1).await.unwrap();
    assert_eq!(watered.plot.water_state, WaterState::Watered.code());
    assert_eq!(watered.user.exp, 10);
}

#[tokio::test]
async fn percentage_fertilizer_halves_growth_time() {
    let mut catalog = Catalog::starter();
    let quick = catalog
        .plants
        .iter_mut()
        .find(|plant| plant.id == RADISH)
        .unwrap();
    quick.growth.total_seconds = 1000;
    quick.growth.stages[0].end_seconds = 1000;
    let world = World::with_catalog(&catalog);
    let alice = world.player("alice").await;
    world.game.plots.plant(alice, 1, RADISH).await.unwrap();

    let response = world
        .game
        .plots
        .fertilize(
            alice,
            1,
            Reduction {
                kind: ReductionKind::Percentage,
                value: 50,
            },
        )
        .await
        .unwrap();
    assert_eq!(response.reduced_seconds, 500);
    assert_eq!(response.plot.remaining_seconds, 500);
    assert_eq!(response.plot.fertilizer_state, 1);
    assert_eq!(response.user.exp, 10);

    world.advance(499);
    assert!(world.game.plots.harvest(alice, 1).await.is_err());
    world.advance(1);
    let harvested = world.game.plots.harvest(alice, 1).await.unwrap();
    assert_eq!(harvested.harvest.gains.item.quantity, 10);
}

#[tokio::test]
async fn fertilizer_needs_a_crop_and_a_sane_amount() {
    let world = World::new();
    let alice = world.player("alice").await;
    let seconds = Reduction {
        kind: ReductionKind::Seconds,
        value: 600,
    };

    let empty = world.game.plots.fertilize(alice, 1, seconds).await.unwrap_err();
    assert!(matches!(empty, GameError::PlotEmpty { plot_index: 1 }));

    world.game.plots.plant(alice, 1, RADISH).await.unwrap();
    let too_much = Reduction {
        kind: ReductionKind::Percentage,
        value: 101,
    };
    let invalid = world.game.plots.fertilize(alice, 1, too_much).await.unwrap_err();
    assert!(matches!(invalid, GameError::InvalidInput { .. }));

    world.game.plots.fertilize(alice, 1, seconds).await.unwrap();
    world.game.plots.fertilize(alice, 1, seconds).await.unwrap();
    assert_eq!(world.plot(alice, 1).await.growth_time_reduced_seconds, 1200);
}

#[tokio::test]
async fn hazards_are_cleared_by_the_owner() {
    let world = World::new();
    let alice = world.player("alice").await;

    let nothing = world.game.plots.remove_weeds(alice, 3).await.unwrap_err();
    assert!(matches!(nothing, GameError::NoHazardToRemove { .. }));
    assert_eq!(nothing.code(), 2009);

    world
        .edit_plot(alice, 3, |plot| {
            plot.has_weeds = true;
            plot.has_pests = true;
        })
        .await;
    let weeded = world.game.plots.remove_weeds(alice, 3).await.unwrap();
    assert!(!weeded.plot.has_weeds);
    assert!(weeded.plot.has_pests);
    let cleared = world.game.plots.remove_pests(alice, 3).await.unwrap();
    assert!(!cleared.plot.has_pests);
    assert_eq!(cleared.user.exp, 20);
}

#[tokio::test]
async fn harvest_pays_out_and_resets_the_plot() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.grow_radishes(alice, &[1]).await;
    let before = world.plot(alice, 1).await;

    let harvested = world.game.plots.harvest(alice, 1).await.unwrap();
    assert_eq!(harvested.harvest.gains.exp, 12);
    assert_eq!(harvested.harvest.gains.item.quantity, 10);
    assert_eq!(harvested.user.exp, 12);
    assert_eq!(harvested.plot.status, CropStatus::Empty);
    assert_eq!(world.stock(alice, RADISH, ItemType::Fruit).await, 10);
    assert_eq!(world.plot(alice, 1).await, before.cleared());

    let logs = world.logs().await;
    let last = logs.last().unwrap();
    assert_eq!(last.action_type, ActionType::Harvest);
    assert_eq!(last.target_model, TargetModel::LandPlot);
    assert_eq!(last.target_id, Some(before.id.into_inner()));
    assert!(last.old_data.is_some());
    assert_eq!(last.created_at, t0() + chrono::Duration::seconds(3600));
}

#[tokio::test]
async fn fully_stolen_crop_cannot_be_harvested() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.grow_radishes(alice, &[1]).await;
    world.edit_plot(alice, 1, |plot| plot.stolen_num = 10).await;

    let err = world.game.plots.harvest(alice, 1).await.unwrap_err();
    assert!(matches!(err, GameError::NothingToHarvest));
    assert!(world.plot(alice, 1).await.is_planted());
}

#[tokio::test]
async fn audit_failure_does_not_undo_gameplay() {
    let world = World::new();
    let alice = world.player("alice").await;
    world.store.set_player_log_failures(true);

    let planted = world.game.plots.plant(alice, 1, RADISH).await.unwrap();
    assert_eq!(planted.plot.status, CropStatus::Growing);
    assert!(world.plot(alice, 1).await.is_planted());
    assert_eq!(world.stock(alice, RADISH, ItemType::Seed).await, 9);
    assert!(world.logs().await.is_empty());
}
