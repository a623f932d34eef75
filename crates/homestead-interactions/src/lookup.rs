//! Row lookups shared by the engines, each mapping absence to the
//! matching [`GameError`].

use std::collections::HashMap;

use homestead_core::leveling;
use homestead_db::UnitOfWork;
use homestead_types::{Farm, FarmId, FriendshipStatus, LandPlot, Plant, PlantId, User, UserId};

use crate::error::GameError;

/// Lock the acting player's row.
pub(crate) async fn require_user<T: UnitOfWork>(
    tx: &mut T,
    user_id: UserId,
) -> Result<User, GameError> {
    tx.lock_user(user_id)
        .await?
        .ok_or(GameError::UserNotFound { user_id })
}

/// The player's farm. Every registered player has one.
pub(crate) async fn require_farm<T: UnitOfWork>(
    tx: &mut T,
    user_id: UserId,
) -> Result<Farm, GameError> {
    tx.farm_of(user_id)
        .await?
        .ok_or(GameError::FarmNotInitialized { user_id })
}

/// Lock one plot of `farm`.
pub(crate) async fn require_plot<T: UnitOfWork>(
    tx: &mut T,
    farm: FarmId,
    plot_index: i32,
) -> Result<LandPlot, GameError> {
    tx.lock_plot(farm, plot_index)
        .await?
        .ok_or(GameError::PlotNotFound { plot_index })
}

/// A crop a player asked for by id.
pub(crate) async fn require_plant<T: UnitOfWork>(
    tx: &mut T,
    plant_id: PlantId,
) -> Result<Plant, GameError> {
    tx.plant(plant_id)
        .await?
        .ok_or(GameError::CropNotFound { plant_id })
}

/// The crop planted on `plot`, or `None` for an empty plot. A planted crop
/// missing from the catalog is an internal error.
pub(crate) async fn planted_crop<T: UnitOfWork>(
    tx: &mut T,
    plot: &LandPlot,
) -> Result<Option<Plant>, GameError> {
    let Some(plant_id) = plot.plant_id else {
        return Ok(None);
    };
    tx.plant(plant_id)
        .await?
        .map(Some)
        .ok_or(GameError::CatalogMissing { plant_id })
}

/// The whole crop catalog keyed by id.
pub(crate) async fn crop_catalog<T: UnitOfWork>(
    tx: &mut T,
) -> Result<HashMap<PlantId, Plant>, GameError> {
    Ok(tx.plants().await?.into_iter().map(|p| (p.id, p)).collect())
}

/// Catalog entry for a planted plot out of a preloaded catalog.
pub(crate) fn crop_of<'a>(
    catalog: &'a HashMap<PlantId, Plant>,
    plant_id: PlantId,
) -> Result<&'a Plant, GameError> {
    catalog
        .get(&plant_id)
        .ok_or(GameError::CatalogMissing { plant_id })
}

/// Reject players below the crop's required level.
pub(crate) fn ensure_level(user: &User, plant: &Plant) -> Result<(), GameError> {
    let current = leveling::level_for_exp(user.exp);
    if current < plant.required_level {
        return Err(GameError::LevelTooLow {
            required: plant.required_level,
            current,
        });
    }
    Ok(())
}

/// Add experience to a player, saturating at the maximum.
pub(crate) const fn grant_exp(user: &mut User, exp: u64) {
    user.exp = user.exp.saturating_add(exp);
}

/// Verify `user_id` may act on `friend_id`'s farm and return that farm.
///
/// Self-interaction is rejected first. Friendship must be accepted in
/// both directions.
pub(crate) async fn friend_farm<T: UnitOfWork>(
    tx: &mut T,
    user_id: UserId,
    friend_id: UserId,
) -> Result<Farm, GameError> {
    if user_id == friend_id {
        return Err(GameError::SelfInteraction);
    }
    if tx.user(friend_id).await?.is_none() {
        return Err(GameError::FriendNotFound { friend_id });
    }
    let outgoing = tx.friendship(user_id, friend_id).await?;
    let incoming = tx.friendship(friend_id, user_id).await?;
    let accepted = |edge: Option<homestead_types::Friendship>| {
        edge.is_some_and(|e| e.status == FriendshipStatus::Accepted)
    };
    if !accepted(outgoing) || !accepted(incoming) {
        return Err(GameError::NotFriends { friend_id });
    }
    tx.farm_of(friend_id)
        .await?
        .ok_or(GameError::FriendNotFound { friend_id })
}

/// Convert a collection length to the `u32` counts used in reports.
pub(crate) fn count_of(len: usize) -> Result<u32, GameError> {
    u32::try_from(len).ok().ok_or(GameError::Overflow { context: "plot count" })
}
