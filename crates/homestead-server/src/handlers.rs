//! REST endpoint handlers for the game API.
//!
//! Handlers only translate HTTP into engine calls: they pull the caller's
//! id from [`CurrentUser`], take validated input from the extractors, and
//! return the engine's payload as JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness check |
//! | `POST` | `/api/players` | Register a player |
//! | `GET` | `/api/me` | Player and inventory |
//! | `GET` | `/api/farm` | Own farm |
//! | `POST` | `/api/farm/plots/{plot_index}/{action}` | Plant, water, weed, pest, fertilize, harvest |
//! | `POST` | `/api/farm/{action}-all` | Batch water, weed, pest, harvest, plant |
//! | `GET` | `/api/friends/{friend_id}/farm` | A friend's farm |
//! | `POST` | `/api/friends/{friend_id}/plots/{plot_index}/{action}` | Steal, sabotage, help |
//! | `POST` | `/api/friends/{friend_id}/{action}-all` | Steal-all, sabotage-all |
//! | `GET` | `/api/friends` | Friend list |
//! | `DELETE` | `/api/friends/{friend_id}` | Remove a friend |
//! | `GET`/`POST` | `/api/friends/requests` | Pending requests / send one |
//! | `POST` | `/api/friends/requests/{requester_id}` | Accept or block |
//! | `GET` | `/api/shop` | Shop listings |
//! | `POST` | `/api/shop/buy`, `/api/shop/sell` | Trade |
//! | `GET` | `/api/leaderboards/{kind}` | Leaderboard page |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use validator::Validate;

use homestead_db::FarmStore;
use homestead_types::{
    ClearAllResponse, FarmView, FertilizeResponse, FriendView, Friendship,
    HarvestAllResponse, HarvestResponse, HelpResponse, LeaderboardKind, LeaderboardView,
    PendingRequestView, PlantAllResponse, PlantId, PlantResponse, PlayerStateView,
    RegistrationView, SabotageAllResponse, SabotageResponse, ShopListings, StealAllResponse,
    StealResponse, TendResponse, UserId, WaterAllResponse,
};

use crate::error::ApiError;
use crate::extract::{CurrentUser, ValidJson, ValidPath};
use crate::requests::{
    FertilizeRequest, FriendAnswerBody, FriendPath, FriendPlotPath, FriendRequestBody,
    HazardRequest, PageQuery, PlantRequest, PlotPath, RegisterRequest, RequesterPath,
    TradeRequest,
};
use crate::state::AppState;

/// Shorthand for the state extractor.
type AppStateExt<S> = State<Arc<AppState<S>>>;

/// Shorthand for handler results.
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Liveness check.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Players and farms
// ---------------------------------------------------------------------------

/// Register a new player with a starter farm.
pub async fn register<S: FarmStore>(
    State(state): AppStateExt<S>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationView>), ApiError> {
    let registration = state.game.farms.register_player(&body.nick_name).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// The caller and their inventory.
pub async fn me<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<PlayerStateView> {
    Ok(Json(state.game.farms.player_state(user).await?))
}

/// The caller's farm.
pub async fn farm<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<FarmView> {
    Ok(Json(state.game.farms.farm_overview(user).await?))
}

/// A friend's farm.
pub async fn friend_farm<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPath>,
) -> ApiResult<FarmView> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(state.game.farms.friend_farm_overview(user, friend).await?))
}

// ---------------------------------------------------------------------------
// Own plots
// ---------------------------------------------------------------------------

/// Plant a seed.
pub async fn plant<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
    ValidJson(body): ValidJson<PlantRequest>,
) -> ApiResult<PlantResponse> {
    let plant_id = PlantId::new(body.plant_id);
    Ok(Json(state.game.plots.plant(user, path.plot_index, plant_id).await?))
}

/// Water a plot.
pub async fn water<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
) -> ApiResult<TendResponse> {
    Ok(Json(state.game.plots.water(user, path.plot_index).await?))
}

/// Pull weeds from a plot.
pub async fn weed<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
) -> ApiResult<TendResponse> {
    Ok(Json(state.game.plots.remove_weeds(user, path.plot_index).await?))
}

/// Clear pests from a plot.
pub async fn pest<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
) -> ApiResult<TendResponse> {
    Ok(Json(state.game.plots.remove_pests(user, path.plot_index).await?))
}

/// Fertilize a growing crop.
pub async fn fertilize<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
    ValidJson(body): ValidJson<FertilizeRequest>,
) -> ApiResult<FertilizeResponse> {
    Ok(Json(
        state
            .game
            .plots
            .fertilize(user, path.plot_index, body.into())
            .await?,
    ))
}

/// Harvest a matured crop.
pub async fn harvest<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<PlotPath>,
) -> ApiResult<HarvestResponse> {
    Ok(Json(state.game.plots.harvest(user, path.plot_index).await?))
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Water every thirsty plot.
pub async fn water_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<WaterAllResponse> {
    Ok(Json(state.game.batch.water_all(user).await?))
}

/// Pull weeds everywhere.
pub async fn weed_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ClearAllResponse> {
    Ok(Json(state.game.batch.weed_all(user).await?))
}

/// Clear pests everywhere.
pub async fn pest_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ClearAllResponse> {
    Ok(Json(state.game.batch.pest_all(user).await?))
}

/// Harvest every matured plot.
pub async fn harvest_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<HarvestAllResponse> {
    Ok(Json(state.game.batch.harvest_all(user).await?))
}

/// Plant one crop on every empty plot.
pub async fn plant_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidJson(body): ValidJson<PlantRequest>,
) -> ApiResult<PlantAllResponse> {
    let plant_id = PlantId::new(body.plant_id);
    Ok(Json(state.game.batch.plant_all(user, plant_id).await?))
}

// ---------------------------------------------------------------------------
// Friends' plots
// ---------------------------------------------------------------------------

/// Steal from one of a friend's plots.
pub async fn steal<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPlotPath>,
) -> ApiResult<StealResponse> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(state.game.social.steal(user, friend, path.plot_index).await?))
}

/// Steal from every ripe plot of a friend.
pub async fn steal_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPath>,
) -> ApiResult<StealAllResponse> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(state.game.social.steal_all(user, friend).await?))
}

/// Place a weed or pest on a friend's plot.
pub async fn sabotage<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPlotPath>,
    ValidJson(body): ValidJson<HazardRequest>,
) -> ApiResult<SabotageResponse> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(
        state
            .game
            .social
            .sabotage(user, friend, path.plot_index, body.hazard)
            .await?,
    ))
}

/// Place a weed or pest on every eligible plot of a friend.
pub async fn sabotage_all<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPath>,
    ValidJson(body): ValidJson<HazardRequest>,
) -> ApiResult<SabotageAllResponse> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(
        state.game.social.sabotage_all(user, friend, body.hazard).await?,
    ))
}

/// Clear a weed or pest from a friend's plot.
pub async fn help<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPlotPath>,
    ValidJson(body): ValidJson<HazardRequest>,
) -> ApiResult<HelpResponse> {
    let friend = UserId::new(path.friend_id);
    Ok(Json(
        state
            .game
            .social
            .help(user, friend, path.plot_index, body.hazard)
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Friendships
// ---------------------------------------------------------------------------

/// The caller's friends.
pub async fn friends<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<FriendView>> {
    Ok(Json(state.game.friends.list_friends(user).await?))
}

/// Requests waiting for the caller.
pub async fn pending_requests<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<PendingRequestView>> {
    Ok(Json(state.game.friends.list_pending(user).await?))
}

/// Send a friend request.
pub async fn send_request<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidJson(body): ValidJson<FriendRequestBody>,
) -> Result<(StatusCode, Json<Friendship>), ApiError> {
    let addressee = UserId::new(body.addressee_id);
    let edge = state.game.friends.send_request(user, addressee).await?;
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Accept or block a pending request.
pub async fn answer_request<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<RequesterPath>,
    ValidJson(body): ValidJson<FriendAnswerBody>,
) -> ApiResult<Friendship> {
    let requester = UserId::new(path.requester_id);
    Ok(Json(
        state.game.friends.respond(user, requester, body.status).await?,
    ))
}

/// End a friendship.
pub async fn remove_friend<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidPath(path): ValidPath<FriendPath>,
) -> Result<StatusCode, ApiError> {
    let friend = UserId::new(path.friend_id);
    state.game.friends.remove_friend(user, friend).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Shop
// ---------------------------------------------------------------------------

/// Everything for sale.
pub async fn shop<S: FarmStore>(State(state): AppStateExt<S>) -> ApiResult<ShopListings> {
    Ok(Json(state.game.economy.shop_listings().await?))
}

/// Buy seeds or props.
pub async fn buy<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidJson(body): ValidJson<TradeRequest>,
) -> ApiResult<PlayerStateView> {
    Ok(Json(
        state
            .game
            .economy
            .buy(user, body.item_type, body.item_id, body.quantity)
            .await?,
    ))
}

/// Sell seeds, fruit, or props.
pub async fn sell<S: FarmStore>(
    State(state): AppStateExt<S>,
    CurrentUser(user): CurrentUser,
    ValidJson(body): ValidJson<TradeRequest>,
) -> ApiResult<PlayerStateView> {
    Ok(Json(
        state
            .game
            .economy
            .sell(user, body.item_type, body.item_id, body.quantity)
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

/// One page of a leaderboard.
pub async fn leaderboard<S: FarmStore>(
    State(state): AppStateExt<S>,
    kind: Result<Path<LeaderboardKind>, PathRejection>,
    page: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<LeaderboardView> {
    let Path(kind) = kind.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    let Query(page) = page.map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))?;
    page.validate().map_err(|errors| ApiError::InvalidRequest(errors.to_string()))?;
    Ok(Json(
        state
            .game
            .leaderboards
            .get(kind, page.limit, page.offset)
            .await?,
    ))
}
