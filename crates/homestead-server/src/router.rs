//! Axum router construction for the game API.
//!
//! Assembles every route into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use homestead_db::FarmStore;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router over `state`.
///
/// Routes are grouped by the engine that serves them. See
/// [`handlers`](crate::handlers) for the full endpoint table.
///
/// CORS allows any origin; the gateway in front of this server is
/// expected to restrict it.
pub fn build_router<S: FarmStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Players and farms
        .route("/api/players", post(handlers::register::<S>))
        .route("/api/me", get(handlers::me::<S>))
        .route("/api/farm", get(handlers::farm::<S>))
        // Own plots
        .route("/api/farm/plots/{plot_index}/plant", post(handlers::plant::<S>))
        .route("/api/farm/plots/{plot_index}/water", post(handlers::water::<S>))
        .route("/api/farm/plots/{plot_index}/weed", post(handlers::weed::<S>))
        .route("/api/farm/plots/{plot_index}/pest", post(handlers::pest::<S>))
        .route(
            "/api/farm/plots/{plot_index}/fertilize",
            post(handlers::fertilize::<S>),
        )
        .route(
            "/api/farm/plots/{plot_index}/harvest",
            post(handlers::harvest::<S>),
        )
        // Batch
        .route("/api/farm/water-all", post(handlers::water_all::<S>))
        .route("/api/farm/weed-all", post(handlers::weed_all::<S>))
        .route("/api/farm/pest-all", post(handlers::pest_all::<S>))
        .route("/api/farm/harvest-all", post(handlers::harvest_all::<S>))
        .route("/api/farm/plant-all", post(handlers::plant_all::<S>))
        // Friendships
        .route("/api/friends", get(handlers::friends::<S>))
        .route(
            "/api/friends/requests",
            get(handlers::pending_requests::<S>).post(handlers::send_request::<S>),
        )
        .route(
            "/api/friends/requests/{requester_id}",
            post(handlers::answer_request::<S>),
        )
        .route(
            "/api/friends/{friend_id}",
            delete(handlers::remove_friend::<S>),
        )
        // Friends' farms
        .route("/api/friends/{friend_id}/farm", get(handlers::friend_farm::<S>))
        .route(
            "/api/friends/{friend_id}/plots/{plot_index}/steal",
            post(handlers::steal::<S>),
        )
        .route(
            "/api/friends/{friend_id}/plots/{plot_index}/sabotage",
            post(handlers::sabotage::<S>),
        )
        .route(
            "/api/friends/{friend_id}/plots/{plot_index}/help",
            post(handlers::help::<S>),
        )
        .route(
            "/api/friends/{friend_id}/steal-all",
            post(handlers::steal_all::<S>),
        )
        .route(
            "/api/friends/{friend_id}/sabotage-all",
            post(handlers::sabotage_all::<S>),
        )
        // Shop
        .route("/api/shop", get(handlers::shop::<S>))
        .route("/api/shop/buy", post(handlers::buy::<S>))
        .route("/api/shop/sell", post(handlers::sell::<S>))
        // Leaderboards
        .route("/api/leaderboards/{kind}", get(handlers::leaderboard::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
