//! Shared application state for the game API.

use std::sync::Arc;

use homestead_core::{Clock, GameConfig};
use homestead_db::FarmStore;
use homestead_interactions::GameServices;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. Every
/// handler reaches the engines through `game`.
#[derive(Debug)]
pub struct AppState<S> {
    /// All engines over the configured store.
    pub game: GameServices<S>,
}

impl<S: FarmStore> AppState<S> {
    /// Wire the engines to `store` and `clock`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &GameConfig) -> Self {
        Self {
            game: GameServices::new(store, clock, config),
        }
    }
}
