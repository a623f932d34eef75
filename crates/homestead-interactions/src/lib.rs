//! Game engines for the Homestead farming game.
//!
//! Every mutating operation runs in exactly one [`UnitOfWork`]: it locks the
//! rows it reads, checks its preconditions before writing anything, commits,
//! and only then appends to the audit trail. A precondition failure
//! therefore never leaves partial state, and an audit failure never undoes
//! gameplay.
//!
//! # Modules
//!
//! - [`plot`] -- Single-plot actions on the player's own farm
//! - [`batch`] -- Farm-wide tending, harvest, and planting
//! - [`social`] -- Stealing, sabotage, and help on a friend's farm
//! - [`economy`] -- Shop listings, buying, and selling
//! - [`friends`] -- Friend requests and lists
//! - [`leaderboard`] -- Cached leaderboard pages
//! - [`farm`] -- Onboarding and farm and player read paths
//! - [`view`] -- Response view builders
//! - [`audit`] -- Audit trail rows and the tolerant writer
//! - [`error`] -- Error taxonomy and machine codes
//!
//! [`UnitOfWork`]: homestead_db::UnitOfWork

pub mod audit;
pub mod batch;
pub mod economy;
pub mod error;
pub mod farm;
pub mod friends;
pub mod leaderboard;
pub(crate) mod lookup;
pub mod plot;
pub mod social;
pub mod view;

use std::sync::Arc;

use homestead_core::{Clock, GameConfig};
use homestead_db::FarmStore;

pub use batch::BatchInteractionEngine;
pub use economy::EconomyEngine;
pub use error::{ErrorKind, GameError};
pub use farm::FarmService;
pub use friends::FriendsService;
pub use leaderboard::LeaderboardService;
pub use plot::{InteractionEngine, Reduction};
pub use social::SocialInteractionEngine;

/// Every engine and service over one store and one clock.
#[derive(Debug)]
pub struct GameServices<S> {
    /// Single-plot actions.
    pub plots: InteractionEngine<S>,
    /// Farm-wide actions.
    pub batch: BatchInteractionEngine<S>,
    /// Actions on friends' farms.
    pub social: SocialInteractionEngine<S>,
    /// Shop.
    pub economy: EconomyEngine<S>,
    /// Friend requests and lists.
    pub friends: FriendsService<S>,
    /// Leaderboards with their cache.
    pub leaderboards: LeaderboardService<S>,
    /// Onboarding and read paths.
    pub farms: FarmService<S>,
}

impl<S: FarmStore> GameServices<S> {
    /// Wire every engine to `store` and `clock`, taking tunables from
    /// `config`.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &GameConfig) -> Self {
        Self {
            plots: InteractionEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            batch: BatchInteractionEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            social: SocialInteractionEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            economy: EconomyEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            friends: FriendsService::new(Arc::clone(&store), Arc::clone(&clock)),
            leaderboards: LeaderboardService::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                &config.leaderboard,
            ),
            farms: FarmService::new(store, clock, config.onboarding.clone()),
        }
    }
}
