//! Leaderboards.
//!
//! Wealth and level boards rank player rows directly. The count boards
//! rank players by how many per-plot audit rows they have for the board's
//! actions, so a batch action counts once per plot and never for its
//! farm summary row.
//!
//! Pages are cached by `(kind, limit, offset)` in a [`TtlCache`] created
//! with the service. Until an entry expires, readers may see a page that
//! lags the audit trail.

use std::sync::Arc;

use chrono::Duration;

use homestead_core::config::LeaderboardConfig;
use homestead_core::{Clock, TtlCache, leveling};
use homestead_db::{FarmStore, UnitOfWork, UserRanking};
use homestead_types::{LeaderboardEntry, LeaderboardKind, LeaderboardView, User, UserId};

use crate::error::GameError;

/// Cached leaderboard pages.
#[derive(Debug)]
pub struct LeaderboardService<S> {
    store: Arc<S>,
    cache: TtlCache<String, LeaderboardView>,
    ttl: Duration,
    max_limit: u32,
    default_limit: u32,
}

impl<S: FarmStore> LeaderboardService<S> {
    /// Create a service with an empty cache.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &LeaderboardConfig) -> Self {
        Self {
            store,
            cache: TtlCache::new(clock),
            ttl: Duration::seconds(i64::from(config.cache_ttl_seconds)),
            max_limit: config.max_limit,
            default_limit: config.default_limit,
        }
    }

    /// One page of a board. `limit` defaults to the configured page size and
    /// may not exceed the configured maximum.
    pub async fn get(
        &self,
        kind: LeaderboardKind,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<LeaderboardView, GameError> {
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 || limit > self.max_limit {
            return Err(GameError::InvalidInput {
                reason: format!("limit must be between 1 and {}", self.max_limit),
            });
        }
        let key = format!("{}-{limit}-{offset}", kind.as_str());
        self.cache
            .get_or_compute(key, self.ttl, || self.compute(kind, limit, offset))
            .await
    }

    async fn compute(
        &self,
        kind: LeaderboardKind,
        limit: u32,
        offset: u32,
    ) -> Result<LeaderboardView, GameError> {
        let rows: Vec<(User, String)> = match kind.counted_actions() {
            None => {
                let ranking = if kind == LeaderboardKind::Wealth {
                    UserRanking::Gold
                } else {
                    UserRanking::Exp
                };
                self.store
                    .ranked_users(ranking, limit, offset)
                    .await?
                    .into_iter()
                    .map(|user| {
                        let value = match ranking {
                            UserRanking::Gold => user.gold.to_string(),
                            UserRanking::Exp => user.exp.to_string(),
                        };
                        (user, value)
                    })
                    .collect()
            }
            Some(actions) => {
                let counts = self.store.action_counts(actions, limit, offset).await?;
                let ids: Vec<UserId> = counts.iter().map(|c| c.user_id).collect();
                let mut tx = self.store.begin().await?;
                let users = tx.users(&ids).await?;
                drop(tx);
                counts
                    .iter()
                    .filter_map(|count| {
                        let user = users.iter().find(|u| u.id == count.user_id)?;
                        Some((user.clone(), count.count.to_string()))
                    })
                    .collect()
            }
        };

        let mut rank = offset;
        let entries = rows
            .into_iter()
            .map(|(user, value)| {
                rank = rank.saturating_add(1);
                LeaderboardEntry {
                    rank,
                    user_id: user.id,
                    level: leveling::level_for_exp(user.exp),
                    nick_name: user.nick_name,
                    value,
                }
            })
            .collect();
        tracing::debug!(board = kind.as_str(), limit, offset, "Leaderboard computed");
        Ok(LeaderboardView { kind, entries })
    }
}
