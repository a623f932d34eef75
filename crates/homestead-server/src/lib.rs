//! HTTP API server for the Homestead farming game.
//!
//! This crate exposes the game engines over a JSON REST API:
//!
//! - **Own farm** endpoints for planting, tending, fertilizing, and
//!   harvesting, one plot at a time or farm-wide
//! - **Social** endpoints for stealing from, sabotaging, and helping
//!   friends' farms
//! - **Shop**, **friend request**, and **leaderboard** endpoints
//!
//! # Architecture
//!
//! Handlers are generic over the [`FarmStore`](homestead_db::FarmStore)
//! backend, so the same router serves `PostgreSQL` in production and the
//! in-memory store in tests. Callers are identified by the `x-user-id`
//! header set by the upstream gateway; see [`extract`].

pub mod error;
pub mod extract;
pub mod handlers;
pub mod requests;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use extract::{CurrentUser, USER_ID_HEADER};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
