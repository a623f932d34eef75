//! Pure game logic for the Homestead farming game.
//!
//! Nothing in this crate performs I/O apart from reading the configuration
//! file. Crop status is derived lazily from stored timestamps, so no
//! background job ever has to tick plots forward.
//!
//! # Modules
//!
//! - [`growth`] -- The growth clock: plot status, stage, and remaining time
//!   from planting facts and a crop's growth curve.
//! - [`rules`] -- Game-rule constants and the arithmetic built on them
//!   (experience grants, steal amounts, fertilizer reductions, quotas).
//! - [`leveling`] -- Level derivation from cumulative experience.
//! - [`clock`] -- [`Clock`] trait with a system and a manual implementation.
//! - [`cache`] -- Time-bounded get-or-compute cache used by leaderboards.
//! - [`config`] -- Configuration loading from `homestead.yaml`.
//!
//! [`Clock`]: clock::Clock

pub mod cache;
pub mod clock;
pub mod config;
pub mod growth;
pub mod leveling;
pub mod rules;

pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig, StoreBackend};
pub use growth::{GrowthStatus, calculate_status};
pub use leveling::{LevelProgress, exp_to_next_level, level_for_exp};
