//! Data layer for the Homestead farming game.
//!
//! The game engines never talk to a database directly. They go through the
//! [`FarmStore`] and [`UnitOfWork`] ports defined in [`store`], which have
//! two implementations:
//!
//! ```text
//! Engine
//!     |
//!     +-- FarmStore::begin ------> UnitOfWork (locked reads, writes, commit)
//!     |                              |-- PgUnitOfWork     (sqlx transaction)
//!     |                              +-- MemoryUnitOfWork (serialized copy)
//!     |
//!     +-- append_player_logs ----> audit trail, outside the unit of work
//! ```
//!
//! # Modules
//!
//! - [`store`] -- Store ports and their transaction semantics
//! - [`postgres`] -- Connecting, migrating, and closing the `PostgreSQL` store
//! - [`pg_store`] -- `PostgreSQL` store, catalog seeding, leaderboard queries
//! - [`pg_unit_of_work`] -- One `PostgreSQL` transaction
//! - [`memory`] -- In-memory store for tests and single-process runs
//! - [`catalog`] -- Starter crops and props shared by both backends
//! - [`error`] -- Shared error types

pub mod catalog;
pub(crate) mod codec;
pub mod error;
pub mod memory;
pub mod pg_store;
pub mod pg_unit_of_work;
pub mod postgres;
pub(crate) mod rows;
pub mod store;

// Re-export primary types for convenience.
pub use catalog::Catalog;
pub use error::DbError;
pub use memory::{MemoryFarmStore, MemoryUnitOfWork};
pub use pg_store::PgFarmStore;
pub use pg_unit_of_work::PgUnitOfWork;
pub use store::{ActionCount, FarmStore, UnitOfWork, UserRanking};
