//! Type-safe identifier wrappers around `i64` database keys.
//!
//! Every persisted entity in the game has a strongly-typed ID so that a
//! plot id can never be passed where a user id is expected. Identifiers are
//! allocated by the store (`BIGSERIAL` in `PostgreSQL`, a counter in the
//! in-memory store); the wrappers never mint values on their own.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `i64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw key loaded from storage.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the inner `i64` value.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player.
    UserId
}

define_id! {
    /// Unique identifier for a farm. Each player owns exactly one.
    FarmId
}

define_id! {
    /// Unique identifier for a land plot across all farms.
    PlotId
}

define_id! {
    /// Unique identifier for a crop definition in the catalog.
    PlantId
}

define_id! {
    /// Unique identifier for a shop prop in the catalog.
    PropId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&PlotId::new(42));
        assert_eq!(json.ok().as_deref(), Some("42"));
    }

    #[test]
    fn ids_round_trip_through_i64() {
        let id = UserId::from(7_i64);
        assert_eq!(i64::from(id), 7);
        assert_eq!(id.into_inner(), 7);
        assert_eq!(id.to_string(), "7");
    }
}
