//! Shared type definitions for the Homestead farming game.
//!
//! This crate is the single source of truth for the data model used across
//! the Homestead workspace. Types defined here flow downstream to
//! `TypeScript` via `ts-rs` for the web client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (plot state, items, actions, social)
//! - [`structs`] -- Catalog entries, farm state, and log rows
//! - [`views`] -- Response payloads returned to the HTTP boundary

pub mod enums;
pub mod ids;
pub mod structs;
pub mod views;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionType, CropStatus, FriendshipStatus, GrowthStageName, Hazard, ItemType, LeaderboardKind,
    PropType, ReductionKind, ShopTransactionKind, TargetModel, WaterState,
};
pub use ids::{FarmId, PlantId, PlotId, PropId, UserId};
pub use structs::{
    CropEconomics, CropRevenue, CropRewards, CropStock, DailyCounterKey, Farm, Friendship,
    GrowthCurve, GrowthStage, LandPlot, Plant, PlayerLogEntry, Prop, PropStock, SeedCost,
    ShopLogEntry, User,
};
pub use views::{
    ClearAllResponse, ClearAllResult, FarmView, FertilizeResponse, FriendView, HarvestAllResponse,
    HarvestDetail, HarvestGains, HarvestReport, HarvestResponse, HarvestSummary, HarvestTotals,
    HelpResponse, InventoryView, ItemView, LeaderboardEntry, LeaderboardView, PendingRequestView,
    PlantAllResponse, PlantReport, PlantResponse, PlayerStateView, PlotPlantView, PlotView,
    RegistrationView, SabotageAllResponse, SabotageResponse, ShopListingItem, ShopListings,
    StealAllResponse, StealDetail, StealReport, StealResponse, StealSummary, StealTotals,
    TendResponse, UserView, WaterAllResponse, WaterAllResult,
};

#[cfg(test)]
mod tests {
    //! Binding generation for the web client.

    #[test]
    fn export_bindings() {
        // ts-rs writes TypeScript bindings for every #[ts(export)] type
        // reachable from the roots below into `bindings/`.
        use ts_rs::TS;

        let _ = crate::views::FarmView::export_all();
        let _ = crate::views::RegistrationView::export_all();
        let _ = crate::views::PlantResponse::export_all();
        let _ = crate::views::TendResponse::export_all();
        let _ = crate::views::FertilizeResponse::export_all();
        let _ = crate::views::HarvestResponse::export_all();
        let _ = crate::views::WaterAllResponse::export_all();
        let _ = crate::views::ClearAllResponse::export_all();
        let _ = crate::views::HarvestAllResponse::export_all();
        let _ = crate::views::PlantAllResponse::export_all();
        let _ = crate::views::StealResponse::export_all();
        let _ = crate::views::StealAllResponse::export_all();
        let _ = crate::views::SabotageResponse::export_all();
        let _ = crate::views::SabotageAllResponse::export_all();
        let _ = crate::views::HelpResponse::export_all();
        let _ = crate::views::PendingRequestView::export_all();
        let _ = crate::views::ShopListings::export_all();
        let _ = crate::views::LeaderboardView::export_all();
        let _ = crate::structs::Plant::export_all();
        let _ = crate::structs::Prop::export_all();
        let _ = crate::structs::PlayerLogEntry::export_all();
        let _ = crate::structs::LandPlot::export_all();
        let _ = crate::enums::ReductionKind::export_all();
        let _ = crate::enums::Hazard::export_all();
    }
}
