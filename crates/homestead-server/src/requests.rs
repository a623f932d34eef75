//! Request bodies, path parameters, and query strings.
//!
//! Range checks live here so the engines only ever see well-formed input.
//! Game-state checks (does the plot exist, is the crop ripe) stay in the
//! engines.

use serde::Deserialize;
use validator::Validate;

use homestead_interactions::Reduction;
use homestead_types::{FriendshipStatus, Hazard, ItemType, ReductionKind};

/// Longest flat fertilizer reduction, in seconds (one week).
pub const MAX_REDUCTION_SECONDS: u32 = 604_800;

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `/farm/plots/{plot_index}/...`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PlotPath {
    /// One-based plot index on the caller's farm.
    #[validate(range(min = 1, max = 100))]
    pub plot_index: i32,
}

/// `/friends/{friend_id}/...`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct FriendPath {
    /// The friend's player id.
    #[validate(range(min = 1))]
    pub friend_id: i64,
}

/// `/friends/{friend_id}/plots/{plot_index}/...`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct FriendPlotPath {
    /// The friend's player id.
    #[validate(range(min = 1))]
    pub friend_id: i64,
    /// One-based plot index on the friend's farm.
    #[validate(range(min = 1, max = 100))]
    pub plot_index: i32,
}

/// `/friends/requests/{requester_id}`
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct RequesterPath {
    /// Who sent the request being answered.
    #[validate(range(min = 1))]
    pub requester_id: i64,
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Body of `POST /api/players`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name, 1 to 32 characters.
    #[validate(length(min = 1, max = 32))]
    pub nick_name: String,
}

/// Body of the plant and plant-all endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlantRequest {
    /// Crop to plant.
    #[validate(range(min = 1))]
    pub plant_id: i64,
}

/// Body of the fertilize endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_reduction"))]
pub struct FertilizeRequest {
    /// `PERCENTAGE` or `SECONDS`.
    #[serde(rename = "type")]
    pub kind: ReductionKind,
    /// Percent or seconds, positive.
    #[validate(range(min = 1))]
    pub value: u32,
}

impl From<FertilizeRequest> for Reduction {
    fn from(request: FertilizeRequest) -> Self {
        Self {
            kind: request.kind,
            value: request.value,
        }
    }
}

fn validate_reduction(request: &FertilizeRequest) -> Result<(), validator::ValidationError> {
    let max = match request.kind {
        ReductionKind::Percentage => 100,
        ReductionKind::Seconds => MAX_REDUCTION_SECONDS,
    };
    if request.value > max {
        return Err(validator::ValidationError::new("reduction_out_of_range"));
    }
    Ok(())
}

/// Body of the sabotage and help endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct HazardRequest {
    /// `WEED` or `PEST`.
    pub hazard: Hazard,
}

/// Body of the buy and sell endpoints.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    /// `SEED`, `FRUIT`, or `PROP`.
    pub item_type: ItemType,
    /// Plant id for seeds and fruit, prop id for props.
    #[validate(range(min = 1))]
    pub item_id: i64,
    /// Units to trade, at most 999.
    #[validate(range(min = 1, max = 999))]
    pub quantity: u32,
}

/// Body of `POST /api/friends/requests`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequestBody {
    /// Player to befriend.
    #[validate(range(min = 1))]
    pub addressee_id: i64,
}

/// Body of `POST /api/friends/requests/{requester_id}`.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct FriendAnswerBody {
    /// `ACCEPTED` or `BLOCKED`.
    pub status: FriendshipStatus,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Query string of the leaderboard endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageQuery {
    /// Page size; the service applies its default when absent.
    pub limit: Option<u32>,
    /// Rows to skip, at most 10 000.
    #[serde(default)]
    #[validate(range(max = 10_000))]
    pub offset: u32,
}
