//! Player audit trail.
//!
//! Audit rows are written after the gameplay unit of work has committed,
//! through [`FarmStore::append_player_logs`]. A failed write is reported on
//! the operational log and otherwise ignored: the committed game state
//! stands.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use homestead_db::FarmStore;
use homestead_types::{ActionType, FarmId, LandPlot, PlayerLogEntry, TargetModel, UserId};

/// Write `entries` to the audit trail, logging (not returning) failures.
pub async fn record<S: FarmStore>(store: &S, entries: &[PlayerLogEntry]) {
    if entries.is_empty() {
        return;
    }
    match store.append_player_logs(entries).await {
        Ok(()) => tracing::debug!(count = entries.len(), "Audit rows written"),
        Err(err) => tracing::error!(
            count = entries.len(),
            %err,
            "Failed to write audit rows; gameplay changes are kept"
        ),
    }
}

/// Audit row for one plot, with before and after snapshots.
pub fn plot_entry(
    user_id: UserId,
    action_type: ActionType,
    before: &LandPlot,
    after: &LandPlot,
    param: String,
    at: DateTime<Utc>,
) -> PlayerLogEntry {
    PlayerLogEntry {
        id: Uuid::now_v7(),
        user_id,
        action_type,
        target_model: TargetModel::LandPlot,
        target_id: Some(after.id.into_inner()),
        old_data: serde_json::to_value(before).ok(),
        new_data: serde_json::to_value(after).ok(),
        param,
        created_at: at,
    }
}

/// Farm-level summary row written once per batch action.
pub fn farm_entry(
    user_id: UserId,
    action_type: ActionType,
    farm_id: FarmId,
    summary: serde_json::Value,
    param: String,
    at: DateTime<Utc>,
) -> PlayerLogEntry {
    PlayerLogEntry {
        id: Uuid::now_v7(),
        user_id,
        action_type,
        target_model: TargetModel::Farm,
        target_id: Some(farm_id.into_inner()),
        old_data: None,
        new_data: Some(summary),
        param,
        created_at: at,
    }
}

#[cfg(test)]
mod tests {
    use homestead_db::MemoryFarmStore;
    use homestead_types::{PlantId, PlotId};

    use super::*;

    fn plots() -> (LandPlot, LandPlot) {
        let before = LandPlot::empty(PlotId::new(7), FarmId::new(2), 1);
        let after = before.planted(PlantId::new(1), DateTime::<Utc>::UNIX_EPOCH, 1);
        (before, after)
    }

    #[test]
    fn plot_entry_snapshots_both_sides() {
        let (before, after) = plots();
        let entry = plot_entry(
            UserId::new(1),
            ActionType::Plant,
            &before,
            &after,
            "planted".to_owned(),
            Utc::now(),
        );
        assert_eq!(entry.target_model, TargetModel::LandPlot);
        assert_eq!(entry.target_id, Some(7));
        let planted = entry.new_data.as_ref().and_then(|v| v.get("plantId")).cloned();
        assert_eq!(planted, Some(serde_json::json!(1)));
        let was = entry.old_data.as_ref().and_then(|v| v.get("plantId")).cloned();
        assert_eq!(was, Some(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn failed_writes_are_swallowed() {
        let store = MemoryFarmStore::new();
        store.set_player_log_failures(true);
        let (before, after) = plots();
        let entry = plot_entry(UserId::new(1), ActionType::Plant, &before, &after, String::new(), Utc::now());
        record(&store, &[entry]).await;
        assert!(store.player_logs().await.is_empty());
    }
}
