//! Status reconciliation
//!
//! Aggregates stage counters into the status bar summary.

use crate::models::{SparkStage, StageStatus};
use crate::services::spark_analyzer::models::{AppStatus, StatusStore};
use std::sync::Arc;

/// Summarize non-skipped stages, keeping the existing summary when unchanged
pub fn calculate_status(existing: Option<&Arc<StatusStore>>, stages: &[SparkStage]) -> Arc<StatusStore> {
    let mut total_active_tasks = 0u64;
    let mut total_pending_tasks = 0u64;
    let mut total_input_bytes = 0u64;
    let mut total_output_bytes = 0u64;

    for stage in stages.iter().filter(|stage| stage.status != StageStatus::Skipped) {
        total_active_tasks += stage.num_active_tasks;
        total_pending_tasks += stage
            .num_tasks
            .saturating_sub(stage.num_active_tasks)
            .saturating_sub(stage.num_failed_tasks)
            .saturating_sub(stage.num_complete_tasks);
        total_input_bytes += stage.input_bytes;
        total_output_bytes += stage.output_bytes;
    }

    let state = StatusStore {
        total_active_tasks,
        total_pending_tasks,
        total_input_bytes,
        total_output_bytes,
        status: if total_active_tasks == 0 { AppStatus::Idle } else { AppStatus::Working },
    };

    match existing {
        Some(existing) if **existing == state => Arc::clone(existing),
        _ => Arc::new(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: i64, status: StageStatus, tasks: u64, active: u64, complete: u64, failed: u64) -> SparkStage {
        SparkStage {
            stage_id: id,
            status,
            num_tasks: tasks,
            num_active_tasks: active,
            num_complete_tasks: complete,
            num_failed_tasks: failed,
            input_bytes: 1024,
            output_bytes: 512,
        }
    }

    #[test]
    fn test_idle_when_no_active_tasks() {
        let stages = vec![
            stage(0, StageStatus::Complete, 10, 0, 10, 0),
            stage(1, StageStatus::Complete, 4, 0, 4, 0),
        ];
        let status = calculate_status(None, &stages);
        assert_eq!(status.status, AppStatus::Idle);
        assert!(status.is_idle());
        assert_eq!(status.total_input_bytes, 2048);
        assert_eq!(status.total_input_display(), "2.0 KB");
    }

    #[test]
    fn test_pending_and_active_totals() {
        let stages = vec![
            stage(0, StageStatus::Active, 10, 3, 5, 1),
            stage(1, StageStatus::Pending, 8, 0, 0, 0),
        ];
        let status = calculate_status(None, &stages);
        assert_eq!(status.total_active_tasks, 3);
        assert_eq!(status.total_pending_tasks, 1 + 8);
        assert_eq!(status.status, AppStatus::Working);
    }

    #[test]
    fn test_skipped_stages_excluded() {
        let stages = vec![
            stage(0, StageStatus::Skipped, 10, 5, 0, 0),
            stage(1, StageStatus::Complete, 2, 0, 2, 0),
        ];
        let status = calculate_status(None, &stages);
        assert_eq!(status.total_active_tasks, 0);
        assert_eq!(status.total_pending_tasks, 0);
        assert_eq!(status.total_output_bytes, 512);
    }

    #[test]
    fn test_unchanged_status_keeps_reference() {
        let stages = vec![stage(0, StageStatus::Active, 10, 3, 5, 1)];
        let first = calculate_status(None, &stages);
        let second = calculate_status(Some(&first), &stages);
        assert!(Arc::ptr_eq(&first, &second));

        let changed = vec![stage(0, StageStatus::Active, 10, 2, 6, 1)];
        let third = calculate_status(Some(&second), &changed);
        assert!(!Arc::ptr_eq(&second, &third));
    }

    #[test]
    fn test_empty_stage_list_is_idle() {
        let status = calculate_status(None, &[]);
        assert!(status.is_idle());
        assert_eq!(status.total_output_display(), "0 B");
    }
}
