//! Learning task progress: status transitions and the per-user overview.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{LearningTask, TaskStatus};

/// Status implied by a clamped progress value.
pub fn status_for(progress: u8) -> TaskStatus {
    match progress {
        0 => TaskStatus::NotStarted,
        100.. => TaskStatus::Completed,
        _ => TaskStatus::InProgress,
    }
}

/// Sets progress (clamped to 0 – 100, rounded) and derives the status.
/// Completed tasks are terminal.
pub fn apply_progress(
    task: &mut LearningTask,
    progress: f64,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if task.status == TaskStatus::Completed {
        return Err(AppError::InvalidRequest(format!(
            "task {} is already completed",
            task.id
        )));
    }
    if !progress.is_finite() {
        return Err(AppError::InvalidRequest(
            "progress must be a number".to_string(),
        ));
    }

    let clamped = progress.round().clamp(0.0, 100.0) as u8;
    task.progress = clamped;
    task.status = status_for(clamped);
    task.updated_at = now;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressOverview {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub not_started_tasks: usize,
    pub total_hours: u32,
    /// In-progress tasks contribute their hours proportionally.
    pub completed_hours: f64,
    pub overall_progress: f64,
}

pub fn overview(tasks: &[LearningTask]) -> ProgressOverview {
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
    let total_hours: u32 = tasks.iter().map(|t| t.estimated_hours).sum();
    let completed_hours: f64 = tasks
        .iter()
        .map(|t| t.estimated_hours as f64 * t.progress.min(100) as f64 / 100.0)
        .sum();

    let overall_progress = if total_hours > 0 {
        (completed_hours / total_hours as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    ProgressOverview {
        total_tasks: tasks.len(),
        completed_tasks: count(TaskStatus::Completed),
        in_progress_tasks: count(TaskStatus::InProgress),
        not_started_tasks: count(TaskStatus::NotStarted),
        total_hours,
        completed_hours: (completed_hours * 10.0).round() / 10.0,
        overall_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Proficiency, TaskPriority};
    use uuid::Uuid;

    fn task(hours: u32) -> LearningTask {
        let now = Utc::now();
        LearningTask {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            path_id: Uuid::new_v4(),
            skill_target: "Go".to_string(),
            target_proficiency: Proficiency::new(70.0),
            current_proficiency: Proficiency::new(20.0),
            estimated_hours: hours,
            priority: TaskPriority::Chosen,
            order_index: 0,
            status: TaskStatus::NotStarted,
            progress: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_progress_drives_status() {
        let mut t = task(10);
        apply_progress(&mut t, 40.0, Utc::now()).unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);

        apply_progress(&mut t, 0.0, Utc::now()).unwrap();
        assert_eq!(t.status, TaskStatus::NotStarted);

        apply_progress(&mut t, 100.0, Utc::now()).unwrap();
        assert_eq!(t.status, TaskStatus::Completed);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut t = task(10);
        apply_progress(&mut t, 250.0, Utc::now()).unwrap();
        assert_eq!(t.progress, 100);
        assert_eq!(t.status, TaskStatus::Completed);

        let mut t = task(10);
        apply_progress(&mut t, -20.0, Utc::now()).unwrap();
        assert_eq!(t.progress, 0);
        assert_eq!(t.status, TaskStatus::NotStarted);
    }

    #[test]
    fn test_completed_task_rejects_updates() {
        let mut t = task(10);
        apply_progress(&mut t, 100.0, Utc::now()).unwrap();
        let err = apply_progress(&mut t, 50.0, Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(t.progress, 100);
    }

    #[test]
    fn test_non_finite_progress_is_rejected() {
        let mut t = task(10);
        assert!(apply_progress(&mut t, f64::NAN, Utc::now()).is_err());
    }

    #[test]
    fn test_overview_counts_partial_hours() {
        let mut done = task(10);
        done.progress = 100;
        done.status = TaskStatus::Completed;
        let mut halfway = task(20);
        halfway.progress = 50;
        halfway.status = TaskStatus::InProgress;
        let fresh = task(10);

        let summary = overview(&[done, halfway, fresh]);
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.in_progress_tasks, 1);
        assert_eq!(summary.not_started_tasks, 1);
        assert_eq!(summary.total_hours, 40);
        assert_eq!(summary.completed_hours, 20.0);
        assert_eq!(summary.overall_progress, 50.0);
    }

    #[test]
    fn test_overview_of_nothing() {
        let summary = overview(&[]);
        assert_eq!(summary.total_tasks, 0);
        assert_eq!(summary.overall_progress, 0.0);
    }
}
