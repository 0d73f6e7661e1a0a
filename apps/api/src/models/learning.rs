use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::skill::Proficiency;
use crate::skills::normalize::skill_key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(TaskStatus::NotStarted),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// Job requirements are planned ahead of freely chosen targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    JobRequirement,
    Chosen,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::JobRequirement => "job_requirement",
            TaskPriority::Chosen => "chosen",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "job_requirement" => Ok(TaskPriority::JobRequirement),
            "chosen" => Ok(TaskPriority::Chosen),
            other => Err(format!("unknown task priority '{other}'")),
        }
    }
}

/// One skill the user wants to reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTarget {
    pub name: String,
    pub target_proficiency: Proficiency,
    #[serde(default)]
    pub job_requirement: bool,
}

/// A saved plan. Owns its tasks; regenerating the same path only replaces
/// its own untouched tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningPath {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    /// Set when the path was derived from a job's gaps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    /// Collapsed targets, canonical names.
    pub targets: Vec<SkillTarget>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LearningPathRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub job_id: Option<Uuid>,
    pub targets: Json<Vec<SkillTarget>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LearningPathRow> for LearningPath {
    fn from(row: LearningPathRow) -> Self {
        LearningPath {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            job_id: row.job_id,
            targets: row.targets.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearningTask {
    pub id: Uuid,
    pub user_id: Uuid,
    pub path_id: Uuid,
    pub skill_target: String,
    pub target_proficiency: Proficiency,
    pub current_proficiency: Proficiency,
    pub estimated_hours: u32,
    pub priority: TaskPriority,
    pub order_index: u32,
    pub status: TaskStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LearningTask {
    pub fn skill_key(&self) -> String {
        skill_key(&self.skill_target)
    }

    /// Never touched by the user: safe to drop when a path is regenerated.
    pub fn is_untouched(&self) -> bool {
        self.status == TaskStatus::NotStarted && self.progress == 0
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct LearningTaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub path_id: Uuid,
    pub skill_target: String,
    pub skill_key: String,
    pub target_proficiency: f64,
    pub current_proficiency: f64,
    pub estimated_hours: i32,
    pub priority: String,
    pub order_index: i32,
    pub status: String,
    pub progress: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
