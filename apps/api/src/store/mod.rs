//! Persistence seam. Handlers only ever see `Arc<dyn Store>`.
//!
//! `PgStore` backs production; `MemoryStore` is used when no database is
//! configured and by the integration tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Job, JobQuery, LearningPath, LearningTask, Skill, SkillRecord};
use crate::skills::aggregator::MergeOutcome;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Merges a batch atomically: last write wins per (user, name key, source).
    async fn upsert_skills(&self, user_id: Uuid, skills: Vec<Skill>) -> Result<MergeOutcome, AppError>;

    /// A user's records ordered by name key, then source.
    async fn list_skills(&self, user_id: Uuid) -> Result<Vec<SkillRecord>, AppError>;

    async fn insert_job(&self, job: Job) -> Result<Job, AppError>;

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError>;

    /// Newest first, filtered by keyword. No limit returns every match.
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, AppError>;

    /// A user's tasks grouped by path (oldest path first), then `order_index`.
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<LearningTask>, AppError>;

    /// Scoped to the owner: another user's task id yields `None`.
    async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<LearningTask>, AppError>;

    /// Upserts the path, then swaps that path's untouched tasks for `tasks`.
    /// Other paths are left alone. Returns the stored path, which keeps its
    /// original `created_at` on regeneration.
    async fn save_path(
        &self,
        path: LearningPath,
        tasks: Vec<LearningTask>,
    ) -> Result<LearningPath, AppError>;

    /// Oldest first.
    async fn list_paths(&self, user_id: Uuid) -> Result<Vec<LearningPath>, AppError>;

    /// Scoped to the owner like `get_task`.
    async fn get_path(&self, user_id: Uuid, path_id: Uuid) -> Result<Option<LearningPath>, AppError>;

    /// Removes the path and every task it owns. Returns whether it existed.
    async fn delete_path(&self, user_id: Uuid, path_id: Uuid) -> Result<bool, AppError>;

    /// Persists status, progress and `updated_at`.
    async fn update_task(&self, task: &LearningTask) -> Result<(), AppError>;
}
