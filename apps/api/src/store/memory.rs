use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Job, JobQuery, LearningPath, LearningTask, Skill, SkillRecord};
use crate::skills::aggregator::{merge_skills, MergeOutcome};
use crate::store::Store;

#[derive(Default)]
struct MemoryState {
    skills: Vec<SkillRecord>,
    jobs: Vec<Job>,
    paths: Vec<LearningPath>,
    tasks: Vec<LearningTask>,
}

/// Process-local store. Each batch is applied under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_skills(&self, user_id: Uuid, skills: Vec<Skill>) -> Result<MergeOutcome, AppError> {
        let mut state = self.state.write().await;
        Ok(merge_skills(&mut state.skills, user_id, skills, Utc::now()))
    }

    async fn list_skills(&self, user_id: Uuid) -> Result<Vec<SkillRecord>, AppError> {
        let state = self.state.read().await;
        let mut records: Vec<SkillRecord> = state
            .skills
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_cached_key(|r| (r.skill.key(), r.skill.source().as_str()));
        Ok(records)
    }

    async fn insert_job(&self, job: Job) -> Result<Job, AppError> {
        self.state.write().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let state = self.state.read().await;
        Ok(state.jobs.iter().find(|j| j.id == job_id).cloned())
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, AppError> {
        let state = self.state.read().await;
        let mut jobs: Vec<Job> = state
            .jobs
            .iter()
            .filter(|j| query.matches(j))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        if let Some(limit) = query.limit {
            jobs.truncate(limit);
        }
        Ok(jobs)
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<LearningTask>, AppError> {
        let state = self.state.read().await;
        let path_order: HashMap<Uuid, _> = state
            .paths
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| (p.id, p.created_at))
            .collect();
        let mut tasks: Vec<LearningTask> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (path_order.get(&t.path_id).copied(), t.path_id, t.order_index));
        Ok(tasks)
    }

    async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<LearningTask>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.user_id == user_id)
            .cloned())
    }

    async fn save_path(
        &self,
        path: LearningPath,
        tasks: Vec<LearningTask>,
    ) -> Result<LearningPath, AppError> {
        let mut state = self.state.write().await;
        let stored = match state.paths.iter_mut().find(|p| p.id == path.id) {
            Some(existing) => {
                existing.name = path.name;
                existing.targets = path.targets;
                existing.updated_at = path.updated_at;
                existing.clone()
            }
            None => {
                state.paths.push(path.clone());
                path
            }
        };

        state
            .tasks
            .retain(|t| !(t.path_id == stored.id && t.is_untouched()));
        for task in tasks {
            if !state.tasks.iter().any(|t| t.id == task.id) {
                state.tasks.push(task);
            }
        }
        Ok(stored)
    }

    async fn list_paths(&self, user_id: Uuid) -> Result<Vec<LearningPath>, AppError> {
        let state = self.state.read().await;
        let mut paths: Vec<LearningPath> = state
            .paths
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        paths.sort_by_key(|p| (p.created_at, p.id));
        Ok(paths)
    }

    async fn get_path(&self, user_id: Uuid, path_id: Uuid) -> Result<Option<LearningPath>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .paths
            .iter()
            .find(|p| p.id == path_id && p.user_id == user_id)
            .cloned())
    }

    async fn delete_path(&self, user_id: Uuid, path_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.paths.len();
        state
            .paths
            .retain(|p| !(p.id == path_id && p.user_id == user_id));
        if state.paths.len() == before {
            return Ok(false);
        }
        state.tasks.retain(|t| t.path_id != path_id);
        Ok(true)
    }

    async fn update_task(&self, task: &LearningTask) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let stored = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id && t.user_id == task.user_id)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task.id)))?;
        stored.status = task.status;
        stored.progress = task.progress;
        stored.updated_at = task.updated_at;
        Ok(())
    }
}
