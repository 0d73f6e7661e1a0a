use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobRow;
use crate::models::learning::{LearningPathRow, LearningTaskRow};
use crate::models::skill::SkillRow;
use crate::models::{
    Job, JobQuery, LearningPath, LearningTask, Proficiency, Skill, SkillCategory, SkillRecord,
    TaskPriority, TaskStatus,
};
use crate::skills::aggregator::MergeOutcome;
use crate::store::Store;

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%keyword%` with LIKE metacharacters escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn corrupt(table: &str, id: Uuid, detail: String) -> AppError {
    AppError::Computation(format!("corrupt {table} row {id}: {detail}"))
}

impl TryFrom<SkillRow> for SkillRecord {
    type Error = AppError;

    fn try_from(row: SkillRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<SkillCategory>()
            .map_err(|e| corrupt("skills", row.id, e))?;
        let evidence = row.evidence.0;
        if evidence.source().as_str() != row.source {
            return Err(corrupt(
                "skills",
                row.id,
                format!("source '{}' disagrees with evidence", row.source),
            ));
        }

        Ok(SkillRecord {
            id: row.id,
            user_id: row.user_id,
            skill: Skill {
                name: row.name,
                category,
                proficiency: Proficiency::new(row.proficiency),
                evidence,
            },
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<LearningTaskRow> for LearningTask {
    type Error = AppError;

    fn try_from(row: LearningTaskRow) -> Result<Self, Self::Error> {
        let priority = row
            .priority
            .parse::<TaskPriority>()
            .map_err(|e| corrupt("learning_tasks", row.id, e))?;
        let status = row
            .status
            .parse::<TaskStatus>()
            .map_err(|e| corrupt("learning_tasks", row.id, e))?;

        Ok(LearningTask {
            id: row.id,
            user_id: row.user_id,
            path_id: row.path_id,
            skill_target: row.skill_target,
            target_proficiency: Proficiency::new(row.target_proficiency),
            current_proficiency: Proficiency::new(row.current_proficiency),
            estimated_hours: row.estimated_hours.max(0) as u32,
            priority,
            order_index: row.order_index.max(0) as u32,
            status,
            progress: row.progress.clamp(0, 100) as u8,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn upsert_skills(&self, user_id: Uuid, skills: Vec<Skill>) -> Result<MergeOutcome, AppError> {
        let now = Utc::now();
        let mut outcome = MergeOutcome::default();
        let mut tx = self.pool.begin().await?;

        for skill in &skills {
            // xmax = 0 only for freshly inserted tuples
            let inserted: bool = sqlx::query_scalar(
                r#"
                INSERT INTO skills
                    (id, user_id, name, name_key, category, proficiency, source, evidence, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (user_id, name_key, source) DO UPDATE SET
                    name        = EXCLUDED.name,
                    category    = EXCLUDED.category,
                    proficiency = EXCLUDED.proficiency,
                    evidence    = EXCLUDED.evidence,
                    updated_at  = EXCLUDED.updated_at
                RETURNING (xmax = 0) AS inserted
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&skill.name)
            .bind(skill.key())
            .bind(skill.category.as_str())
            .bind(skill.proficiency.value())
            .bind(skill.source().as_str())
            .bind(Json(&skill.evidence))
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                outcome.inserted += 1;
            } else {
                outcome.updated += 1;
            }
        }

        tx.commit().await?;
        debug!(%user_id, inserted = outcome.inserted, updated = outcome.updated, "Skills upserted");
        Ok(outcome)
    }

    async fn list_skills(&self, user_id: Uuid) -> Result<Vec<SkillRecord>, AppError> {
        let rows = sqlx::query_as::<_, SkillRow>(
            "SELECT * FROM skills WHERE user_id = $1 ORDER BY name_key, source",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SkillRecord::try_from).collect()
    }

    async fn insert_job(&self, job: Job) -> Result<Job, AppError> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, title, company, required_skills, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(Json(&job.required_skills))
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        Ok(job)
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Job::from))
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<Job>, AppError> {
        // NULL pattern matches everything; LIMIT NULL means no limit
        let pattern = query.keyword.as_deref().map(like_pattern);
        let limit = query.limit.map(|l| l as i64);
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM jobs
            WHERE $1::TEXT IS NULL
               OR title ILIKE $1
               OR company ILIKE $1
               OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(required_skills) AS req
                    WHERE req->>'name' ILIKE $1
               )
            ORDER BY created_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<LearningTask>, AppError> {
        let rows = sqlx::query_as::<_, LearningTaskRow>(
            r#"
            SELECT t.* FROM learning_tasks t
            JOIN learning_paths p ON p.id = t.path_id
            WHERE t.user_id = $1
            ORDER BY p.created_at, p.id, t.order_index
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LearningTask::try_from).collect()
    }

    async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<LearningTask>, AppError> {
        let row = sqlx::query_as::<_, LearningTaskRow>(
            "SELECT * FROM learning_tasks WHERE id = $1 AND user_id = $2",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LearningTask::try_from).transpose()
    }

    async fn save_path(
        &self,
        path: LearningPath,
        tasks: Vec<LearningTask>,
    ) -> Result<LearningPath, AppError> {
        let mut tx = self.pool.begin().await?;

        // created_at survives regeneration so the path keeps its place
        let row = sqlx::query_as::<_, LearningPathRow>(
            r#"
            INSERT INTO learning_paths (id, user_id, name, job_id, targets, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name       = EXCLUDED.name,
                targets    = EXCLUDED.targets,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(path.id)
        .bind(path.user_id)
        .bind(&path.name)
        .bind(path.job_id)
        .bind(Json(&path.targets))
        .bind(path.created_at)
        .bind(path.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        let dropped = sqlx::query(
            "DELETE FROM learning_tasks WHERE path_id = $1 AND status = 'not_started' AND progress = 0",
        )
        .bind(path.id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        for task in &tasks {
            sqlx::query(
                r#"
                INSERT INTO learning_tasks
                    (id, user_id, path_id, skill_target, skill_key, target_proficiency,
                     current_proficiency, estimated_hours, priority, order_index, status,
                     progress, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(task.id)
            .bind(task.user_id)
            .bind(task.path_id)
            .bind(&task.skill_target)
            .bind(task.skill_key())
            .bind(task.target_proficiency.value())
            .bind(task.current_proficiency.value())
            .bind(task.estimated_hours as i32)
            .bind(task.priority.as_str())
            .bind(task.order_index as i32)
            .bind(task.status.as_str())
            .bind(task.progress as i16)
            .bind(task.created_at)
            .bind(task.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(path_id = %path.id, dropped, stored = tasks.len(), "Learning path saved");
        Ok(LearningPath::from(row))
    }

    async fn list_paths(&self, user_id: Uuid) -> Result<Vec<LearningPath>, AppError> {
        let rows = sqlx::query_as::<_, LearningPathRow>(
            "SELECT * FROM learning_paths WHERE user_id = $1 ORDER BY created_at, id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(LearningPath::from).collect())
    }

    async fn get_path(&self, user_id: Uuid, path_id: Uuid) -> Result<Option<LearningPath>, AppError> {
        let row = sqlx::query_as::<_, LearningPathRow>(
            "SELECT * FROM learning_paths WHERE id = $1 AND user_id = $2",
        )
        .bind(path_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(LearningPath::from))
    }

    async fn delete_path(&self, user_id: Uuid, path_id: Uuid) -> Result<bool, AppError> {
        // tasks go with the path via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM learning_paths WHERE id = $1 AND user_id = $2")
            .bind(path_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_task(&self, task: &LearningTask) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE learning_tasks
            SET status = $1, progress = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(task.status.as_str())
        .bind(task.progress as i16)
        .bind(task.updated_at)
        .bind(task.id)
        .bind(task.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task {} not found", task.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%_sure"), "%100\\%\\_sure%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
