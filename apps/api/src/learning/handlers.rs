use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::learning::path::{
    generate_plan, targets_from_match, LearningPlan, PathOrigin, SkillTarget,
};
use crate::learning::progress::{apply_progress, overview, ProgressOverview};
use crate::matching::handlers::load_job;
use crate::matching::matcher::JobMatch;
use crate::models::{LearningPath, LearningTask};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct PathRequest {
    pub user_id: Uuid,
    pub targets: Vec<SkillTarget>,
}

#[derive(Deserialize)]
pub struct JobPathRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Serialize)]
pub struct JobPathResponse {
    pub job_match: JobMatch,
    pub plan: LearningPlan,
}

/// A saved path with its tasks' progress rolled up.
#[derive(Serialize)]
pub struct PathSummary {
    #[serde(flatten)]
    pub path: LearningPath,
    pub progress: ProgressOverview,
}

#[derive(Serialize)]
pub struct PathDetail {
    #[serde(flatten)]
    pub path: LearningPath,
    pub tasks: Vec<LearningTask>,
    pub progress: ProgressOverview,
}

#[derive(Deserialize)]
pub struct ProgressUpdate {
    pub user_id: Uuid,
    pub progress: f64,
}

async fn plan_and_store(
    state: &AppState,
    user_id: Uuid,
    origin: PathOrigin<'_>,
    targets: &[SkillTarget],
) -> Result<LearningPlan, AppError> {
    let skills = state.store.list_skills(user_id).await?;
    let existing = state.store.list_tasks(user_id).await?;
    let mut plan = generate_plan(
        user_id,
        origin,
        targets,
        &skills,
        &existing,
        &state.config.scoring.path_settings(),
        Utc::now(),
    )?;

    if let Some(path) = plan.path.take() {
        plan.path = Some(state.store.save_path(path, plan.tasks.clone()).await?);
    }
    info!(
        %user_id,
        path_id = ?plan.path.as_ref().map(|p| p.id),
        tasks = plan.tasks.len(),
        already_met = plan.already_met.len(),
        hours = plan.total_estimated_hours,
        "Learning path generated"
    );
    Ok(plan)
}

/// POST /api/v1/learning/paths
pub async fn handle_generate_path(
    State(state): State<AppState>,
    Json(req): Json<PathRequest>,
) -> Result<Json<LearningPlan>, AppError> {
    let plan = plan_and_store(&state, req.user_id, PathOrigin::Targets, &req.targets).await?;
    Ok(Json(plan))
}

/// POST /api/v1/learning/paths/from-job
pub async fn handle_generate_path_from_job(
    State(state): State<AppState>,
    Json(req): Json<JobPathRequest>,
) -> Result<Json<JobPathResponse>, AppError> {
    let job = load_job(&state, req.job_id).await?;
    let skills = state.store.list_skills(req.user_id).await?;
    let job_match = state.matcher.score(req.user_id, &skills, &job);

    let targets = targets_from_match(&job_match);
    // A fully matched job has nothing to plan.
    let plan = if targets.is_empty() {
        LearningPlan::empty()
    } else {
        plan_and_store(&state, req.user_id, PathOrigin::Job(&job), &targets).await?
    };

    Ok(Json(JobPathResponse { job_match, plan }))
}

async fn path_tasks(state: &AppState, path: &LearningPath) -> Result<Vec<LearningTask>, AppError> {
    let tasks = state.store.list_tasks(path.user_id).await?;
    Ok(tasks.into_iter().filter(|t| t.path_id == path.id).collect())
}

/// GET /api/v1/learning/paths
pub async fn handle_list_paths(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<PathSummary>>, AppError> {
    let paths = state.store.list_paths(params.user_id).await?;
    let tasks = state.store.list_tasks(params.user_id).await?;

    let summaries = paths
        .into_iter()
        .map(|path| {
            let own: Vec<LearningTask> = tasks
                .iter()
                .filter(|t| t.path_id == path.id)
                .cloned()
                .collect();
            PathSummary {
                progress: overview(&own),
                path,
            }
        })
        .collect();
    Ok(Json(summaries))
}

async fn load_path(state: &AppState, user_id: Uuid, path_id: Uuid) -> Result<LearningPath, AppError> {
    state
        .store
        .get_path(user_id, path_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Learning path {path_id} not found")))
}

/// GET /api/v1/learning/paths/:id
pub async fn handle_get_path(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PathDetail>, AppError> {
    let path = load_path(&state, params.user_id, id).await?;
    let tasks = path_tasks(&state, &path).await?;
    Ok(Json(PathDetail {
        progress: overview(&tasks),
        tasks,
        path,
    }))
}

/// DELETE /api/v1/learning/paths/:id
pub async fn handle_delete_path(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_path(params.user_id, id).await? {
        return Err(AppError::NotFound(format!("Learning path {id} not found")));
    }
    info!(path_id = %id, user_id = %params.user_id, "Learning path deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/learning/tasks
pub async fn handle_list_tasks(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<LearningTask>>, AppError> {
    let tasks = state.store.list_tasks(params.user_id).await?;
    Ok(Json(tasks))
}

/// PUT /api/v1/learning/tasks/:id/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProgressUpdate>,
) -> Result<Json<LearningTask>, AppError> {
    let mut task = state
        .store
        .get_task(req.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))?;

    apply_progress(&mut task, req.progress, Utc::now())?;
    state.store.update_task(&task).await?;
    info!(task_id = %id, progress = task.progress, status = %task.status, "Task progress updated");

    Ok(Json(task))
}

/// GET /api/v1/learning/overview
pub async fn handle_overview(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProgressOverview>, AppError> {
    let tasks = state.store.list_tasks(params.user_id).await?;
    Ok(Json(overview(&tasks)))
}
