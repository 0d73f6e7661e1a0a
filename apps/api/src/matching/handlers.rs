use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::matcher::JobMatch;
use crate::matching::recommend::{effective_limit, rank_jobs};
use crate::models::{Job, JobQuery, JobRequirement, NewJob};
use crate::skills::normalize::collapse;
use crate::state::AppState;

const DEFAULT_JOB_PAGE: usize = 50;
const MAX_JOB_PAGE: usize = 200;

#[derive(Deserialize)]
pub struct JobListQuery {
    /// Keyword over title, company and requirement names.
    pub q: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct MatchQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct RecommendationQuery {
    pub user_id: Uuid,
    pub limit: Option<usize>,
}

/// Loads a job or fails with `NotFound`.
pub async fn load_job(state: &AppState, job_id: Uuid) -> Result<Job, AppError> {
    state
        .store
        .get_job(job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    req.validate()?;

    let job = Job {
        id: Uuid::new_v4(),
        title: collapse(&req.title),
        company: collapse(&req.company),
        required_skills: req
            .required_skills
            .into_iter()
            .map(|r| JobRequirement {
                name: collapse(&r.name),
                ..r
            })
            .collect(),
        created_at: Utc::now(),
    };
    let job = state.store.insert_job(job).await?;
    info!(job_id = %job.id, requirements = job.required_skills.len(), "Job ingested");

    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Result<Json<Vec<Job>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_JOB_PAGE).min(MAX_JOB_PAGE);
    let query = JobQuery::new(params.q.as_deref(), Some(limit));
    let jobs = state.store.list_jobs(&query).await?;
    Ok(Json(jobs))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(load_job(&state, id).await?))
}

/// GET /api/v1/jobs/:id/match
pub async fn handle_match_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<MatchQuery>,
) -> Result<Json<JobMatch>, AppError> {
    let job = load_job(&state, id).await?;
    let skills = state.store.list_skills(params.user_id).await?;
    let report = state.matcher.score(params.user_id, &skills, &job);
    info!(
        job_id = %id,
        user_id = %params.user_id,
        match_percentage = report.match_percentage,
        "Job match computed"
    );
    Ok(Json(report))
}

/// GET /api/v1/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<Vec<JobMatch>>, AppError> {
    let skills = state.store.list_skills(params.user_id).await?;
    let jobs = state.store.list_jobs(&JobQuery::default()).await?;
    let ranked = rank_jobs(
        state.matcher.as_ref(),
        params.user_id,
        &skills,
        &jobs,
        effective_limit(params.limit),
    );
    Ok(Json(ranked))
}
