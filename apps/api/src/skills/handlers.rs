use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Skill, SkillRecord};
use crate::skills::aggregator::{compute_statistics, summarize, MergeOutcome, SkillStatistics, SkillSummary};
use crate::skills::extractor::{extract_batch, Artifact, ItemOutcome, UploadedFile};
use crate::state::AppState;

const MAX_TOP_N: usize = 50;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct StatsQuery {
    pub user_id: Uuid,
    pub top_n: Option<usize>,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub user_id: Uuid,
    pub artifacts: Vec<Artifact>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub outcomes: Vec<ItemOutcome>,
    pub extracted: Vec<Skill>,
    pub merge: MergeOutcome,
    pub statistics: SkillStatistics,
}

#[derive(Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<SkillRecord>,
    pub summary: Vec<SkillSummary>,
}

async fn analyze_and_store(
    state: &AppState,
    user_id: Uuid,
    artifacts: Vec<Artifact>,
) -> Result<AnalyzeResponse, AppError> {
    if artifacts.is_empty() {
        return Err(AppError::InvalidRequest(
            "at least one artifact is required".to_string(),
        ));
    }

    let batch = extract_batch(&artifacts);
    let failed = batch.outcomes.iter().filter(|o| o.error.is_some()).count();
    info!(
        %user_id,
        artifacts = artifacts.len(),
        failed,
        skills = batch.skills.len(),
        "Extracted skills"
    );

    let merge = state.store.upsert_skills(user_id, batch.skills.clone()).await?;
    let records = state.store.list_skills(user_id).await?;
    let statistics = compute_statistics(&records, &state.config.scoring.stats_options());

    Ok(AnalyzeResponse {
        outcomes: batch.outcomes,
        extracted: batch.skills,
        merge,
        statistics,
    })
}

/// POST /api/v1/skills/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let response = analyze_and_store(&state, req.user_id, req.artifacts).await?;
    Ok(Json(response))
}

/// POST /api/v1/skills/upload
///
/// Multipart body: a `user_id` text field plus one or more file parts.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut artifacts = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InputFormat(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("user_id") {
            let raw = field
                .text()
                .await
                .map_err(|e| AppError::InputFormat(e.to_string()))?;
            let parsed = raw
                .trim()
                .parse::<Uuid>()
                .map_err(|_| AppError::InvalidRequest("user_id must be a UUID".to_string()))?;
            user_id = Some(parsed);
            continue;
        }

        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::InputFormat(e.to_string()))?;
        artifacts.push(Artifact::Upload(UploadedFile { file_name, content }));
    }

    let user_id = user_id.ok_or_else(|| {
        AppError::InvalidRequest("multipart body is missing the user_id field".to_string())
    })?;
    let response = analyze_and_store(&state, user_id, artifacts).await?;
    Ok(Json(response))
}

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SkillListResponse>, AppError> {
    let skills = state.store.list_skills(params.user_id).await?;
    let summary = summarize(&skills);
    Ok(Json(SkillListResponse { skills, summary }))
}

/// GET /api/v1/skills/stats
pub async fn handle_skill_stats(
    State(state): State<AppState>,
    Query(params): Query<StatsQuery>,
) -> Result<Json<SkillStatistics>, AppError> {
    let mut options = state.config.scoring.stats_options();
    if let Some(top_n) = params.top_n {
        options.top_n = top_n.min(MAX_TOP_N);
    }
    let records = state.store.list_skills(params.user_id).await?;
    Ok(Json(compute_statistics(&records, &options)))
}
