pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::learning::handlers as learning;
use crate::matching::handlers as matching;
use crate::session::handlers as session;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Skills
        .route("/api/v1/skills", get(skills::handle_list_skills))
        .route("/api/v1/skills/analyze", post(skills::handle_analyze))
        .route("/api/v1/skills/upload", post(skills::handle_upload))
        .route("/api/v1/skills/stats", get(skills::handle_skill_stats))
        // Jobs & matching
        .route(
            "/api/v1/jobs",
            get(matching::handle_list_jobs).post(matching::handle_create_job),
        )
        .route("/api/v1/jobs/:id", get(matching::handle_get_job))
        .route("/api/v1/jobs/:id/match", get(matching::handle_match_job))
        .route(
            "/api/v1/recommendations",
            get(matching::handle_recommendations),
        )
        // Learning paths
        .route(
            "/api/v1/learning/paths",
            get(learning::handle_list_paths).post(learning::handle_generate_path),
        )
        .route(
            "/api/v1/learning/paths/from-job",
            post(learning::handle_generate_path_from_job),
        )
        .route(
            "/api/v1/learning/paths/:id",
            get(learning::handle_get_path).delete(learning::handle_delete_path),
        )
        .route("/api/v1/learning/tasks", get(learning::handle_list_tasks))
        .route(
            "/api/v1/learning/tasks/:id/progress",
            put(learning::handle_update_progress),
        )
        .route("/api/v1/learning/overview", get(learning::handle_overview))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_start_session))
        .route(
            "/api/v1/sessions/current",
            get(session::handle_current_session).delete(session::handle_end_session),
        )
        .with_state(state)
}
