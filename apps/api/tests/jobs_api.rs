mod common;

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{build_test_app, get, post_json};

async fn seed_skills(app: &axum::Router, user: Uuid, skills: &[(&str, u32)]) {
    let artifacts: Vec<Value> = skills
        .iter()
        .map(|(name, level)| json!({ "kind": "manual", "name": name, "proficiency": level }))
        .collect();
    let (status, _) = post_json(
        app,
        "/api/v1/skills/analyze",
        json!({ "user_id": user, "artifacts": artifacts }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_job(app: &axum::Router, title: &str, requirements: Value) -> Uuid {
    let (status, job) = post_json(
        app,
        "/api/v1/jobs",
        json!({ "title": title, "company": "Acme", "required_skills": requirements }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    job["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_match_weights_partial_requirements() {
    let app = build_test_app();
    let user = Uuid::new_v4();
    seed_skills(&app, user, &[("Python", 80), ("SQL", 40)]).await;
    let job_id = create_job(
        &app,
        "Data Engineer",
        json!([
            { "name": "Python", "minimum_proficiency": 60, "weight": 2.0 },
            { "name": "SQL", "minimum_proficiency": 60 },
            { "name": "Go", "minimum_proficiency": 50 }
        ]),
    )
    .await;

    let (status, report) = get(&app, &format!("/api/v1/jobs/{job_id}/match?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["match_percentage"], 63);
    assert_eq!(report["matched"][0]["name"], "Python");
    assert_eq!(report["partial"][0]["name"], "SQL");
    assert_eq!(report["missing"][0]["name"], "Go");
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let app = build_test_app();
    let missing = Uuid::new_v4();

    let (status, body) = get(&app, &format!("/api/v1/jobs/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = get(
        &app,
        &format!("/api/v1/jobs/{missing}/match?user_id={}", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let app = build_test_app();
    let (status, _) = post_json(
        &app,
        "/api/v1/jobs",
        json!({ "title": "   ", "company": "Acme", "required_skills": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_created_job_is_listed_and_fetched() {
    let app = build_test_app();
    let job_id = create_job(
        &app,
        "  Backend   Developer ",
        json!([{ "name": "Rust", "minimum_proficiency": 150 }]),
    )
    .await;

    let (_, job) = get(&app, &format!("/api/v1/jobs/{job_id}")).await;
    assert_eq!(job["title"], "Backend Developer");
    assert_eq!(job["required_skills"][0]["minimum_proficiency"], 100.0);

    let (status, jobs) = get(&app, "/api/v1/jobs?limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_recommendations_rank_best_match_first() {
    let app = build_test_app();
    let user = Uuid::new_v4();
    seed_skills(&app, user, &[("Rust", 80)]).await;
    create_job(
        &app,
        "Frontend Developer",
        json!([{ "name": "TypeScript", "minimum_proficiency": 50 }]),
    )
    .await;
    create_job(
        &app,
        "Systems Engineer",
        json!([{ "name": "Rust", "minimum_proficiency": 60 }]),
    )
    .await;

    let (status, ranked) = get(&app, &format!("/api/v1/recommendations?user_id={user}&limit=1")).await;
    assert_eq!(status, StatusCode::OK);
    let ranked = ranked.as_array().unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0]["title"], "Systems Engineer");
    assert_eq!(ranked[0]["match_percentage"], 100);
}

#[tokio::test]
async fn test_job_list_filters_by_keyword() {
    let app = build_test_app();
    create_job(
        &app,
        "Platform Engineer",
        json!([{ "name": "Kubernetes", "minimum_proficiency": 50 }]),
    )
    .await;
    create_job(
        &app,
        "Android Developer",
        json!([{ "name": "Kotlin", "minimum_proficiency": 50 }]),
    )
    .await;

    let titles = |jobs: &Value| -> Vec<String> {
        jobs.as_array()
            .unwrap()
            .iter()
            .map(|j| j["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, by_title) = get(&app, "/api/v1/jobs?q=PLATFORM").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&by_title), vec!["Platform Engineer"]);

    let (_, by_skill) = get(&app, "/api/v1/jobs?q=kotlin").await;
    assert_eq!(titles(&by_skill), vec!["Android Developer"]);

    let (_, by_company) = get(&app, "/api/v1/jobs?q=acme").await;
    assert_eq!(titles(&by_company).len(), 2);

    let (_, none) = get(&app, "/api/v1/jobs?q=cobol").await;
    assert!(titles(&none).is_empty());
}
