mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{build_test_app, get, post_json, post_multipart};

const PYTHON_SAMPLE: &str = "import os\n\ndef walk(root):\n    for entry in os.listdir(root):\n        if entry.startswith('.'):\n            continue\n        print(entry)\n\nclass Walker:\n    def __init__(self):\n        self.seen = []\n";

#[tokio::test]
async fn test_health_reports_service() {
    let app = build_test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "skillpath-api");
}

#[tokio::test]
async fn test_analyze_stores_and_lists_skills() {
    let app = build_test_app();
    let user = Uuid::new_v4();

    let (status, body) = post_json(
        &app,
        "/api/v1/skills/analyze",
        json!({
            "user_id": user,
            "artifacts": [
                { "kind": "code", "text": PYTHON_SAMPLE, "file_name": "walk.py" },
                { "kind": "manual", "name": "Go", "proficiency": 20 }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["merge"]["inserted"].as_u64().unwrap() >= 2);
    assert!(body["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .all(|o| o.get("error").is_none()));

    let (status, listed) = get(&app, &format!("/api/v1/skills?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = listed["skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Python"));
    assert!(names.contains(&"Go"));
}

#[tokio::test]
async fn test_reanalysis_does_not_duplicate() {
    let app = build_test_app();
    let user = Uuid::new_v4();
    let request = |level: u32| {
        json!({
            "user_id": user,
            "artifacts": [{ "kind": "manual", "name": "Rust", "proficiency": level }]
        })
    };

    post_json(&app, "/api/v1/skills/analyze", request(40)).await;
    let (_, second) = post_json(&app, "/api/v1/skills/analyze", request(65)).await;
    assert_eq!(second["merge"]["inserted"], 0);
    assert_eq!(second["merge"]["updated"], 1);

    let (_, listed) = get(&app, &format!("/api/v1/skills?user_id={user}")).await;
    let skills = listed["skills"].as_array().unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0]["proficiency"], 65.0);
}

#[tokio::test]
async fn test_empty_artifact_list_is_bad_request() {
    let app = build_test_app();
    let (status, body) = post_json(
        &app,
        "/api/v1/skills/analyze",
        json!({ "user_id": Uuid::new_v4(), "artifacts": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_stats_rank_top_skills() {
    let app = build_test_app();
    let user = Uuid::new_v4();
    post_json(
        &app,
        "/api/v1/skills/analyze",
        json!({
            "user_id": user,
            "artifacts": [
                { "kind": "manual", "name": "Rust", "proficiency": 90 },
                { "kind": "manual", "name": "SQL", "proficiency": 50 },
                { "kind": "manual", "name": "Go", "proficiency": 70 }
            ]
        }),
    )
    .await;

    let (status, stats) = get(&app, &format!("/api/v1/skills/stats?user_id={user}&top_n=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_skills"], 3);
    let top: Vec<&str> = stats["top_skills"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(top, vec!["Rust", "Go"]);
}

#[tokio::test]
async fn test_upload_reports_binary_file_and_keeps_the_rest() {
    let app = build_test_app();
    let user = Uuid::new_v4().to_string();

    let (status, body) = post_multipart(
        &app,
        "/api/v1/skills/upload",
        &[
            ("user_id", None, user.as_bytes()),
            ("file", Some("walk.py"), PYTHON_SAMPLE.as_bytes()),
            ("file", Some("blob.bin"), b"\x00\x01\x02binary"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let outcomes = body["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].get("error").is_none());
    assert!(outcomes[1]["error"].is_string());
    assert!(body["extracted"]
        .as_array()
        .unwrap()
        .iter()
        .any(|s| s["name"] == "Python"));
}

#[tokio::test]
async fn test_upload_without_user_id_is_bad_request() {
    let app = build_test_app();
    let (status, _) = post_multipart(
        &app,
        "/api/v1/skills/upload",
        &[("file", Some("walk.py"), PYTHON_SAMPLE.as_bytes())],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
