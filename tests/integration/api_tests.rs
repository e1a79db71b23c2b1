// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, create_test_app_with_mode, wait_for_completion};
use axum::http::StatusCode;
use pageresolver::domain::models::business::Locale;
use pageresolver::domain::models::task::{Credentials, ExecutionMode, TaskConfig, TaskState};
use pageresolver::domain::repositories::task_repository::TaskRepository;
use serde_json::{json, Value};

fn mixed_batch() -> Value {
    json!({
        "records": [
            { "business_name": "Tennis Club Ovada", "location": "Ovada,IT" },
            { "business_name": "Bali Tennis Friends", "location": "Bali,ID" },
            { "business_name": "Offsite Bakery", "location": "Austin,US" },
            { "business_name": "Ghost Gym", "location": "Nowhere" }
        ],
        "country_code": "it",
        "language": "it"
    })
}

async fn submit(server: &axum_test::TestServer, body: &Value) -> String {
    let response = server.post("/v1/tasks").json(body).await;
    response.assert_status(StatusCode::ACCEPTED);
    let body: Value = response.json();
    body["task_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_submit_and_poll_until_completed() {
    let app = create_test_app();

    let response = app.server.post("/v1/tasks").json(&mixed_batch()).await;
    response.assert_status(StatusCode::ACCEPTED);
    let accepted: Value = response.json();
    assert_eq!(accepted["total_records"], 4);
    let task_id = accepted["task_id"].as_str().unwrap();
    assert!(task_id.starts_with("task_"));

    let state = wait_for_completion(&app.server, task_id).await;
    assert_eq!(state["progress"], 100.0);
    assert_eq!(state["total"], 4);
    assert_eq!(state["completed_count"], 4);
    assert_eq!(state["not_found_count"], 2);

    let results = state["results"].as_array().unwrap();
    let names: Vec<&str> = results
        .iter()
        .map(|r| r["business_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Tennis Club Ovada", "Bali Tennis Friends", "Offsite Bakery", "Ghost Gym"]
    );

    assert_eq!(results[0]["type"], "page");
    assert_eq!(results[0]["url"], "https://www.facebook.com/TennisClubOvada/");
    assert!(results[0]["confidence"].as_f64().unwrap() > 0.0);
    assert_eq!(results[1]["type"], "group");
    assert_eq!(results[2]["type"], "not_found");
    assert_eq!(results[2]["notes"], "No Facebook URLs found in search results");
    assert_eq!(results[3]["type"], "not_found");
    assert_eq!(results[3]["url"], "Not found");
    assert_eq!(results[3]["confidence"], 0.0);

    assert_eq!(state["config"]["country_code"], "it");
    assert_eq!(state["config"]["credentials"]["search_api_key"], "AIzaSy...");
}

#[tokio::test]
async fn test_parallel_mode_keeps_input_order() {
    let app = create_test_app_with_mode(ExecutionMode::Parallel);
    let task_id = submit(&app.server, &mixed_batch()).await;

    let state = wait_for_completion(&app.server, &task_id).await;
    assert_eq!(state["config"]["mode"], "parallel");
    let results = state["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results[0]["business_name"], "Tennis Club Ovada");
    assert_eq!(results[3]["business_name"], "Ghost Gym");
}

#[tokio::test]
async fn test_search_failure_becomes_error_record() {
    let app = create_test_app();
    let task_id = submit(
        &app.server,
        &json!({
            "records": [
                { "business_name": "Quota Burner", "location": "Milano,IT" },
                { "business_name": "Tennis Club Ovada", "location": "Ovada,IT" }
            ]
        }),
    )
    .await;

    let state = wait_for_completion(&app.server, &task_id).await;
    let results = state["results"].as_array().unwrap();
    assert_eq!(results[0]["type"], "error");
    assert_eq!(results[0]["url"], "Error");
    assert!(results[0]["notes"]
        .as_str()
        .unwrap()
        .contains("Quota exceeded"));
    assert_eq!(results[1]["type"], "page");
}

#[tokio::test]
async fn test_not_found_report_and_csv_download() {
    let app = create_test_app();
    let task_id = submit(&app.server, &mixed_batch()).await;
    wait_for_completion(&app.server, &task_id).await;

    let report: Value = app
        .server
        .get(&format!("/v1/tasks/{}/not_found", task_id))
        .await
        .json();
    assert_eq!(report["task_id"], task_id.as_str());
    assert_eq!(report["not_found_count"], 2);
    assert_eq!(report["total_count"], 4);
    assert_eq!(report["not_found_records"][0]["business_name"], "Offsite Bakery");
    assert_eq!(report["not_found_records"][1]["business_name"], "Ghost Gym");

    let response = app
        .server
        .get(&format!("/v1/tasks/{}/download", task_id))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        format!("attachment; filename=\"facebook_results_{}.csv\"", task_id)
    );

    let csv = response.text();
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "Business Name,Location,Facebook URL,Type,Confidence,Notes");
    assert!(lines[1].starts_with(
        "Tennis Club Ovada,\"Ovada,IT\",https://www.facebook.com/TennisClubOvada/,page,"
    ));
    assert!(lines[4].starts_with("Ghost Gym,Nowhere,Not found,not_found,0.00,"));
}

#[tokio::test]
async fn test_requery_runs_only_unresolved_records() {
    let app = create_test_app();
    let task_id = submit(&app.server, &mixed_batch()).await;
    wait_for_completion(&app.server, &task_id).await;

    let response = app
        .server
        .post(&format!("/v1/tasks/{}/requery", task_id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["not_found_count"], 2);
    assert_eq!(body["original_task_id"], task_id.as_str());
    assert_eq!(body["message"], "Requerying 2 not found records");
    let requery_id = body["requery_task_id"].as_str().unwrap();
    assert!(requery_id.starts_with("requery_"));

    let requery = wait_for_completion(&app.server, requery_id).await;
    assert_eq!(requery["total"], 2);
    assert_eq!(requery["parent_task_id"], task_id.as_str());
    assert_eq!(requery["config"]["country_code"], "it");
    let names: Vec<&str> = requery["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["business_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Offsite Bakery", "Ghost Gym"]);

    // the original task is untouched
    let original: Value = app
        .server
        .get(&format!("/v1/tasks/{}", task_id))
        .await
        .json();
    assert_eq!(original["total"], 4);

    let seen = app.factory.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
}

#[tokio::test]
async fn test_requery_without_unresolved_records_is_noop() {
    let app = create_test_app();
    let task_id = submit(
        &app.server,
        &json!({ "records": [{ "business_name": "Tennis Club Ovada", "location": "Ovada,IT" }] }),
    )
    .await;
    wait_for_completion(&app.server, &task_id).await;

    let body: Value = app
        .server
        .post(&format!("/v1/tasks/{}/requery", task_id))
        .await
        .json();
    assert_eq!(body["message"], "No records to requery - all were found!");
    assert_eq!(body["not_found_count"], 0);
    assert!(body.get("requery_task_id").is_none());
    assert_eq!(app.repository.count().await, 1);
}

#[tokio::test]
async fn test_submission_credentials_override_defaults() {
    let app = create_test_app();
    let task_id = submit(
        &app.server,
        &json!({
            "records": [{ "business_name": "Ghost Gym", "location": "Nowhere" }],
            "credentials": { "google_api_key": "AIzaSyCaller", "google_cx": "" }
        }),
    )
    .await;
    wait_for_completion(&app.server, &task_id).await;

    let seen = app.factory.seen.lock().unwrap();
    assert_eq!(
        seen[0],
        Credentials::new("AIzaSyCaller", "server-cx", None)
    );
}

#[tokio::test]
async fn test_unknown_task_returns_404() {
    let app = create_test_app();

    app.server
        .get("/v1/tasks/task_missing")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/v1/tasks/task_missing/not_found")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/v1/tasks/task_missing/download")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .post("/v1/tasks/task_missing/requery")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_submissions_return_400() {
    let app = create_test_app();

    app.server
        .post("/v1/tasks")
        .json(&json!({ "records": [] }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post("/v1/tasks")
        .json(&json!({ "records": [{ "business_name": "   ", "location": "Ovada,IT" }] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("business_name"));

    assert_eq!(app.repository.count().await, 0);
}

#[tokio::test]
async fn test_processing_task_rejects_download_and_requery() {
    let app = create_test_app();
    app.repository
        .create(TaskState::new(
            "task_pending",
            3,
            TaskConfig {
                locale: Locale::default(),
                credentials: Credentials::new("key", "cx", None),
                mode: ExecutionMode::Sequential,
            },
        ))
        .await
        .unwrap();

    let state: Value = app.server.get("/v1/tasks/task_pending").await.json();
    assert_eq!(state["status"], "processing");
    assert_eq!(state["progress"], 0.0);

    app.server
        .get("/v1/tasks/task_pending/download")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .get("/v1/tasks/task_pending/not_found")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    app.server
        .post("/v1/tasks/task_pending/requery")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
