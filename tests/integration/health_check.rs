// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, test_router};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pageresolver::domain::models::task::ExecutionMode;
use pageresolver::domain::repositories::task_repository::TaskRepository;
use serde_json::Value;
use tower::util::ServiceExt;

/// 健康检查测试
///
/// 验证健康检查端点返回默认凭据的配置情况
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app();

    let response = app.server.get("/health").await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["search_api_configured"], true);
    assert_eq!(body["llm_api_configured"], false);
    assert_eq!(body["classifier_strategy"], "rules");
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app();

    let response = app.server.get("/v1/version").await;
    response.assert_status_ok();
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

/// 格式错误的请求体在进入处理器前被拒绝
#[tokio::test]
async fn malformed_submission_is_rejected() {
    let (app, _, repository) = test_router(ExecutionMode::Sequential);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tasks")
                .header("content-type", "application/json")
                .body(Body::from("{\"records\": [oops"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repository.count().await, 0);
}
