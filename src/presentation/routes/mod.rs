// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::batch_service::BatchService;
use crate::presentation::handlers::task_handler::{self, SubmissionDefaults};
use axum::{
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 健康检查信息
#[derive(Debug, Clone, Serialize)]
pub struct HealthInfo {
    pub status: &'static str,
    /// 是否配置了默认搜索凭据
    pub search_api_configured: bool,
    /// 是否配置了默认分类服务密钥
    pub llm_api_configured: bool,
    /// 当前分类策略
    pub classifier_strategy: String,
}

/// 创建应用路由
///
/// # 参数
///
/// * `service` - 批处理服务
/// * `defaults` - 提交请求的默认地区与执行模式
/// * `health` - 健康检查展示的配置状态
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes<R>(
    service: Arc<BatchService<R>>,
    defaults: SubmissionDefaults,
    health: HealthInfo,
) -> Router
where
    R: TaskRepository + 'static,
{
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version));

    let task_routes = Router::new()
        .route("/v1/tasks", post(task_handler::submit_batch::<R>))
        .route("/v1/tasks/{id}", get(task_handler::get_task_status::<R>))
        .route(
            "/v1/tasks/{id}/not_found",
            get(task_handler::get_not_found::<R>),
        )
        .route(
            "/v1/tasks/{id}/download",
            get(task_handler::download_results::<R>),
        )
        .route(
            "/v1/tasks/{id}/requery",
            post(task_handler::requery_not_found::<R>),
        );

    Router::new()
        .merge(public_routes)
        .merge(task_routes)
        .layer(Extension(service))
        .layer(Extension(Arc::new(defaults)))
        .layer(Extension(Arc::new(health)))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回服务状态与默认凭据的配置情况
pub async fn health_check(Extension(health): Extension<Arc<HealthInfo>>) -> Json<HealthInfo> {
    Json(health.as_ref().clone())
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
