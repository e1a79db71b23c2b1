// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::dto::batch_request::{SubmitBatchRequestDto, SubmitBatchResponseDto};
use crate::application::dto::task_response::{RequeryResponseDto, TaskStatusResponseDto};
use crate::domain::models::business::Locale;
use crate::domain::models::task::ExecutionMode;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::batch_service::{BatchService, NotFoundReport};
use crate::presentation::errors::AppError;
use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 提交请求未指定时使用的默认值
#[derive(Debug, Clone)]
pub struct SubmissionDefaults {
    pub locale: Locale,
    pub mode: ExecutionMode,
}

/// 提交批处理任务
///
/// # 参数
/// * `service` - 批处理服务
/// * `defaults` - 默认地区与执行模式
/// * `payload` - 请求体
///
/// # 返回值
/// * `Ok` - 202 与新任务标识
/// * `Err(AppError)` - 校验失败或任务无法启动
pub async fn submit_batch<R>(
    Extension(service): Extension<Arc<BatchService<R>>>,
    Extension(defaults): Extension<Arc<SubmissionDefaults>>,
    Json(payload): Json<SubmitBatchRequestDto>,
) -> Result<impl IntoResponse, AppError>
where
    R: TaskRepository + 'static,
{
    payload.validate()?;

    let records = payload.queries();
    let total_records = records.len();
    let task_id = service
        .submit(
            records,
            payload.locale(&defaults.locale),
            payload.credentials(),
            payload.mode.unwrap_or(defaults.mode),
        )
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitBatchResponseDto {
            task_id,
            total_records,
            message: format!("Processing {} records", total_records),
        }),
    ))
}

/// 查询任务状态
pub async fn get_task_status<R>(
    Extension(service): Extension<Arc<BatchService<R>>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponseDto>, AppError>
where
    R: TaskRepository + 'static,
{
    let state = service.get_state(&task_id).await?;
    Ok(Json(state.into()))
}

/// 未找到记录报告
pub async fn get_not_found<R>(
    Extension(service): Extension<Arc<BatchService<R>>>,
    Path(task_id): Path<String>,
) -> Result<Json<NotFoundReport>, AppError>
where
    R: TaskRepository + 'static,
{
    Ok(Json(service.get_not_found(&task_id).await?))
}

/// 下载CSV结果
pub async fn download_results<R>(
    Extension(service): Extension<Arc<BatchService<R>>>,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, AppError>
where
    R: TaskRepository + 'static,
{
    let csv = service.export_csv(&task_id).await?;
    let disposition = format!(
        "attachment; filename=\"{}_results_{}.csv\"",
        service.config().platform_label.to_lowercase(),
        task_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// 重新查询未找到的记录
pub async fn requery_not_found<R>(
    Extension(service): Extension<Arc<BatchService<R>>>,
    Path(task_id): Path<String>,
) -> Result<Json<RequeryResponseDto>, AppError>
where
    R: TaskRepository + 'static,
{
    let outcome = service.requery(&task_id).await?;
    Ok(Json(RequeryResponseDto::new(&task_id, outcome)))
}
