// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::business::Locale;
use crate::domain::models::task::{ExecutionMode, MaskedCredentials, TaskState, TaskStatus};
use crate::domain::models::verdict::ResolvedRecord;
use crate::domain::services::batch_service::RequeryOutcome;

/// 任务状态响应
///
/// 凭据只以脱敏形式出现
#[derive(Debug, Serialize)]
pub struct TaskStatusResponseDto {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: f64,
    pub total: usize,
    pub completed_count: usize,
    pub not_found_count: usize,
    pub results: Vec<ResolvedRecord>,
    pub config: TaskConfigDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TaskConfigDto {
    #[serde(flatten)]
    pub locale: Locale,
    pub mode: ExecutionMode,
    pub credentials: MaskedCredentials,
}

impl From<TaskState> for TaskStatusResponseDto {
    fn from(state: TaskState) -> Self {
        let completed_count = state.results.len();
        let not_found_count = state.not_found_count();
        Self {
            completed_count,
            not_found_count,
            config: TaskConfigDto {
                locale: state.config.locale.clone(),
                mode: state.config.mode,
                credentials: state.config.credentials.masked(),
            },
            task_id: state.id,
            status: state.status,
            progress: state.progress,
            total: state.total,
            results: state.results,
            parent_task_id: state.parent_task_id,
            created_at: state.created_at,
            updated_at: state.updated_at,
            completed_at: state.completed_at,
        }
    }
}

/// 重新查询响应
#[derive(Debug, Serialize, Deserialize)]
pub struct RequeryResponseDto {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requery_task_id: Option<String>,
    pub not_found_count: usize,
}

impl RequeryResponseDto {
    pub fn new(original_task_id: &str, outcome: RequeryOutcome) -> Self {
        match outcome {
            RequeryOutcome::NoOp => Self {
                message: "No records to requery - all were found!".to_string(),
                original_task_id: None,
                requery_task_id: None,
                not_found_count: 0,
            },
            RequeryOutcome::Submitted { task_id, count } => Self {
                message: format!("Requerying {} not found records", count),
                original_task_id: Some(original_task_id.to_string()),
                requery_task_id: Some(task_id),
                not_found_count: count,
            },
        }
    }
}
