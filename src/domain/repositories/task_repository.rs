// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{DomainError, TaskState};
use crate::domain::models::verdict::ResolvedRecord;
use async_trait::async_trait;
use thiserror::Error;

/// 仓库错误类型
#[derive(Error, Debug, PartialEq)]
pub enum RepositoryError {
    /// 记录未找到
    #[error("Task not found: {0}")]
    NotFound(String),
    /// 记录已存在
    #[error("Task already exists: {0}")]
    AlreadyExists(String),
    /// 写入违反任务状态约束
    #[error("Invalid task state: {0}")]
    InvalidState(#[from] DomainError),
}

/// 任务仓库特质
///
/// 任务标识到任务状态的映射，是各组件写入的唯一共享可变结构。
/// 同一任务只有一个写入者，不同任务之间互不争用。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: TaskState) -> Result<(), RepositoryError>;
    /// 根据ID查找任务，返回快照
    async fn find_by_id(&self, id: &str) -> Result<Option<TaskState>, RepositoryError>;
    /// 追加一条中间结果并刷新进度
    async fn push_result(&self, id: &str, record: ResolvedRecord)
        -> Result<f64, RepositoryError>;
    /// 按已完成数量刷新进度，进度只增不减
    async fn record_progress(&self, id: &str, completed: usize) -> Result<f64, RepositoryError>;
    /// 以完整结果完成任务
    async fn complete(&self, id: &str, results: Vec<ResolvedRecord>)
        -> Result<(), RepositoryError>;
    /// 当前保存的任务数量
    async fn count(&self) -> usize;
}
