// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::business::{BusinessQuery, Locale};
use crate::domain::models::verdict::ResolvedRecord;

/// 外部服务凭据
///
/// 随任务配置完整保存以支持重新查询，对外展示时只显示前缀
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// 搜索API密钥
    pub search_api_key: String,
    /// 自定义搜索引擎ID
    pub search_engine_id: String,
    /// 分类服务API密钥，规则分类策略下可为空
    pub llm_api_key: Option<String>,
}

impl Credentials {
    pub fn new(
        search_api_key: impl Into<String>,
        search_engine_id: impl Into<String>,
        llm_api_key: Option<String>,
    ) -> Self {
        Self {
            search_api_key: search_api_key.into(),
            search_engine_id: search_engine_id.into(),
            llm_api_key,
        }
    }

    /// 返回脱敏后的凭据引用
    pub fn masked(&self) -> MaskedCredentials {
        MaskedCredentials {
            search_api_key: mask_secret(&self.search_api_key),
            search_engine_id: mask_secret(&self.search_engine_id),
            llm_api_key: self.llm_api_key.as_deref().map(mask_secret),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked = self.masked();
        f.debug_struct("Credentials")
            .field("search_api_key", &masked.search_api_key)
            .field("search_engine_id", &masked.search_engine_id)
            .field("llm_api_key", &masked.llm_api_key)
            .finish()
    }
}

/// 脱敏后的凭据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedCredentials {
    pub search_api_key: String,
    pub search_engine_id: String,
    pub llm_api_key: Option<String>,
}

fn mask_secret(secret: &str) -> String {
    let prefix: String = secret.chars().take(6).collect();
    format!("{}...", prefix)
}

/// 批处理执行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// 按输入顺序逐条处理，每条之间插入固定间隔
    #[default]
    Sequential,
    /// 受并发上限约束的并行处理
    Parallel,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// 任务配置快照
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    pub locale: Locale,
    pub credentials: Credentials,
    pub mode: ExecutionMode,
}

/// 任务状态枚举
///
/// 状态转换只有一次：Processing → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 处理中，结果可能不完整
    #[default]
    Processing,
    /// 已完成，结果与输入一一对应
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 批处理任务状态
///
/// 一次批量提交对应的可变进度与结果。`results.len() == total` 当且仅当
/// `status == Completed`。
#[derive(Debug, Clone)]
pub struct TaskState {
    /// 任务标识
    pub id: String,
    pub status: TaskStatus,
    /// 进度百分比 [0, 100]
    pub progress: f64,
    pub total: usize,
    /// 已产生的结果，处理中时可能不完整
    pub results: Vec<ResolvedRecord>,
    pub config: TaskConfig,
    /// 重新查询任务的来源任务，仅用于审计
    pub parent_task_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 生成新的任务标识
pub fn new_task_id() -> String {
    format!("task_{}", Uuid::new_v4().simple())
}

/// 生成新的重新查询任务标识
pub fn new_requery_task_id() -> String {
    format!("requery_{}", Uuid::new_v4().simple())
}

/// 根据已完成数量计算进度百分比
pub fn progress_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (completed.min(total) as f64 / total as f64) * 100.0
}

impl TaskState {
    /// 创建处于处理中状态的任务
    pub fn new(id: impl Into<String>, total: usize, config: TaskConfig) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            status: TaskStatus::Processing,
            progress: 0.0,
            total,
            results: Vec::new(),
            config,
            parent_task_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn with_parent(mut self, parent_task_id: impl Into<String>) -> Self {
        self.parent_task_id = Some(parent_task_id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// 追加一条中间结果（顺序模式）
    ///
    /// 处理中时结果数量必须严格小于总数，最后一条结果只能通过 `complete` 写入
    pub fn push_result(&mut self, record: ResolvedRecord) -> Result<(), DomainError> {
        if self.status != TaskStatus::Processing {
            return Err(DomainError::InvalidStateTransition(format!(
                "task {} is already {}",
                self.id, self.status
            )));
        }
        if self.results.len() + 1 >= self.total {
            return Err(DomainError::InvalidStateTransition(format!(
                "task {} would hold all {} results while still processing",
                self.id, self.total
            )));
        }
        self.results.push(record);
        self.raise_progress(progress_percent(self.results.len(), self.total));
        Ok(())
    }

    /// 记录已完成数量（并行模式），进度只增不减
    pub fn record_progress(&mut self, completed: usize) -> Result<(), DomainError> {
        if self.status != TaskStatus::Processing {
            return Err(DomainError::InvalidStateTransition(format!(
                "task {} is already {}",
                self.id, self.status
            )));
        }
        // Completed count never reaches 100% here; the completing write does that.
        let capped = completed.min(self.total.saturating_sub(1));
        self.raise_progress(progress_percent(capped, self.total));
        Ok(())
    }

    /// 完成任务
    ///
    /// 唯一一次将状态转为 Completed 的写入，结果必须与总数一致
    pub fn complete(&mut self, results: Vec<ResolvedRecord>) -> Result<(), DomainError> {
        if self.status != TaskStatus::Processing {
            return Err(DomainError::InvalidStateTransition(format!(
                "task {} is already {}",
                self.id, self.status
            )));
        }
        if results.len() != self.total {
            return Err(DomainError::ValidationError(format!(
                "expected {} results, got {}",
                self.total,
                results.len()
            )));
        }
        let now = Utc::now();
        self.results = results;
        self.status = TaskStatus::Completed;
        self.progress = 100.0;
        self.updated_at = now;
        self.completed_at = Some(now);
        Ok(())
    }

    /// 未找到或出错的记录数量
    pub fn not_found_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_unresolved()).count()
    }

    /// 提取未解析的商户，丢弃之前的结论
    pub fn unresolved_queries(&self) -> Vec<BusinessQuery> {
        self.results
            .iter()
            .filter(|r| r.is_unresolved())
            .map(|r| r.query.clone())
            .collect()
    }

    fn raise_progress(&mut self, progress: f64) {
        if progress > self.progress {
            self.progress = progress;
        }
        self.updated_at = Utc::now();
    }
}
