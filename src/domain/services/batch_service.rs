// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::domain::models::business::{BusinessQuery, Locale};
use crate::domain::models::task::{
    new_requery_task_id, new_task_id, Credentials, ExecutionMode, TaskConfig, TaskState,
};
use crate::domain::models::verdict::{ClassificationVerdict, ResolvedRecord};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::domain::services::resolver::ResolverFactory;
use crate::workers::batch_worker::{BatchOptions, BatchWorker};
use crate::workers::worker::Worker;

/// 批处理服务错误
#[derive(Error, Debug)]
pub enum BatchServiceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task {0} is still processing")]
    IncompleteTask(String),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to prepare resolver: {0}")]
    ResolverUnavailable(String),
}

/// 重新查询的结果
#[derive(Debug, Clone, PartialEq)]
pub enum RequeryOutcome {
    /// 没有需要重新查询的记录，未创建新任务
    NoOp,
    /// 已提交新任务
    Submitted { task_id: String, count: usize },
}

/// 未解析记录报告
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundReport {
    pub task_id: String,
    pub not_found_count: usize,
    pub total_count: usize,
    pub not_found_records: Vec<BusinessQuery>,
}

/// 批处理服务配置
#[derive(Debug, Clone)]
pub struct BatchServiceConfig {
    pub batch: BatchOptions,
    /// 提交时未提供凭据字段时使用的默认值
    pub default_credentials: Credentials,
    /// 当前分类策略是否需要分类服务密钥
    pub requires_llm_key: bool,
    /// 导出表头中使用的平台名称
    pub platform_label: String,
}

impl Default for BatchServiceConfig {
    fn default() -> Self {
        Self {
            batch: BatchOptions::default(),
            default_credentials: Credentials::default(),
            requires_llm_key: true,
            platform_label: "Facebook".to_string(),
        }
    }
}

/// 批处理服务
///
/// 任务提交边界：校验输入、创建任务状态、启动工作器，并提供状态查询、
/// 未解析记录报告、CSV导出和重新查询。
pub struct BatchService<R>
where
    R: TaskRepository + 'static,
{
    repository: Arc<R>,
    factory: Arc<dyn ResolverFactory>,
    config: BatchServiceConfig,
}

impl<R> BatchService<R>
where
    R: TaskRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        factory: Arc<dyn ResolverFactory>,
        config: BatchServiceConfig,
    ) -> Self {
        Self {
            repository,
            factory,
            config,
        }
    }

    pub fn config(&self) -> &BatchServiceConfig {
        &self.config
    }

    /// 提交批处理任务
    ///
    /// # 参数
    /// * `records` - 待解析的商户，顺序即结果顺序
    /// * `locale` - 搜索使用的国家与语言
    /// * `credentials` - 提交方凭据，空字段回退到默认配置
    /// * `mode` - 执行模式
    ///
    /// # 返回值
    /// 新任务的标识，任务在后台运行
    pub async fn submit(
        &self,
        records: Vec<BusinessQuery>,
        locale: Locale,
        credentials: Credentials,
        mode: ExecutionMode,
    ) -> Result<String, BatchServiceError> {
        validate_records(&records)?;
        validate_locale(&locale)?;
        let credentials = self.resolve_credentials(credentials)?;

        let task_id = new_task_id();
        let config = TaskConfig {
            locale,
            credentials,
            mode,
        };
        self.launch(TaskState::new(task_id.clone(), records.len(), config), records)
            .await?;
        counter!("batches_submitted_total").increment(1);
        Ok(task_id)
    }

    /// 获取任务状态快照
    pub async fn get_state(&self, task_id: &str) -> Result<TaskState, BatchServiceError> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| BatchServiceError::TaskNotFound(task_id.to_string()))
    }

    /// 重新查询未解析的记录
    ///
    /// 新任务沿用原任务的凭据、地区和执行模式，与原任务完全独立
    pub async fn requery(&self, task_id: &str) -> Result<RequeryOutcome, BatchServiceError> {
        let original = self.completed_state(task_id).await?;
        let records = original.unresolved_queries();
        if records.is_empty() {
            info!("Task {} has no unresolved records; nothing to requery", task_id);
            return Ok(RequeryOutcome::NoOp);
        }

        let requery_id = new_requery_task_id();
        let count = records.len();
        let state = TaskState::new(requery_id.clone(), count, original.config.clone())
            .with_parent(task_id);
        self.launch(state, records).await?;

        counter!("requery_submitted_total").increment(1);
        info!(
            "Requery {} submitted for {} unresolved records of task {}",
            requery_id, count, task_id
        );
        Ok(RequeryOutcome::Submitted {
            task_id: requery_id,
            count,
        })
    }

    /// 未找到或出错记录的报告
    pub async fn get_not_found(&self, task_id: &str) -> Result<NotFoundReport, BatchServiceError> {
        let state = self.completed_state(task_id).await?;
        let not_found_records = state.unresolved_queries();
        Ok(NotFoundReport {
            task_id: state.id.clone(),
            not_found_count: not_found_records.len(),
            total_count: state.total,
            not_found_records,
        })
    }

    /// 导出CSV，行顺序与输入一致
    pub async fn export_csv(&self, task_id: &str) -> Result<String, BatchServiceError> {
        let state = self.completed_state(task_id).await?;
        Ok(render_csv(&state, &self.config.platform_label))
    }

    async fn completed_state(&self, task_id: &str) -> Result<TaskState, BatchServiceError> {
        let state = self.get_state(task_id).await?;
        if !state.is_completed() {
            return Err(BatchServiceError::IncompleteTask(task_id.to_string()));
        }
        Ok(state)
    }

    async fn launch(
        &self,
        state: TaskState,
        records: Vec<BusinessQuery>,
    ) -> Result<(), BatchServiceError> {
        let resolver = self
            .factory
            .create(&state.config.credentials)
            .map_err(|e| BatchServiceError::ResolverUnavailable(e.to_string()))?;

        let task_id = state.id.clone();
        let locale = state.config.locale.clone();
        let mode = state.config.mode;
        info!(
            "Submitting task {} with {} records ({} mode, {})",
            task_id,
            records.len(),
            mode,
            locale
        );
        self.repository.create(state).await?;

        let repository = self.repository.clone();
        let worker = BatchWorker::new(
            task_id.clone(),
            records.clone(),
            locale,
            mode,
            resolver,
            repository.clone(),
            self.config.batch.clone(),
        );
        let worker_name = worker.name();
        tokio::spawn(async move {
            // Run in a child task so a panic surfaces as a JoinError here.
            let reason = match tokio::spawn(async move { worker.run().await }).await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("worker aborted: {}", e),
            };
            error!("{} failed: {}", worker_name, reason);
            counter!("batches_failed_total").increment(1);
            if let Err(e) = seal_failed_task(repository.as_ref(), &task_id, &records, &reason).await {
                error!("Could not complete failed task {}: {}", task_id, e);
            }
        });
        Ok(())
    }

    fn resolve_credentials(&self, supplied: Credentials) -> Result<Credentials, BatchServiceError> {
        let defaults = &self.config.default_credentials;
        let credentials = Credentials {
            search_api_key: or_default(supplied.search_api_key, &defaults.search_api_key),
            search_engine_id: or_default(supplied.search_engine_id, &defaults.search_engine_id),
            llm_api_key: supplied
                .llm_api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .or_else(|| defaults.llm_api_key.clone()),
        };

        if credentials.search_api_key.is_empty() {
            return Err(BatchServiceError::Validation(
                "search API key is required".to_string(),
            ));
        }
        if credentials.search_engine_id.is_empty() {
            return Err(BatchServiceError::Validation(
                "search engine ID is required".to_string(),
            ));
        }
        if self.config.requires_llm_key && credentials.llm_api_key.is_none() {
            return Err(BatchServiceError::Validation(
                "classification service API key is required".to_string(),
            ));
        }
        Ok(credentials)
    }
}

/// 工作器异常退出后完成任务
///
/// 保留已写入的中间结果，其余记录标记为错误，任务不会停留在处理中
async fn seal_failed_task<R: TaskRepository + ?Sized>(
    repository: &R,
    task_id: &str,
    records: &[BusinessQuery],
    reason: &str,
) -> Result<(), RepositoryError> {
    let Some(state) = repository.find_by_id(task_id).await? else {
        return Err(RepositoryError::NotFound(task_id.to_string()));
    };
    if state.is_completed() {
        return Ok(());
    }

    let mut results = state.results;
    results.truncate(records.len());
    let resolved = results.len();
    results.extend(records[resolved..].iter().cloned().map(|query| {
        ResolvedRecord::new(
            query,
            ClassificationVerdict::error(format!("Batch worker failed: {}", reason)),
        )
    }));
    warn!(
        "Task {} sealed after worker failure: {} of {} records kept",
        task_id,
        resolved,
        records.len()
    );
    repository.complete(task_id, results).await
}

fn or_default(value: String, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.trim().to_string()
    } else {
        value.to_string()
    }
}

fn validate_records(records: &[BusinessQuery]) -> Result<(), BatchServiceError> {
    if records.is_empty() {
        return Err(BatchServiceError::Validation(
            "at least one record is required".to_string(),
        ));
    }
    if let Some(index) = records.iter().position(|r| r.is_blank()) {
        return Err(BatchServiceError::Validation(format!(
            "record {} has an empty business_name",
            index + 1
        )));
    }
    Ok(())
}

fn validate_locale(locale: &Locale) -> Result<(), BatchServiceError> {
    if locale.country_code.is_empty() || locale.language.is_empty() {
        return Err(BatchServiceError::Validation(
            "country_code and language must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// 按RFC 4180生成导出表格
pub fn render_csv(state: &TaskState, platform_label: &str) -> String {
    let header = format!(
        "Business Name,Location,{} URL,Type,Confidence,Notes",
        platform_label
    );
    let mut lines = Vec::with_capacity(state.results.len() + 1);
    lines.push(header);
    for record in &state.results {
        let row = [
            csv_field(&record.query.business_name),
            csv_field(&record.query.location),
            csv_field(&record.verdict.url),
            csv_field(&record.verdict.kind.to_string()),
            format!("{:.2}", record.verdict.confidence),
            csv_field(&record.verdict.explanation),
        ];
        lines.push(row.join(","));
    }
    let mut csv = lines.join("\r\n");
    csv.push_str("\r\n");
    csv
}
