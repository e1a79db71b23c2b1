// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use futures::future::join_all;
use metrics::counter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::business::{BusinessQuery, Locale};
use crate::domain::models::task::ExecutionMode;
use crate::domain::models::verdict::ResolvedRecord;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::resolver::Resolver;
use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 批处理调度参数
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 相邻两次解析之间的间隔
    pub pacing_delay: Duration,
    /// 并行模式下同时进行的解析数量上限
    pub max_concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(500),
            max_concurrency: 5,
        }
    }
}

/// 批处理工作器
///
/// 对一个任务的全部记录运行解析器，并把进度和结果写回任务仓库。
///
/// - 顺序模式：结果逐条追加，最后一条由完成写入一并提交
/// - 并行模式：结果在完成写入前始终为空，进度按完成数量递增
pub struct BatchWorker<R>
where
    R: TaskRepository,
{
    task_id: String,
    records: Vec<BusinessQuery>,
    locale: Locale,
    mode: ExecutionMode,
    resolver: Resolver,
    repository: Arc<R>,
    options: BatchOptions,
}

impl<R> BatchWorker<R>
where
    R: TaskRepository,
{
    pub fn new(
        task_id: impl Into<String>,
        records: Vec<BusinessQuery>,
        locale: Locale,
        mode: ExecutionMode,
        resolver: Resolver,
        repository: Arc<R>,
        options: BatchOptions,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            records,
            locale,
            mode,
            resolver,
            repository,
            options,
        }
    }

    async fn run_sequential(&self) -> Result<Vec<ResolvedRecord>, WorkerError> {
        let total = self.records.len();
        let mut results = Vec::with_capacity(total);

        for (index, query) in self.records.iter().enumerate() {
            let record = self.resolver.resolve(query, &self.locale).await;
            results.push(record.clone());

            if index + 1 < total {
                let progress = self.repository.push_result(&self.task_id, record).await?;
                debug!("Task {} progress {:.1}%", self.task_id, progress);
                sleep(self.options.pacing_delay).await;
            }
        }

        Ok(results)
    }

    async fn run_parallel(&self) -> Result<Vec<ResolvedRecord>, WorkerError> {
        let semaphore = Semaphore::new(self.options.max_concurrency.max(1));
        let completed = AtomicUsize::new(0);

        let resolutions = self.records.iter().map(|query| {
            let semaphore = &semaphore;
            let completed = &completed;
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| WorkerError::ConcurrencyError(e.to_string()))?;

                let record = self.resolver.resolve(query, &self.locale).await;
                sleep(self.options.pacing_delay).await;

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                match self.repository.record_progress(&self.task_id, done).await {
                    Ok(progress) => debug!("Task {} progress {:.1}%", self.task_id, progress),
                    Err(e) => warn!("Failed to record progress for task {}: {}", self.task_id, e),
                }
                Ok::<_, WorkerError>(record)
            }
        });

        // Gathered in input order, not completion order.
        join_all(resolutions).await.into_iter().collect()
    }
}

#[async_trait]
impl<R> Worker for BatchWorker<R>
where
    R: TaskRepository + 'static,
{
    #[instrument(skip(self), fields(task_id = %self.task_id, mode = %self.mode))]
    async fn run(&self) -> Result<(), WorkerError> {
        info!("Processing {} records", self.records.len());

        let results = match self.mode {
            ExecutionMode::Sequential => self.run_sequential().await?,
            ExecutionMode::Parallel => self.run_parallel().await?,
        };

        let unresolved = results.iter().filter(|r| r.is_unresolved()).count();
        self.repository.complete(&self.task_id, results).await?;
        counter!("batches_completed_total").increment(1);

        info!(
            "Task completed: {} of {} records unresolved",
            unresolved,
            self.records.len()
        );
        Ok(())
    }

    fn name(&self) -> String {
        format!("batch-worker-{}", self.task_id)
    }
}
