// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::TaskState;
use crate::domain::models::verdict::ResolvedRecord;
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// 内存任务仓库
///
/// 基于DashMap实现，每个分片独立加锁，不同任务之间的写入互不阻塞。
/// 任务在进程生命周期内保留，清理策略由调用方决定。
#[derive(Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<DashMap<String, TaskState>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_task<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut TaskState) -> Result<T, RepositoryError>,
    ) -> Result<T, RepositoryError> {
        let mut task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        f(task.value_mut())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: TaskState) -> Result<(), RepositoryError> {
        match self.tasks.entry(task.id.clone()) {
            Entry::Occupied(entry) => Err(RepositoryError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(task);
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TaskState>, RepositoryError> {
        Ok(self.tasks.get(id).map(|task| task.value().clone()))
    }

    async fn push_result(
        &self,
        id: &str,
        record: ResolvedRecord,
    ) -> Result<f64, RepositoryError> {
        self.with_task(id, |task| {
            task.push_result(record)?;
            Ok(task.progress)
        })
    }

    async fn record_progress(&self, id: &str, completed: usize) -> Result<f64, RepositoryError> {
        self.with_task(id, |task| {
            task.record_progress(completed)?;
            Ok(task.progress)
        })
    }

    async fn complete(
        &self,
        id: &str,
        results: Vec<ResolvedRecord>,
    ) -> Result<(), RepositoryError> {
        self.with_task(id, |task| Ok(task.complete(results)?))
    }

    async fn count(&self) -> usize {
        self.tasks.len()
    }
}
