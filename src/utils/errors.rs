// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::domain::repositories::task_repository::RepositoryError;

/// Worker错误类型
///
/// 只覆盖工作器自身的簿记失败，单条记录的解析失败不会出现在这里
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("仓库错误: {0}")]
    RepositoryError(#[from] RepositoryError),

    #[error("并发控制错误: {0}")]
    ConcurrencyError(String),
}
