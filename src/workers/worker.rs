// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::WorkerError;
use async_trait::async_trait;

/// Worker trait定义
///
/// 每个批处理任务由一个工作器驱动，运行到任务完成为止
#[async_trait]
pub trait Worker: Send + Sync {
    /// 运行工作器，直到任务进入终态
    async fn run(&self) -> Result<(), WorkerError>;

    /// 获取工作器名称，用于日志
    fn name(&self) -> String;
}
