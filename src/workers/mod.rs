// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 批处理任务的后台执行
pub mod batch_worker;
pub mod worker;

pub use worker::Worker;
