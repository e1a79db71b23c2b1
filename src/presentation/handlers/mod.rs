// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 任务提交、状态查询、未找到报告、CSV下载与重新查询
pub mod task_handler;
