// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含的子模块：
/// - 指标（metrics）：Prometheus 指标导出
/// - 仓库实现（repositories）：任务仓库的内存实现
/// - 搜索（search）：Google 搜索客户端与解析器工厂
pub mod metrics;
pub mod repositories;
pub mod search;
