// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：商家记录、搜索结果、分类结论与任务状态
/// - 仓库接口（repositories）：任务状态持久化抽象接口
/// - 搜索（search）：搜索引擎抽象
/// - 服务（services）：候选过滤、分类与批处理编排
///
/// 领域层不依赖于任何外部实现。
pub mod models;
pub mod repositories;
pub mod search;
pub mod services;
