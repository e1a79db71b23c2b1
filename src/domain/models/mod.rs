// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 商家记录（business）：待解析的商家与搜索地区
/// - 搜索结果（search_hit）：搜索引擎返回的单条结果
/// - 任务（task）：批处理任务状态、凭据与执行模式
/// - 分类结论（verdict）：页面类型、置信度与解析结果记录
pub mod business;
pub mod search_hit;
pub mod task;
pub mod verdict;
