// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 批处理服务（batch_service）：任务提交、进度查询、重新查询与导出
/// - 候选过滤（candidate_filter）：按平台域名筛选搜索结果
/// - 分类服务（llm_classifier、rule_classifier）：判定最佳页面
/// - 解析器（resolver）：单条商家记录的搜索与分类流程
pub mod batch_service;
pub mod candidate_filter;
pub mod llm_classifier;
pub mod llm_service;
pub mod name_matcher;
pub mod resolver;
pub mod rule_classifier;
pub mod url_classifier;
