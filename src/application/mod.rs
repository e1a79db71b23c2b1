// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用层模块
///
/// 负责请求数据的校验与转换，连接表示层与领域服务
pub mod dto;
