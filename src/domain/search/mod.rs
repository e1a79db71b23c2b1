// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索提供方抽象
///
/// 解析器只依赖这里的特质，具体的API客户端位于基础设施层
pub mod engine;
