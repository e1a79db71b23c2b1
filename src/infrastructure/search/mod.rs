// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 搜索服务模块
///
/// 提供 Google Custom Search 客户端以及按凭据构建解析器的工厂
pub mod factory;
pub mod google;

pub use factory::{DefaultResolverFactory, ResolverFactoryConfig};
