// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::search_hit::SearchHit;

/// 候选结果过滤器
///
/// 只保留URL中包含目标平台域名的结果（不区分大小写），不改变顺序。
/// 语义判断全部交给分类器，宁可误留也不漏掉。
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    domain: String,
}

impl CandidateFilter {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into().trim().to_lowercase(),
        }
    }

    pub fn filter(&self, hits: &[SearchHit]) -> Vec<SearchHit> {
        hits.iter()
            .filter(|hit| self.matches(&hit.url))
            .cloned()
            .collect()
    }

    pub fn matches(&self, url: &str) -> bool {
        !self.domain.is_empty() && url.to_lowercase().contains(&self.domain)
    }
}
