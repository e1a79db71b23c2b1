// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::business::Locale;
use crate::domain::models::search_hit::SearchHit;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    #[error("Search API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    #[error("Timeout after {0}s")]
    Timeout(u64),
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

impl SearchError {
    /// 搜索服务返回的原始错误信息
    pub fn provider_message(&self) -> String {
        match self {
            SearchError::Api { message, .. } => message.clone(),
            SearchError::RateLimitExceeded(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Perform a search query, returning at most `max_results` hits
    async fn search(
        &self,
        query: &str,
        locale: &Locale,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, SearchError>;

    /// Get the name of the search engine
    fn name(&self) -> &'static str;
}
