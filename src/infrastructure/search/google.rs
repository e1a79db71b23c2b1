// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::business::Locale;
use crate::domain::models::search_hit::SearchHit;
use crate::domain::search::engine::{SearchEngine, SearchError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Google Custom Search JSON API 默认地址
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// 单次请求允许的最大结果数
const MAX_RESULTS_PER_CALL: u32 = 10;

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    items: Option<Vec<GoogleSearchItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleSearchItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Google 搜索引擎实现
///
/// 基于 Custom Search JSON API，API密钥与搜索引擎ID在构造时绑定
pub struct GoogleSearchEngine {
    client: Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

impl GoogleSearchEngine {
    pub fn new(
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SearchError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            base_url: base_url.into(),
        })
    }

    fn error_message(status: StatusCode, body: &str) -> String {
        serde_json::from_str::<GoogleErrorResponse>(body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            })
    }
}

#[async_trait]
impl SearchEngine for GoogleSearchEngine {
    async fn search(
        &self,
        query: &str,
        locale: &Locale,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, SearchError> {
        if self.api_key.is_empty() || self.engine_id.is_empty() {
            return Err(SearchError::MissingCredentials(
                "Google API key and search engine ID are required".to_string(),
            ));
        }

        let num = max_results.clamp(1, MAX_RESULTS_PER_CALL).to_string();
        let language = format!("lang_{}", locale.language);
        debug!("Google search: {} (num={}, {})", query, num, locale);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("gl", locale.country_code.as_str()),
                ("lr", language.as_str()),
                ("safe", "off"),
            ])
            .send()
            .await
            .map_err(|e| SearchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::error_message(status, &body);
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(SearchError::RateLimitExceeded(message));
            }
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let google_resp: GoogleSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::NetworkError(format!("Invalid response body: {}", e)))?;

        let hits = google_resp
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                SearchHit::new(
                    item.link.unwrap_or_default(),
                    item.title.unwrap_or_default(),
                    item.snippet.unwrap_or_default(),
                )
            })
            .collect();

        Ok(hits)
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
