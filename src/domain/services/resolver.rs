// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::domain::models::business::{BusinessQuery, Locale};
use crate::domain::models::search_hit::SearchHit;
use crate::domain::models::task::Credentials;
use crate::domain::models::verdict::{ClassificationVerdict, ResolvedRecord};
use crate::domain::search::engine::{SearchEngine, SearchError};
use crate::domain::services::candidate_filter::CandidateFilter;
use crate::domain::services::url_classifier::UrlClassifier;

/// 解析器参数
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// 目标平台域名，用于 `site:` 限定和候选过滤
    pub platform_domain: String,
    /// 平台展示名称
    pub platform_label: String,
    /// 请求的最大结果数，搜索服务可能进一步截断
    pub max_results: u32,
    /// 搜索调用超时
    pub search_timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            platform_domain: "facebook.com".to_string(),
            platform_label: "Facebook".to_string(),
            max_results: 20,
            search_timeout: Duration::from_secs(30),
        }
    }
}

/// 单条记录解析器
///
/// 负责 查询构造 → 搜索 → 过滤 → 分类 的完整流程。`resolve` 对任何输入
/// 都返回一条结果，搜索失败会被转换为 `error` 结论而不会向上传播。
#[derive(Clone)]
pub struct Resolver {
    search: Arc<dyn SearchEngine>,
    classifier: Arc<dyn UrlClassifier>,
    filter: CandidateFilter,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(
        search: Arc<dyn SearchEngine>,
        classifier: Arc<dyn UrlClassifier>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            search,
            classifier,
            filter: CandidateFilter::new(options.platform_domain.clone()),
            options,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// 构造限定平台域名的搜索语句
    pub fn build_query(&self, query: &BusinessQuery) -> String {
        format!(
            "site:{} {} {}",
            self.options.platform_domain,
            query.business_name.trim(),
            query.location.trim()
        )
        .trim_end()
        .to_string()
    }

    /// 解析一条记录
    pub async fn resolve(&self, query: &BusinessQuery, locale: &Locale) -> ResolvedRecord {
        let started = Instant::now();
        info!(
            "Resolving '{}' in '{}' ({})",
            query.business_name, query.location, locale
        );

        let verdict = self.resolve_verdict(query, locale).await;

        info!(
            "Resolved '{}': {} ({:.2}) {}",
            query.business_name, verdict.kind, verdict.confidence, verdict.url
        );
        counter!("records_resolved_total", "kind" => verdict.kind.to_string()).increment(1);
        histogram!("record_resolution_seconds").record(started.elapsed().as_secs_f64());

        ResolvedRecord::new(query.clone(), verdict)
    }

    async fn resolve_verdict(&self, query: &BusinessQuery, locale: &Locale) -> ClassificationVerdict {
        let search_query = self.build_query(query);

        let hits = match self.search_with_timeout(&search_query, locale).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(
                    "Search via {} failed for '{}': {}",
                    self.search.name(),
                    query.business_name,
                    e
                );
                return ClassificationVerdict::error(format!(
                    "Search error: {}",
                    e.provider_message()
                ));
            }
        };

        if hits.is_empty() {
            return ClassificationVerdict::not_found(format!(
                "No {} pages found for '{}' in '{}' ({})",
                self.options.platform_label, query.business_name, query.location, locale
            ));
        }

        let candidates = self.filter.filter(&hits);
        if candidates.is_empty() {
            return ClassificationVerdict::not_found(format!(
                "No {} URLs found in search results",
                self.options.platform_label
            ));
        }

        self.classifier
            .classify(&query.business_name, &query.location, &candidates)
            .await
    }

    async fn search_with_timeout(
        &self,
        search_query: &str,
        locale: &Locale,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let timeout = self.options.search_timeout;
        tokio::time::timeout(
            timeout,
            self.search
                .search(search_query, locale, self.options.max_results),
        )
        .await
        .map_err(|_| SearchError::Timeout(timeout.as_secs()))?
    }
}

/// 解析器工厂
///
/// 将任务提交时的凭据绑定到具体的搜索与分类服务上
pub trait ResolverFactory: Send + Sync {
    fn create(&self, credentials: &Credentials) -> anyhow::Result<Resolver>;
}
