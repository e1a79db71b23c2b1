// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{ClassifierStrategy, Settings};
use crate::domain::models::task::Credentials;
use crate::domain::search::engine::SearchEngine;
use crate::domain::services::llm_classifier::LlmClassifier;
use crate::domain::services::llm_service::LLMService;
use crate::domain::services::resolver::{Resolver, ResolverFactory, ResolverOptions};
use crate::domain::services::rule_classifier::RuleClassifier;
use crate::domain::services::url_classifier::UrlClassifier;
use crate::infrastructure::search::google::GoogleSearchEngine;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 解析器工厂配置
#[derive(Debug, Clone)]
pub struct ResolverFactoryConfig {
    pub strategy: ClassifierStrategy,
    pub search_base_url: String,
    pub llm_model: String,
    pub llm_base_url: String,
    pub llm_temperature: f32,
    pub llm_timeout: Duration,
    pub options: ResolverOptions,
}

impl ResolverFactoryConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            strategy: settings.classifier.strategy,
            search_base_url: settings.search.base_url.clone(),
            llm_model: settings.llm.model.clone(),
            llm_base_url: settings.llm.base_url.clone(),
            llm_temperature: settings.llm.temperature,
            llm_timeout: Duration::from_secs(settings.llm.timeout_secs),
            options: ResolverOptions {
                platform_domain: settings.platform.domain.clone(),
                platform_label: settings.platform.label.clone(),
                max_results: settings.search.max_results,
                search_timeout: Duration::from_secs(settings.search.timeout_secs),
            },
        }
    }
}

/// 默认解析器工厂
///
/// Google 搜索 + 按配置选择的分类策略
pub struct DefaultResolverFactory {
    config: ResolverFactoryConfig,
}

impl DefaultResolverFactory {
    pub fn new(config: ResolverFactoryConfig) -> Self {
        Self { config }
    }

    fn classifier(&self, credentials: &Credentials) -> Result<Arc<dyn UrlClassifier>> {
        let options = &self.config.options;
        match self.config.strategy {
            ClassifierStrategy::Rules => {
                Ok(Arc::new(RuleClassifier::new(options.platform_label.clone())))
            }
            ClassifierStrategy::Llm => {
                let api_key = credentials
                    .llm_api_key
                    .clone()
                    .ok_or_else(|| anyhow!("classification service API key is missing"))?;
                let llm = LLMService::new_with_config(
                    api_key,
                    self.config.llm_model.clone(),
                    self.config.llm_base_url.clone(),
                    self.config.llm_temperature,
                );
                Ok(Arc::new(LlmClassifier::new(
                    Arc::new(llm),
                    options.platform_domain.clone(),
                    options.platform_label.clone(),
                    self.config.llm_timeout,
                )))
            }
        }
    }
}

impl ResolverFactory for DefaultResolverFactory {
    fn create(&self, credentials: &Credentials) -> Result<Resolver> {
        let options = self.config.options.clone();
        let search: Arc<dyn SearchEngine> = Arc::new(GoogleSearchEngine::new(
            credentials.search_api_key.clone(),
            credentials.search_engine_id.clone(),
            self.config.search_base_url.clone(),
            options.search_timeout,
        )?);
        let classifier = self.classifier(credentials)?;
        debug!(
            "Resolver ready: search={}, classifier={}",
            search.name(),
            classifier.name()
        );
        Ok(Resolver::new(search, classifier, options))
    }
}
