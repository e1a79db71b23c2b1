// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::models::business::Locale;
use crate::domain::models::task::{Credentials, ExecutionMode};

/// 应用程序配置设置
///
/// 包含服务器、目标平台、搜索、分类服务、批处理和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 目标平台配置
    pub platform: PlatformSettings,
    /// 搜索服务配置
    pub search: SearchSettings,
    /// 分类服务配置
    pub llm: LlmSettings,
    /// 分类策略配置
    pub classifier: ClassifierSettings,
    /// 批处理配置
    pub batch: BatchSettings,
    /// 默认地区
    pub locale: LocaleSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 目标平台配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformSettings {
    /// 平台域名，用于 `site:` 限定与候选过滤
    pub domain: String,
    /// 平台展示名称
    pub label: String,
}

/// 搜索服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// 默认API密钥，提交时未提供则使用
    pub api_key: Option<String>,
    /// 默认自定义搜索引擎ID
    pub engine_id: Option<String>,
    pub base_url: String,
    /// 请求的最大结果数
    pub max_results: u32,
    pub timeout_secs: u64,
}

/// 分类服务配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

/// 分类策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// 委托外部推理服务
    Llm,
    /// 仅使用URL路径规则
    Rules,
}

impl ClassifierStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierStrategy::Llm => "llm",
            ClassifierStrategy::Rules => "rules",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    pub strategy: ClassifierStrategy,
}

/// 批处理配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSettings {
    /// 默认执行模式
    pub mode: ExecutionMode,
    /// 相邻两次解析之间的间隔（毫秒）
    pub pacing_delay_ms: u64,
    /// 并行模式下的并发上限
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleSettings {
    pub country_code: String,
    pub language: String,
}

/// 指标导出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    /// Prometheus 监听地址
    pub address: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载内置默认值、`config/default`、`config/{APP_ENVIRONMENT}`
    /// 以及 `PAGERESOLVER__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("PAGERESOLVER").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 只包含内置默认值的配置构建器
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("platform.domain", "facebook.com")?
            .set_default("platform.label", "Facebook")?
            .set_default("search.base_url", "https://www.googleapis.com/customsearch/v1")?
            .set_default("search.max_results", 20)?
            .set_default("search.timeout_secs", 30)?
            .set_default("llm.model", "gpt-4o")?
            .set_default("llm.base_url", "https://api.openai.com/v1")?
            .set_default("llm.temperature", 0.1)?
            .set_default("llm.timeout_secs", 60)?
            .set_default("classifier.strategy", "llm")?
            .set_default("batch.mode", "sequential")?
            .set_default("batch.pacing_delay_ms", 500)?
            .set_default("batch.max_concurrency", 5)?
            .set_default("locale.country_code", "us")?
            .set_default("locale.language", "en")?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.address", "0.0.0.0:9000")
    }

    /// 服务器监听地址
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 配置中的默认凭据，空字符串视为未设置
    pub fn default_credentials(&self) -> Credentials {
        Credentials::new(
            non_blank(&self.search.api_key).unwrap_or_default(),
            non_blank(&self.search.engine_id).unwrap_or_default(),
            non_blank(&self.llm.api_key),
        )
    }

    pub fn default_locale(&self) -> Locale {
        Locale::new(&self.locale.country_code, &self.locale.language)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.batch.pacing_delay_ms)
    }

    pub fn requires_llm_key(&self) -> bool {
        self.classifier.strategy == ClassifierStrategy::Llm
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
