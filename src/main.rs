// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use pageresolver::config::settings::Settings;
use pageresolver::domain::services::batch_service::{BatchService, BatchServiceConfig};
use pageresolver::infrastructure::metrics::init_metrics;
use pageresolver::infrastructure::repositories::task_repo_impl::InMemoryTaskRepository;
use pageresolver::infrastructure::search::{DefaultResolverFactory, ResolverFactoryConfig};
use pageresolver::presentation::handlers::task_handler::SubmissionDefaults;
use pageresolver::presentation::routes::{self, HealthInfo};
use pageresolver::utils::telemetry;
use pageresolver::workers::batch_worker::BatchOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // 2. Initialize logging
    telemetry::init_telemetry();
    info!("Starting pageresolver...");

    // 3. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    init_metrics(&settings.metrics)?;

    // 4. Initialize Components
    let default_credentials = settings.default_credentials();
    let search_configured = !default_credentials.search_api_key.is_empty()
        && !default_credentials.search_engine_id.is_empty();
    let llm_configured = default_credentials.llm_api_key.is_some();
    if !search_configured {
        warn!("No default search credentials configured; submissions must supply their own");
    }

    let task_repo = Arc::new(InMemoryTaskRepository::new());
    let factory = Arc::new(DefaultResolverFactory::new(
        ResolverFactoryConfig::from_settings(&settings),
    ));
    let service = Arc::new(BatchService::new(
        task_repo,
        factory,
        BatchServiceConfig {
            batch: BatchOptions {
                pacing_delay: settings.pacing_delay(),
                max_concurrency: settings.batch.max_concurrency,
            },
            default_credentials,
            requires_llm_key: settings.requires_llm_key(),
            platform_label: settings.platform.label.clone(),
        },
    ));

    let defaults = SubmissionDefaults {
        locale: settings.default_locale(),
        mode: settings.batch.mode,
    };
    let health = HealthInfo {
        status: "healthy",
        search_api_configured: search_configured,
        llm_api_configured: llm_configured,
        classifier_strategy: settings.classifier.strategy.as_str().to_string(),
    };

    // 5. Setup Router
    let app = routes::routes(service, defaults, health);

    let addr = settings.server_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
