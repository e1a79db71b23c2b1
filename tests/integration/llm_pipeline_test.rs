// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 通过 wiremock 模拟 Google 搜索和分类服务，验证默认工厂构建的完整流程

use pageresolver::config::settings::ClassifierStrategy;
use pageresolver::domain::models::business::{BusinessQuery, Locale};
use pageresolver::domain::models::task::{Credentials, ExecutionMode};
use pageresolver::domain::models::verdict::UrlKind;
use pageresolver::domain::services::batch_service::{
    BatchService, BatchServiceConfig, BatchServiceError,
};
use pageresolver::domain::services::resolver::{ResolverFactory, ResolverOptions};
use pageresolver::infrastructure::repositories::task_repo_impl::InMemoryTaskRepository;
use pageresolver::infrastructure::search::{DefaultResolverFactory, ResolverFactoryConfig};
use pageresolver::workers::batch_worker::BatchOptions;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn factory(server: &MockServer, strategy: ClassifierStrategy) -> DefaultResolverFactory {
    DefaultResolverFactory::new(ResolverFactoryConfig {
        strategy,
        search_base_url: format!("{}/customsearch/v1", server.uri()),
        llm_model: "gpt-4o".to_string(),
        llm_base_url: format!("{}/v1", server.uri()),
        llm_temperature: 0.1,
        llm_timeout: Duration::from_secs(5),
        options: ResolverOptions::default(),
    })
}

async fn mount_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .and(query_param("q", "site:facebook.com Tennis Club Ovada Ovada,IT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "title": "Tennis Club Ovada",
                    "link": "https://www.facebook.com/TennisClubOvada/",
                    "snippet": "Circolo tennis, Ovada"
                },
                {
                    "title": "Tennis Club Ovada - Recensioni",
                    "link": "https://www.tripadvisor.it/tennis-club-ovada",
                    "snippet": ""
                }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_completion(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        })))
        .mount(server)
        .await;
}

fn credentials() -> Credentials {
    Credentials::new("test-key", "test-cx", Some("sk-test".to_string()))
}

fn ovada() -> BusinessQuery {
    BusinessQuery::new("Tennis Club Ovada", "Ovada,IT")
}

#[tokio::test]
async fn test_fenced_delegate_verdict_is_adopted() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    mount_completion(
        &server,
        "```json\n{\"facebook_url\": \"https://www.facebook.com/TennisClubOvada/\", \"type\": \"page\", \"confidence\": 1.4, \"reasoning\": \"Exact name match\"}\n```",
    )
    .await;

    let resolver = factory(&server, ClassifierStrategy::Llm)
        .create(&credentials())
        .unwrap();
    let record = resolver.resolve(&ovada(), &Locale::new("it", "it")).await;

    assert_eq!(record.verdict.kind, UrlKind::Page);
    assert_eq!(record.verdict.url, "https://www.facebook.com/TennisClubOvada/");
    assert_eq!(record.verdict.confidence, 1.0);
    assert_eq!(record.verdict.explanation, "Exact name match");
}

#[tokio::test]
async fn test_unparseable_delegate_reply_falls_back_to_first_candidate() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    mount_completion(&server, "I think the first one is probably right.").await;

    let resolver = factory(&server, ClassifierStrategy::Llm)
        .create(&credentials())
        .unwrap();
    let record = resolver.resolve(&ovada(), &Locale::new("it", "it")).await;

    assert_eq!(record.verdict.kind, UrlKind::Unknown);
    assert_eq!(record.verdict.confidence, 0.5);
    assert_eq!(record.verdict.url, "https://www.facebook.com/TennisClubOvada/");
    assert!(record
        .verdict
        .explanation
        .starts_with("Classifier error - returning first result: Tennis Club Ovada"));
}

#[tokio::test]
async fn test_delegate_outage_falls_back_to_first_candidate() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let resolver = factory(&server, ClassifierStrategy::Llm)
        .create(&credentials())
        .unwrap();
    let record = resolver.resolve(&ovada(), &Locale::new("it", "it")).await;

    assert_eq!(record.verdict.kind, UrlKind::Unknown);
    assert_eq!(record.verdict.confidence, 0.5);
}

#[tokio::test]
async fn test_invalid_api_key_becomes_error_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
        })))
        .mount(&server)
        .await;

    let resolver = factory(&server, ClassifierStrategy::Rules)
        .create(&credentials())
        .unwrap();
    let record = resolver.resolve(&ovada(), &Locale::new("it", "it")).await;

    assert_eq!(record.verdict.kind, UrlKind::Error);
    assert_eq!(record.verdict.url, "Error");
    assert_eq!(record.verdict.confidence, 0.0);
    assert_eq!(
        record.verdict.explanation,
        "Search error: API key not valid. Please pass a valid API key."
    );
}

#[tokio::test]
async fn test_batch_through_default_factory() {
    let server = MockServer::start().await;
    mount_search(&server).await;
    Mock::given(method("GET"))
        .and(path("/customsearch/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let service = BatchService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(factory(&server, ClassifierStrategy::Rules)),
        BatchServiceConfig {
            batch: BatchOptions {
                pacing_delay: Duration::from_millis(5),
                max_concurrency: 5,
            },
            default_credentials: Credentials::new("test-key", "test-cx", None),
            requires_llm_key: false,
            platform_label: "Facebook".to_string(),
        },
    );

    let task_id = service
        .submit(
            vec![ovada(), BusinessQuery::new("Ghost Gym", "Nowhere")],
            Locale::new("it", "it"),
            Credentials::default(),
            ExecutionMode::Parallel,
        )
        .await
        .unwrap();

    let state = loop {
        let state = service.get_state(&task_id).await.unwrap();
        if state.is_completed() {
            break state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    };

    assert_eq!(state.results.len(), 2);
    assert_eq!(state.results[0].verdict.kind, UrlKind::Page);
    assert_eq!(state.results[1].verdict.kind, UrlKind::NotFound);
    assert_eq!(state.not_found_count(), 1);
}

#[tokio::test]
async fn test_llm_strategy_requires_key_at_submission() {
    let server = MockServer::start().await;
    let service = BatchService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(factory(&server, ClassifierStrategy::Llm)),
        BatchServiceConfig {
            default_credentials: Credentials::new("test-key", "test-cx", None),
            ..BatchServiceConfig::default()
        },
    );

    let err = service
        .submit(
            vec![ovada()],
            Locale::default(),
            Credentials::default(),
            ExecutionMode::Sequential,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BatchServiceError::Validation(_)));
}
