// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use config::{File, FileFormat};
use pageresolver::config::settings::{ClassifierStrategy, Settings};
use pageresolver::domain::models::business::Locale;
use pageresolver::domain::models::task::ExecutionMode;
use pageresolver::infrastructure::search::ResolverFactoryConfig;
use std::time::Duration;

const DEPLOYMENT_FILE: &str = r#"
[server]
port = 9100

[platform]
domain = "instagram.com"
label = "Instagram"

[search]
api_key = "AIzaSyFromFile"
engine_id = "file-cx"
max_results = 10

[classifier]
strategy = "rules"

[batch]
mode = "parallel"
max_concurrency = 3

[locale]
country_code = "IT"
language = "it"
"#;

fn load(contents: &str) -> Settings {
    Settings::defaults()
        .unwrap()
        .add_source(File::from_str(contents, FileFormat::Toml))
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

#[test]
fn test_file_overrides_builtin_defaults() {
    let settings = load(DEPLOYMENT_FILE);

    assert_eq!(settings.server_address(), "0.0.0.0:9100");
    assert_eq!(settings.platform.label, "Instagram");
    assert_eq!(settings.classifier.strategy, ClassifierStrategy::Rules);
    assert_eq!(settings.batch.mode, ExecutionMode::Parallel);
    assert_eq!(settings.batch.max_concurrency, 3);
    assert_eq!(settings.default_locale(), Locale::new("it", "it"));

    // untouched keys keep their defaults
    assert_eq!(settings.batch.pacing_delay_ms, 500);
    assert_eq!(settings.llm.timeout_secs, 60);

    let credentials = settings.default_credentials();
    assert_eq!(credentials.search_api_key, "AIzaSyFromFile");
    assert_eq!(credentials.search_engine_id, "file-cx");
}

#[test]
fn test_factory_config_follows_settings() {
    let config = ResolverFactoryConfig::from_settings(&load(DEPLOYMENT_FILE));

    assert_eq!(config.strategy, ClassifierStrategy::Rules);
    assert_eq!(config.options.platform_domain, "instagram.com");
    assert_eq!(config.options.max_results, 10);
    assert_eq!(config.options.search_timeout, Duration::from_secs(30));
    assert_eq!(config.llm_timeout, Duration::from_secs(60));
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let result = Settings::defaults()
        .unwrap()
        .add_source(File::from_str(
            "[classifier]\nstrategy = \"oracle\"\n",
            FileFormat::Toml,
        ))
        .build()
        .unwrap()
        .try_deserialize::<Settings>();
    assert!(result.is_err());
}
