// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::models::search_hit::SearchHit;
use crate::domain::models::verdict::{ClassificationVerdict, UrlKind, NOT_FOUND_URL};
use crate::domain::services::llm_service::LLMServiceTrait;
use crate::domain::services::rule_classifier::{RuleClassifier, DERIVED_PAGE_FACTOR};
use crate::domain::services::url_classifier::{
    analyze_url, UrlClassifier, UrlShape, GROUP_SEGMENT, SUBPAGE_SECTIONS,
};

/// 委托分类失败原因
///
/// 只在分类器内部使用，最终都会被转换为兜底结论
#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Classification timed out after {0}s")]
    Timeout(u64),
}

/// 结论字段可接受的键名，按优先级排列
const URL_KEYS: &[&str] = &["url", "facebook_url", "target_url"];
const KIND_KEYS: &[&str] = &["type"];
const CONFIDENCE_KEYS: &[&str] = &["confidence"];
const REASONING_KEYS: &[&str] = &["reasoning", "notes", "explanation"];

/// 委托给外部推理服务的分类器
pub struct LlmClassifier {
    llm: Arc<dyn LLMServiceTrait>,
    platform_domain: String,
    platform_label: String,
    timeout: Duration,
}

impl LlmClassifier {
    pub fn new(
        llm: Arc<dyn LLMServiceTrait>,
        platform_domain: impl Into<String>,
        platform_label: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            llm,
            platform_domain: platform_domain.into(),
            platform_label: platform_label.into(),
            timeout,
        }
    }

    /// 构造分类提示词
    pub fn build_prompt(&self, business_name: &str, location: &str, candidates: &[SearchHit]) -> String {
        let results = candidates
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                format!(
                    "Result {}:\nURL: {}\nTitle: {}\nDescription: {}\n",
                    i + 1,
                    hit.url,
                    non_empty_or(&hit.title, "N/A"),
                    non_empty_or(&hit.snippet, "N/A")
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let label = &self.platform_label;
        let domain = &self.platform_domain;
        let sections = SUBPAGE_SECTIONS
            .iter()
            .map(|s| format!("/{}", s))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"You analyze {label} search results to find the official page of a business.

BUSINESS NAME: {business_name}
LOCATION: {location}

SEARCH RESULTS (site:{domain}):
{results}

Select the BEST official {label} page for this business.

URL CLASSIFICATION RULES
1. Business pages (preferred), type "page":
   - clean vanity paths such as {domain}/TennisClubOvada/
   - modern paths such as {domain}/p/Tennis-Club-Le-Colline-61566371468729/
   - legacy paths such as {domain}/pages/Tennis-Club/123456789012345/
   - mobile hosts such as m.{domain}/TennisClubOvada/
2. Groups (acceptable only when no page exists), type "group":
   - any URL containing /{group}/ (case-insensitive)
3. Personal profiles (never select), type "other":
   - profile.php?id=<digits>
   - lowercase personal names joined by dots or hyphens, such as {domain}/john.smith.123/

Sub-pages are not the main page and must not be selected: {sections}.
Only select the main page URL without these paths.

SELECTION PRIORITY
1. A clean business page.
2. Otherwise a group.
3. Never a personal profile.

NAME MATCHING
Match "{business_name}" against the URL slug, the title and the description, and
look for "{location}" in the title or description. Allow for abbreviations,
partial names, word order changes and spaces versus concatenation.

RESPONSE FORMAT
Return ONLY a JSON object, no markdown:
{{
  "url": "the best URL or 'Not found'",
  "type": "page" | "group" | "other" | "not_found",
  "confidence": 0.0 to 1.0,
  "reasoning": "what type the URL is, why it matches the business, why it beats the other results"
}}"#,
            group = GROUP_SEGMENT,
        )
    }

    async fn delegate(&self, prompt: &str) -> Result<ClassificationVerdict, ClassificationError> {
        let raw = tokio::time::timeout(self.timeout, self.llm.complete(prompt))
            .await
            .map_err(|_| ClassificationError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| ClassificationError::Transport(e.to_string()))?;
        debug!("Classifier raw response: {}", raw);
        decode_verdict(&raw)
    }

    fn fallback(candidates: &[SearchHit], error: &ClassificationError) -> ClassificationVerdict {
        match candidates.first() {
            Some(first) => ClassificationVerdict::new(
                first.url.clone(),
                UrlKind::Unknown,
                0.5,
                format!(
                    "Classifier error - returning first result: {}. Error: {}",
                    first.title, error
                ),
            ),
            None => ClassificationVerdict::not_found(format!("Classifier error: {}", error)),
        }
    }
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// 去除包裹在结构化内容外的代码围栏
///
/// 支持 ```json、``` 以及大写语言标记，没有围栏时原样返回（去除首尾空白）
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the language tag on the opening line.
        text = match rest.find('\n') {
            Some(pos) if rest[..pos].chars().all(|c| c.is_ascii_alphanumeric()) => &rest[pos + 1..],
            _ => rest.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
        };
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// 取第一个存在且非空值的键
fn first_field<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|value| !value.is_null())
}

fn text_field(
    fields: &Map<String, Value>,
    keys: &[&str],
) -> Result<Option<String>, ClassificationError> {
    match first_field(fields, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ClassificationError::Decode(format!(
            "expected text for '{}', got {}",
            keys[0], other
        ))),
    }
}

fn parse_confidence(value: Option<&Value>) -> Result<f64, ClassificationError> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ClassificationError::Decode(format!("invalid confidence {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ClassificationError::Decode(format!("invalid confidence '{}'", s))),
        Some(other) => Err(ClassificationError::Decode(format!(
            "invalid confidence {}",
            other
        ))),
    }
}

/// 解析外部服务的原始文本为结论
///
/// 同一字段出现多个别名时取优先级最高的键。置信度会被限制到 [0, 1]。
/// 返回的URL按路径形态纠正类型：群组为 `group`，个人主页为 `other`，
/// 子栏目替换为其所属主页并打折扣
pub fn decode_verdict(raw: &str) -> Result<ClassificationVerdict, ClassificationError> {
    let payload = strip_code_fence(raw);
    let fields: Map<String, Value> = serde_json::from_str(payload)
        .map_err(|e| ClassificationError::Decode(e.to_string()))?;

    let mut url = text_field(&fields, URL_KEYS)?
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| NOT_FOUND_URL.to_string());
    let mut kind = text_field(&fields, KIND_KEYS)?
        .as_deref()
        .map(UrlKind::from_tag)
        .unwrap_or(UrlKind::NotFound);
    let mut confidence = parse_confidence(first_field(&fields, CONFIDENCE_KEYS))?;
    let mut explanation = text_field(&fields, REASONING_KEYS)?
        .unwrap_or_else(|| "Classification completed".to_string());

    match analyze_url(&url) {
        UrlShape::Group if kind == UrlKind::Page => kind = UrlKind::Group,
        UrlShape::Profile => kind = UrlKind::Other,
        UrlShape::SubPage {
            parent, section, ..
        } if matches!(kind, UrlKind::Page | UrlKind::Unknown) => {
            url = parent;
            kind = UrlKind::Page;
            confidence *= DERIVED_PAGE_FACTOR;
            explanation = format!("{} (main page derived from /{} sub-page)", explanation, section);
        }
        _ => {}
    }
    if url == NOT_FOUND_URL && !kind.is_unresolved() {
        kind = UrlKind::NotFound;
    }

    Ok(ClassificationVerdict::new(url, kind, confidence, explanation))
}

#[async_trait]
impl UrlClassifier for LlmClassifier {
    async fn classify(
        &self,
        business_name: &str,
        location: &str,
        candidates: &[SearchHit],
    ) -> ClassificationVerdict {
        if candidates.is_empty() {
            return ClassificationVerdict::not_found("No candidates to classify");
        }

        let prompt = self.build_prompt(business_name, location, candidates);
        match self.delegate(&prompt).await {
            Ok(verdict) if verdict.kind == UrlKind::Other => {
                // A profile is never an answer; prefer any page or group on offer.
                let rescored = RuleClassifier::new(self.platform_label.clone())
                    .classify(business_name, location, candidates)
                    .await;
                if matches!(rescored.kind, UrlKind::Page | UrlKind::Group) {
                    debug!(
                        "Replaced profile {} with {} for '{}'",
                        verdict.url, rescored.url, business_name
                    );
                    ClassificationVerdict::new(
                        rescored.url,
                        rescored.kind,
                        rescored.confidence,
                        format!("{} (classifier picked profile {})", rescored.explanation, verdict.url),
                    )
                } else {
                    verdict
                }
            }
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("Classification failed for '{}': {}", business_name, e);
                Self::fallback(candidates, &e)
            }
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
