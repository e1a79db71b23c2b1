// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::models::search_hit::SearchHit;
use crate::domain::models::verdict::{ClassificationVerdict, UrlKind};
use crate::domain::services::name_matcher::{mentions_location, NameMatcher};
use crate::domain::services::url_classifier::{
    analyze_url, looks_like_personal_name, UrlClassifier, UrlShape,
};

/// 名称相似度低于该值的小写姓名式路径视为个人主页
const PERSONAL_NAME_THRESHOLD: f64 = 0.5;
/// 由子栏目推导出的主页的置信度折扣
pub const DERIVED_PAGE_FACTOR: f64 = 0.8;

/// 单个候选的评估结果
#[derive(Debug, Clone)]
struct Assessment {
    url: String,
    kind: UrlKind,
    confidence: f64,
    derived: bool,
    note: String,
}

/// 被拒绝候选的计数
#[derive(Debug, Default)]
struct Rejections {
    profiles: usize,
    sub_pages: usize,
    other: usize,
}

impl Rejections {
    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.profiles > 0 {
            parts.push(format!("{} personal profile(s)", self.profiles));
        }
        if self.sub_pages > 0 {
            parts.push(format!("{} sub-page(s)", self.sub_pages));
        }
        if self.other > 0 {
            parts.push(format!("{} other URL(s)", self.other));
        }
        if parts.is_empty() {
            "nothing usable".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// 基于URL路径规则的分类器
///
/// 不调用任何外部服务。优先级：主页 > 群组，个人主页与其他URL一律拒绝。
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    platform_label: String,
}

impl RuleClassifier {
    pub fn new(platform_label: impl Into<String>) -> Self {
        Self {
            platform_label: platform_label.into(),
        }
    }

    fn name_score(matcher: &NameMatcher, slug: &str, hit: &SearchHit) -> f64 {
        matcher
            .score_slug(slug)
            .max(matcher.score_text(&hit.title) * 0.95)
            .max(matcher.score_text(&hit.snippet) * 0.8)
    }

    fn location_bonus(location: &str, hit: &SearchHit) -> f64 {
        if mentions_location(location, &hit.title) || mentions_location(location, &hit.snippet) {
            0.1
        } else {
            0.0
        }
    }

    fn page_confidence(name_score: f64, location_bonus: f64) -> f64 {
        0.5 + 0.4 * name_score + location_bonus
    }

    fn group_confidence(name_score: f64, location_bonus: f64) -> f64 {
        0.4 + 0.3 * name_score + location_bonus
    }

    fn assess(
        &self,
        matcher: &NameMatcher,
        location: &str,
        hit: &SearchHit,
        rejections: &mut Rejections,
    ) -> Option<Assessment> {
        let location_bonus = Self::location_bonus(location, hit);
        match analyze_url(&hit.url) {
            UrlShape::Group => {
                let score = matcher
                    .score_text(&hit.title)
                    .max(matcher.score_text(&hit.snippet) * 0.8);
                Some(Assessment {
                    url: hit.url.clone(),
                    kind: UrlKind::Group,
                    confidence: Self::group_confidence(score, location_bonus),
                    derived: false,
                    note: format!("{} group; name match {:.2}", self.platform_label, score),
                })
            }
            UrlShape::Page { slug, vanity } => {
                let slug_score = matcher.score_slug(&slug);
                if vanity && looks_like_personal_name(&slug) && slug_score < PERSONAL_NAME_THRESHOLD
                {
                    rejections.profiles += 1;
                    return None;
                }
                let score = Self::name_score(matcher, &slug, hit);
                Some(Assessment {
                    url: hit.url.clone(),
                    kind: UrlKind::Page,
                    confidence: Self::page_confidence(score, location_bonus),
                    derived: false,
                    note: format!(
                        "{} page; name match {:.2}{}",
                        self.platform_label,
                        score,
                        if location_bonus > 0.0 {
                            "; location mentioned"
                        } else {
                            ""
                        }
                    ),
                })
            }
            UrlShape::SubPage {
                parent,
                slug,
                section,
            } => {
                rejections.sub_pages += 1;
                let score = Self::name_score(matcher, &slug, hit);
                Some(Assessment {
                    url: parent,
                    kind: UrlKind::Page,
                    confidence: Self::page_confidence(score, location_bonus) * DERIVED_PAGE_FACTOR,
                    derived: true,
                    note: format!(
                        "{} page derived from /{} sub-page; name match {:.2}",
                        self.platform_label, section, score
                    ),
                })
            }
            UrlShape::Profile => {
                rejections.profiles += 1;
                None
            }
            UrlShape::Reserved(_) | UrlShape::Unrecognized => {
                rejections.other += 1;
                None
            }
        }
    }
}

/// 按置信度挑选，置信度相同时保留靠前的候选
fn best_of<'a>(items: impl Iterator<Item = &'a Assessment>) -> Option<&'a Assessment> {
    let mut best: Option<&'a Assessment> = None;
    for item in items {
        match best {
            Some(current) if current.confidence >= item.confidence => {}
            _ => best = Some(item),
        }
    }
    best
}

#[async_trait]
impl UrlClassifier for RuleClassifier {
    async fn classify(
        &self,
        business_name: &str,
        location: &str,
        candidates: &[SearchHit],
    ) -> ClassificationVerdict {
        if candidates.is_empty() {
            return ClassificationVerdict::not_found("No candidates to classify");
        }

        let matcher = NameMatcher::new(business_name);
        let mut rejections = Rejections::default();
        let assessments: Vec<Assessment> = candidates
            .iter()
            .filter_map(|hit| self.assess(&matcher, location, hit, &mut rejections))
            .collect();

        debug!(
            "Rule classifier assessed {} of {} candidates for '{}'",
            assessments.len(),
            candidates.len(),
            business_name
        );

        let chosen = best_of(
            assessments
                .iter()
                .filter(|a| a.kind == UrlKind::Page && !a.derived),
        )
        .or_else(|| best_of(assessments.iter().filter(|a| a.kind == UrlKind::Group)))
        .or_else(|| best_of(assessments.iter().filter(|a| a.derived)));

        match chosen {
            Some(assessment) => ClassificationVerdict::new(
                assessment.url.clone(),
                assessment.kind,
                assessment.confidence,
                assessment.note.clone(),
            ),
            None => ClassificationVerdict::not_found(format!(
                "No {} page or group among {} candidate(s); rejected {}",
                self.platform_label,
                candidates.len(),
                rejections.describe()
            )),
        }
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
