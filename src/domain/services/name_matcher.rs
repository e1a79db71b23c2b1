// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use deunicode::deunicode;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use strsim::jaro_winkler;

/// 同义词与缩写，映射到规范形式
static SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("co", "company"),
        ("st", "saint"),
        ("intl", "international"),
        ("assoc", "association"),
        ("assn", "association"),
        ("ctr", "center"),
        ("centre", "center"),
        ("mt", "mount"),
        ("bros", "brothers"),
        ("dept", "department"),
        ("univ", "university"),
        ("ristorante", "restaurant"),
        ("restaurante", "restaurant"),
    ])
});

/// 匹配时忽略的常见虚词和公司后缀
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "the", "a", "an", "of", "and", "di", "de", "del", "della", "la", "le", "il", "lo", "srl",
        "spa", "llc", "inc", "ltd", "gmbh",
    ])
});

/// 将文本拆分为规范化的词
///
/// 去除重音、转小写、`&` 视为 `and`，按非字母数字字符切分并替换同义词
pub fn normalize_tokens(text: &str) -> Vec<String> {
    deunicode(text)
        .to_lowercase()
        .replace('&', " and ")
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| SYNONYMS.get(t).copied().unwrap_or(t).to_string())
        .collect()
}

fn compact(tokens: &[String]) -> String {
    tokens.concat()
}

/// 商户名称匹配器
///
/// 容忍大小写、空格与连写、词序变化以及常见缩写差异
#[derive(Debug, Clone)]
pub struct NameMatcher {
    significant: Vec<String>,
    compact: String,
    initials: String,
}

impl NameMatcher {
    pub fn new(business_name: &str) -> Self {
        let tokens = normalize_tokens(business_name);
        let mut significant: Vec<String> = tokens
            .iter()
            .filter(|t| !STOPWORDS.contains(t.as_str()))
            .cloned()
            .collect();
        if significant.is_empty() {
            significant = tokens.clone();
        }
        let initials = significant
            .iter()
            .filter_map(|t| t.chars().next())
            .collect::<String>();

        Self {
            compact: compact(&tokens),
            significant,
            initials,
        }
    }

    /// URL路径段与商户名称的相似度 [0, 1]
    pub fn score_slug(&self, slug: &str) -> f64 {
        let slug_tokens = normalize_tokens(slug);
        let slug_compact = compact(&slug_tokens);
        if slug_compact.is_empty() || self.compact.is_empty() {
            return 0.0;
        }
        if slug_compact == self.compact {
            return 1.0;
        }

        let mut best = jaro_winkler(&slug_compact, &self.compact) * 0.9;

        if self.compact.len() >= 4 && slug_compact.contains(&self.compact) {
            best = best.max(0.9);
        }
        if slug_compact.len() >= 4 && self.compact.contains(&slug_compact) {
            let ratio = slug_compact.len() as f64 / self.compact.len() as f64;
            best = best.max(0.5 + 0.4 * ratio);
        }

        let coverage = self.coverage(|token| slug_compact.contains(token));
        best = best.max(coverage * 0.85);

        if self.initials.len() >= 2
            && (slug_compact == self.initials || slug_tokens.iter().any(|t| *t == self.initials))
        {
            best = best.max(0.8);
        }

        best.clamp(0.0, 1.0)
    }

    /// 标题或摘要文本与商户名称的相似度 [0, 1]
    pub fn score_text(&self, text: &str) -> f64 {
        let text_tokens = normalize_tokens(text);
        if text_tokens.is_empty() || self.compact.is_empty() {
            return 0.0;
        }
        let text_compact = compact(&text_tokens);
        if text_compact.contains(&self.compact) {
            return 1.0;
        }

        let token_set: HashSet<&str> = text_tokens.iter().map(|t| t.as_str()).collect();
        let coverage = self.coverage(|token| {
            token_set.contains(token) || (token.len() >= 4 && text_compact.contains(token))
        });

        let abbreviation = if self.initials.len() >= 2 && token_set.contains(self.initials.as_str())
        {
            0.8
        } else {
            0.0
        };

        coverage.max(abbreviation).clamp(0.0, 1.0)
    }

    fn coverage(&self, found: impl Fn(&str) -> bool) -> f64 {
        if self.significant.is_empty() {
            return 0.0;
        }
        let hits = self
            .significant
            .iter()
            .filter(|token| found(token.as_str()))
            .count();
        hits as f64 / self.significant.len() as f64
    }
}

/// 文本中是否提及地点
///
/// 只取逗号前的城市部分，任一长度不小于3的词出现即视为提及
pub fn mentions_location(location: &str, text: &str) -> bool {
    let city = location.split(',').next().unwrap_or_default();
    let city_tokens: Vec<String> = normalize_tokens(city)
        .into_iter()
        .filter(|t| t.len() >= 3)
        .collect();
    if city_tokens.is_empty() {
        return false;
    }
    let text_tokens: HashSet<String> = normalize_tokens(text).into_iter().collect();
    city_tokens.iter().any(|t| text_tokens.contains(t))
}
