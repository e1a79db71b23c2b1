// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::models::business::BusinessQuery;

/// 未找到时写入的URL占位值
pub const NOT_FOUND_URL: &str = "Not found";
/// 出错时写入的URL占位值
pub const ERROR_URL: &str = "Error";

/// URL类型
///
/// 分类器对候选URL给出的判定类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    /// 商户主页，首选结果
    Page,
    /// 群组，在没有主页时可接受
    Group,
    /// 个人主页或其他不可用页面
    Other,
    /// 没有可用的匹配
    #[default]
    NotFound,
    /// 搜索或分类过程出错
    Error,
    /// 分类服务不可用时的兜底结果
    Unknown,
}

impl UrlKind {
    /// 解析外部分类服务返回的类型标签
    ///
    /// 无法识别的标签一律归为 `Unknown`，不会透传任意字符串
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(UrlKind::Unknown)
    }

    /// 是否为需要重新查询的结果
    pub fn is_unresolved(&self) -> bool {
        matches!(self, UrlKind::NotFound | UrlKind::Error)
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UrlKind::Page => write!(f, "page"),
            UrlKind::Group => write!(f, "group"),
            UrlKind::Other => write!(f, "other"),
            UrlKind::NotFound => write!(f, "not_found"),
            UrlKind::Error => write!(f, "error"),
            UrlKind::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for UrlKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "page" => Ok(UrlKind::Page),
            "group" => Ok(UrlKind::Group),
            "other" | "profile" => Ok(UrlKind::Other),
            "not_found" | "not found" | "notfound" => Ok(UrlKind::NotFound),
            "error" => Ok(UrlKind::Error),
            "unknown" => Ok(UrlKind::Unknown),
            _ => Err(()),
        }
    }
}

/// 将置信度限制在 [0.0, 1.0]，NaN 视为 0.0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// 分类结论
///
/// 分类器对最佳候选URL的结构化判断。`confidence` 为 0.0 表示没有可用匹配。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    /// 选中的URL，或 `Not found` / `Error`
    pub url: String,
    /// URL类型
    #[serde(rename = "type")]
    pub kind: UrlKind,
    /// 置信度
    pub confidence: f64,
    /// 判定说明
    #[serde(rename = "notes")]
    pub explanation: String,
}

impl ClassificationVerdict {
    /// 创建结论，置信度会被限制在合法区间
    pub fn new(
        url: impl Into<String>,
        kind: UrlKind,
        confidence: f64,
        explanation: impl Into<String>,
    ) -> Self {
        let confidence = if kind.is_unresolved() {
            0.0
        } else {
            clamp_confidence(confidence)
        };
        Self {
            url: url.into(),
            kind,
            confidence,
            explanation: explanation.into(),
        }
    }

    pub fn not_found(explanation: impl Into<String>) -> Self {
        Self::new(NOT_FOUND_URL, UrlKind::NotFound, 0.0, explanation)
    }

    pub fn error(explanation: impl Into<String>) -> Self {
        Self::new(ERROR_URL, UrlKind::Error, 0.0, explanation)
    }

    /// 是否应当在重新查询时再次处理
    pub fn is_unresolved(&self) -> bool {
        self.url == NOT_FOUND_URL || self.url == ERROR_URL || self.kind.is_unresolved()
    }
}

/// 解析完成的记录
///
/// 输入商户与分类结论的扁平组合，是存储和导出的基本单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    #[serde(flatten)]
    pub query: BusinessQuery,
    #[serde(flatten)]
    pub verdict: ClassificationVerdict,
}

impl ResolvedRecord {
    pub fn new(query: BusinessQuery, verdict: ClassificationVerdict) -> Self {
        Self { query, verdict }
    }

    pub fn is_unresolved(&self) -> bool {
        self.verdict.is_unresolved()
    }
}
