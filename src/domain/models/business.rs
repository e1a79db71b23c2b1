// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 搜索区域设置
///
/// 决定搜索服务返回结果的国家与语言偏好
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// 国家代码，例如 `us`、`it`
    pub country_code: String,
    /// 语言代码，例如 `en`、`it`
    pub language: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            country_code: "us".to_string(),
            language: "en".to_string(),
        }
    }
}

impl Locale {
    pub fn new(country_code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into().trim().to_lowercase(),
            language: language.into().trim().to_lowercase(),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "country: {}, language: {}",
            self.country_code, self.language
        )
    }
}

/// 待解析的商户
///
/// 批处理的输入单元，一旦进入批次即不可变。
/// 搜索地区对整个批次生效，保存在 `TaskConfig` 中而不是逐条记录
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessQuery {
    /// 商户名称
    pub business_name: String,
    /// 商户所在地
    pub location: String,
}

impl BusinessQuery {
    pub fn new(business_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            location: location.into(),
        }
    }

    /// 商户名称去除空白后是否为空
    pub fn is_blank(&self) -> bool {
        self.business_name.trim().is_empty()
    }
}
