// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::models::business::{BusinessQuery, Locale};
use crate::domain::models::task::{Credentials, ExecutionMode};

/// 批处理提交请求数据传输对象
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SubmitBatchRequestDto {
    /// 待解析的商户列表，顺序即结果顺序
    #[validate(length(min = 1, message = "records cannot be empty"), nested)]
    pub records: Vec<BusinessRecordDto>,
    /// 国家代码，默认取配置
    #[validate(length(min = 2, max = 8, message = "country_code is invalid"))]
    pub country_code: Option<String>,
    /// 语言代码，默认取配置
    #[validate(length(min = 2, max = 8, message = "language is invalid"))]
    pub language: Option<String>,
    /// 提交方凭据，未提供的字段使用服务端默认值
    pub credentials: Option<CredentialsDto>,
    /// 执行模式，默认取配置
    pub mode: Option<ExecutionMode>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BusinessRecordDto {
    #[validate(length(min = 1, message = "business_name cannot be empty"))]
    pub business_name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CredentialsDto {
    #[serde(default, alias = "google_api_key")]
    pub search_api_key: Option<String>,
    #[serde(default, alias = "google_cx")]
    pub search_engine_id: Option<String>,
    #[serde(default, alias = "openai_api_key")]
    pub llm_api_key: Option<String>,
}

impl From<CredentialsDto> for Credentials {
    fn from(dto: CredentialsDto) -> Self {
        Credentials::new(
            dto.search_api_key.unwrap_or_default(),
            dto.search_engine_id.unwrap_or_default(),
            dto.llm_api_key,
        )
    }
}

impl SubmitBatchRequestDto {
    pub fn queries(&self) -> Vec<BusinessQuery> {
        self.records
            .iter()
            .map(|r| BusinessQuery::new(r.business_name.trim(), r.location.trim()))
            .collect()
    }

    /// 合并请求中的地区与默认地区
    pub fn locale(&self, default: &Locale) -> Locale {
        Locale::new(
            self.country_code
                .clone()
                .unwrap_or_else(|| default.country_code.clone()),
            self.language
                .clone()
                .unwrap_or_else(|| default.language.clone()),
        )
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.clone().unwrap_or_default().into()
    }
}

/// 批处理提交响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitBatchResponseDto {
    pub task_id: String,
    pub total_records: usize,
    pub message: String,
}
