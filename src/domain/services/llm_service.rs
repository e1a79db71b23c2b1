// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SYSTEM_PROMPT: &str =
    "You classify social-media search results for businesses. You output only valid JSON.";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// 委托分类服务
///
/// 接收自然语言提示词，返回模型的原始文本输出
#[async_trait]
pub trait LLMServiceTrait: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// LLM服务 - 处理与OpenAI兼容接口的交互
///
/// # 配置
///
/// 由调用方传入API密钥、模型名称与基础URL，密钥通常来自任务提交时的凭据
pub struct LLMService {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base_url: String,
    temperature: f32,
}

#[async_trait]
impl LLMServiceTrait for LLMService {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let (content, usage) = LLMService::chat(self, prompt).await?;
        tracing::debug!(
            "LLM call used {} tokens ({} prompt, {} completion)",
            usage.total_tokens,
            usage.prompt_tokens,
            usage.completion_tokens
        );
        Ok(content)
    }
}

impl LLMService {
    pub fn new_with_config(
        api_key: String,
        model: String,
        api_base_url: String,
        temperature: f32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            temperature,
        }
    }

    /// 发送一次对话请求
    ///
    /// # 返回值
    /// * `Result<(String, TokenUsage)>` - 模型输出的原始文本和令牌使用情况
    ///
    /// # 错误
    /// * 当LLM服务调用失败或返回非成功状态时返回错误
    /// * 当响应中没有文本内容时返回错误
    pub async fn chat(&self, prompt: &str) -> Result<(String, TokenUsage)> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("chat completion returned {}: {}", status, detail));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .context("chat completion body is not valid JSON")?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion carried no message content"))?;
        Ok((content, completion.usage))
    }
}
