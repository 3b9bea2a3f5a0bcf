//! OpenAI互換 chat completions クライアント

use super::{ChatCompletion, UserMessage};
use crate::config::Config;
use crate::error::{ScoreError, Result};
use serde_json::{json, Value};
use std::time::Duration;

/// リクエストボディ（system + user の2メッセージ）
pub fn build_request_body(model: &str, system_prompt: &str, user_content: &str) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_content},
        ],
    })
}

pub struct HttpChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    timeout_seconds: u64,
}

impl HttpChatClient {
    /// APIキーがなければ MissingApiKey
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ScoreError::Config(format!("HTTPクライアント生成エラー: {}", e)))?;

        Self::with_client(config, client)
    }

    /// 構築済みの reqwest::Client を使う
    pub fn with_client(config: &Config, client: reqwest::Client) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();

        Ok(Self {
            client,
            url: config.chat_completions_url(),
            api_key,
            model: config.model.clone(),
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(
        &self,
        system_prompt: &str,
        user_message: UserMessage<'_>,
        model: Option<&str>,
    ) -> Result<Value> {
        let content = user_message.to_content()?;
        let model = model.unwrap_or(&self.model);
        let body = build_request_body(model, system_prompt, &content);

        tracing::debug!("POST {} (model: {}, {} chars)", self.url, model, content.chars().count());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScoreError::Transport(format!("{}秒でタイムアウト", self.timeout_seconds))
                } else {
                    ScoreError::Transport(format!("リクエスト失敗: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ScoreError::Transport(format!("HTTP {}: {}", status, text.trim())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ScoreError::Transport(format!("レスポンスのデコードに失敗: {}", e)))
    }
}

impl ChatCompletion for HttpChatClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: UserMessage<'_>,
        model: Option<&str>,
    ) -> Option<Value> {
        match self.send(system_prompt, user_message, model).await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::error!("{}", e);
                None
            }
        }
    }
}
