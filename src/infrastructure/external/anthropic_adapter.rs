//! Anthropic クライアントのアダプター実装
//! Application層のWordResolverトレイトを実装

use crate::application::traits::WordResolver;
use crate::domain::WordEntry;
use crate::error::Result;
use crate::infrastructure::external::anthropic::{AnthropicClient, CompletionOptions};
use crate::infrastructure::external::word_prompt::{SYSTEM_PROMPT, build_prompt, parse_word_info};
use crate::utils::config::EnvConfig;
use async_trait::async_trait;

/// Anthropic APIのアダプター
pub struct AnthropicWordResolver {
    client: AnthropicClient,
    options: CompletionOptions,
}

impl AnthropicWordResolver {
    pub fn new(client: AnthropicClient, model: impl Into<String>) -> Self {
        Self {
            client,
            options: CompletionOptions::new(model),
        }
    }

    /// 環境変数の設定から作成。APIキーが無ければ設定エラー。
    pub fn from_env(env: &EnvConfig, model: impl Into<String>) -> Result<Self> {
        let client = AnthropicClient::new(env.require_api_key()?, env.base_url())?;
        Ok(Self::new(client, model))
    }

    pub fn model(&self) -> &str {
        &self.options.model
    }
}

#[async_trait]
impl WordResolver for AnthropicWordResolver {
    async fn resolve(&self, raw_input: &str, max_sentences: usize) -> Result<WordEntry> {
        let prompt = build_prompt(raw_input, max_sentences);
        let text = self
            .client
            .complete(SYSTEM_PROMPT, &prompt, &self.options)
            .await?;
        log::debug!("response for {:?}: {}", raw_input, text);
        parse_word_info(raw_input, &text)
    }
}
