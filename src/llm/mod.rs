//! LLM 层：客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）

use std::sync::Arc;

pub mod deepseek;
pub mod extract;
pub mod mock;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_client, DEEPSEEK_CHAT, DEEPSEEK_REASONER};
pub use extract::{TextExtractor, DEFAULT_REPLY_FIELDS};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmReply};

use crate::config::LlmSection;

/// 根据配置与已解析的凭证选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
///
/// 凭证在入口处解析一次后显式传入，库内不再读环境变量。
/// 两个 Key 都缺失时退回 Mock 并告警（离线可跑，输出为回显文本）。
pub fn create_llm_from_config(
    cfg: &LlmSection,
    openai_key: Option<&str>,
    deepseek_key: Option<&str>,
) -> Arc<dyn LlmClient> {
    let provider = cfg.provider.to_lowercase();
    let use_deepseek = deepseek_key.is_some() && (provider == "deepseek" || openai_key.is_none());

    if use_deepseek {
        let model = cfg
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| DEEPSEEK_CHAT.to_string());
        tracing::info!("Using DeepSeek LLM ({})", model);
        let mut client = create_deepseek_client(Some(&model), deepseek_key);
        if let Some(t) = cfg.temperature {
            client = client.with_temperature(t);
        }
        Arc::new(client)
    } else if openai_key.is_some() {
        let model = cfg.openai.model.clone().unwrap_or_else(|| cfg.model.clone());
        let base = cfg.base_url.as_deref();
        tracing::info!("Using OpenAI LLM ({})", model);
        let mut client = OpenAiClient::new(base, &model, openai_key);
        if let Some(t) = cfg.temperature {
            client = client.with_temperature(t);
        }
        Arc::new(client)
    } else {
        tracing::warn!("No LLM API key set, using Mock LLM");
        Arc::new(MockLlmClient::default())
    }
}
