//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / DeepSeek / Mock）实现 LlmClient::complete。
//! 回复不是裸字符串而是 LlmReply：不同后端把正文放在不同可选字段里，
//! 由 extract::TextExtractor 按配置的优先级一次性解析（见 extract 模块）。

use async_trait::async_trait;
use serde_json::Value;

use crate::conversation::Message;

/// 后端回复：正文位于哪个字段由后端决定，字段集合是兼容层约定而非稳定协议
#[derive(Debug, Clone, Default)]
pub struct LlmReply {
    pub response_message: Option<String>,
    pub content: Option<String>,
    pub response_content: Option<String>,
    /// 后端原始负载（所有命名字段都缺失时的兜底来源）
    pub raw: Option<Value>,
}

impl LlmReply {
    pub fn from_content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from_response_message(text: impl Into<String>) -> Self {
        Self {
            response_message: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn from_response_content(text: impl Into<String>) -> Self {
        Self {
            response_content: Some(text.into()),
            ..Default::default()
        }
    }
}

/// LLM 客户端 trait：单次非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<LlmReply, String>;

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
