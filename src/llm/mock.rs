//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 默认回显最后一条 User 消息；scripted 模式按序弹出预置回复，
//! 供工具调用循环与流水线测试脚本化。正文放入 response_content 字段，
//! 与 OpenAI 后端（content 字段）形成字段差异，覆盖提取器的探测路径。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::{Message, Role};
use crate::llm::{LlmClient, LlmReply};

/// Mock 客户端：回显或按脚本回复
#[derive(Debug, Default)]
pub struct MockLlmClient {
    scripted: Mutex<VecDeque<String>>,
}

impl MockLlmClient {
    /// 按序返回预置回复；脚本耗尽后退回回显
    pub fn scripted(replies: Vec<String>) -> Self {
        Self {
            scripted: Mutex::new(replies.into()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<LlmReply, String> {
        if let Some(reply) = self.scripted.lock().unwrap().pop_front() {
            return Ok(LlmReply::from_response_content(reply));
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(LlmReply::from_response_content(format!(
            "Mock reply to: {}",
            last_user.chars().take(120).collect::<String>()
        )))
    }
}
