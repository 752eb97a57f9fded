//! Agent 运行时：角色配置 + 单轮历史 → 阶段输出
//!
//! AgentRunner 把角色的 system prompt 拼在注入历史之前调用 LLM；
//! 回复若解析为该角色持有的工具调用（JSON：{"tool": ..., "args": {...}}），
//! 则执行工具、记录调用、把观察结果作为新一轮输入，最多循环
//! max_tool_call_attempts 次。无法解析或工具不在角色清单内时按最终回复处理
//! （模型工具调用并不可靠，阶段上下文已预注入检索结果兜底）。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::Message;
use crate::core::AgentError;
use crate::llm::{LlmClient, TextExtractor};
use crate::tools::ToolExecutor;

/// 角色配置：人设、任务指令、输出格式指令、可用工具与调用预算。
/// 每个阶段一份，编排器初始化时构建一次、跨运行复用
#[derive(Debug, Clone)]
pub struct AgentRole {
    pub name: String,
    pub persona: String,
    pub instructions: String,
    pub output_instructions: String,
    pub tools: Vec<String>,
    pub max_tool_call_attempts: usize,
}

impl AgentRole {
    pub fn new(
        name: impl Into<String>,
        persona: impl Into<String>,
        instructions: impl Into<String>,
        output_instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            persona: persona.into(),
            instructions: instructions.into(),
            output_instructions: output_instructions.into(),
            tools: Vec::new(),
            max_tool_call_attempts: 1,
        }
    }

    pub fn with_tools(mut self, tools: Vec<String>, max_tool_call_attempts: usize) -> Self {
        self.tools = tools;
        self.max_tool_call_attempts = max_tool_call_attempts;
        self
    }

    /// 拼装 system prompt：人设 + 指令 + 输出格式 + 工具清单（角色持有工具时）
    pub fn system_prompt(&self, tool_descriptions: &[(String, String)]) -> String {
        let mut prompt = format!("{}\n\n{}", self.persona, self.instructions);
        if !self.output_instructions.is_empty() {
            prompt.push_str("\n\nOutput instructions:\n");
            prompt.push_str(&self.output_instructions);
        }
        if !self.tools.is_empty() {
            prompt.push_str("\n\nAvailable tools:\n");
            for (name, description) in tool_descriptions {
                if self.tools.contains(name) {
                    prompt.push_str(&format!("- {}: {}\n", name, description));
                }
            }
            prompt.push_str(
                "\nTo call a tool, reply with JSON only: {\"tool\": \"<name>\", \"args\": {...}}. \
                 Otherwise reply with your final answer as plain text.",
            );
        }
        prompt
    }
}

/// LLM 返回的 Tool Call（简化 JSON：{"tool": "search_and_contents", "args": {...}}）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// 阶段内记录的一次工具调用
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub tool: String,
    pub args: Value,
    pub output_preview: String,
}

/// 阶段输出：最终文本 + 期间记录的工具调用
#[derive(Debug, Clone)]
pub struct StageReply {
    pub text: String,
    pub tool_calls: Vec<ToolInvocation>,
}

/// 解析 LLM 输出中的工具调用：提取 JSON 块（```json ... ``` 或首个 {..}），
/// 解析失败或 tool 为空按普通回复处理（返回 None，而非报错）
pub fn parse_tool_call(output: &str) -> Option<ToolCall> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or_else(|| rest.trim())
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start >= end {
            return None;
        }
        &trimmed[start..=end]
    } else {
        return None;
    };

    let parsed: ToolCall = serde_json::from_str(json_str).ok()?;
    if parsed.tool.is_empty() {
        None
    } else {
        Some(parsed)
    }
}

/// Agent 运行时：LLM + 工具执行器 + 回复提取器
pub struct AgentRunner {
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    extractor: TextExtractor,
}

impl AgentRunner {
    pub fn new(llm: Arc<dyn LlmClient>, executor: ToolExecutor, extractor: TextExtractor) -> Self {
        Self {
            llm,
            executor,
            extractor,
        }
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    /// 对给定角色跑一个阶段：单轮历史输入，工具调用循环受角色预算约束
    pub async fn run(
        &self,
        role: &AgentRole,
        history: &[Message],
    ) -> Result<StageReply, AgentError> {
        let system = role.system_prompt(&self.executor.tool_descriptions());
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system));
        messages.extend_from_slice(history);

        let mut tool_calls = Vec::new();
        let attempts = role.max_tool_call_attempts.max(1);

        for _ in 0..attempts {
            let reply = self
                .llm
                .complete(&messages)
                .await
                .map_err(AgentError::LlmError)?;
            let text = self.extractor.extract(&reply);

            let call = match parse_tool_call(&text) {
                Some(call) if role.tools.contains(&call.tool) => call,
                _ => return Ok(StageReply { text, tool_calls }),
            };

            let observation = self.executor.execute(&call.tool, call.args.clone()).await?;
            tracing::debug!(role = %role.name, tool = %call.tool, "stage tool call");
            tool_calls.push(ToolInvocation {
                tool: call.tool.clone(),
                args: call.args.clone(),
                output_preview: observation.chars().take(200).collect(),
            });
            messages.push(Message::assistant(text));
            messages.push(Message::user(format!(
                "Result of {}:\n{}",
                call.tool, observation
            )));
        }

        // 工具预算用尽：要求直接给出最终答案
        messages.push(Message::user(
            "You have used all available tool calls. Write your final answer now.",
        ));
        let reply = self
            .llm
            .complete(&messages)
            .await
            .map_err(AgentError::LlmError)?;
        Ok(StageReply {
            text: self.extractor.extract(&reply),
            tool_calls,
        })
    }
}
