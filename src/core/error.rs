//! Agent 错误类型
//!
//! 阶段内的第一个未恢复错误沿调用链向上传播，由入口统一记录并以非零码退出；
//! 检索失败不在此列（由 SearchResponse 信封在本地吸收，见 search 模块）。

use thiserror::Error;

/// 流水线运行过程中可能出现的错误（LLM、工具、配置）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),
}
