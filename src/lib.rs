//! Newsroom - Rust 多智能体 Newsletter 生成流水线
//!
//! 模块划分：
//! - **agent**: 角色配置与 Agent 运行时（单轮历史 + 工具调用循环）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **conversation**: 消息与角色类型
//! - **core**: 错误类型
//! - **digest**: 检索结果摘要渲染
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）与回复提取
//! - **pipeline**: 四阶段流水线编排（research / insights / writing / editing）
//! - **roles**: 四个固定角色配置
//! - **search**: Exa 检索客户端
//! - **tools**: 工具注册表、执行器与 search_and_contents 工具

pub mod agent;
pub mod config;
pub mod conversation;
pub mod core;
pub mod digest;
pub mod llm;
pub mod pipeline;
pub mod roles;
pub mod search;
pub mod tools;
