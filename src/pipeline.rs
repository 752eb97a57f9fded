//! 四阶段流水线编排：检索注入 → research → insights → writing → editing
//!
//! 仅有的编排逻辑：两次手动检索的结果渲染为摘要注入前两个阶段，
//! 各阶段输出作为下一阶段输入，严格顺序执行。检索由编排器出面而非
//! 交给模型自主调用，是对模型工具调用不可靠性的规避手段。
//! 检索失败降级（摘要段落缺省），Agent 失败传播（无重试、无部分结果）。

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::agent::AgentRunner;
use crate::config::AppConfig;
use crate::conversation::Message;
use crate::core::AgentError;
use crate::digest::build_digest;
use crate::llm::{LlmClient, TextExtractor};
use crate::roles::Roles;
use crate::search::{SearchClient, SearchQuery, SearchResponse};
use crate::tools::{SearchAndContentsTool, ToolExecutor, ToolRegistry};

/// 主检索回溯窗口（天）
pub const PRIMARY_RECENCY_DAYS: i64 = 30;
/// 次检索回溯窗口（天）
pub const SECONDARY_RECENCY_DAYS: i64 = 60;
/// 两次检索的结果上限
pub const SEARCH_MAX_RESULTS: usize = 5;
/// 摘要复用于 insights 阶段时的截断长度（字符）
pub const SECONDARY_DIGEST_CHARS: usize = 1000;

/// 一次完整运行的产物：四个阶段的文本，返回后不可变
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub research: String,
    pub insights: String,
    pub draft: String,
    #[serde(rename = "final")]
    pub final_text: String,
}

/// 流水线编排器：长期持有角色配置与两个能力客户端，跨运行复用
pub struct PipelineOrchestrator {
    runner: AgentRunner,
    search: Arc<dyn SearchClient>,
    roles: Roles,
}

impl PipelineOrchestrator {
    /// 组装编排器：注册 search_and_contents 工具、构建执行器与提取器、固定四个角色
    pub fn new(cfg: &AppConfig, llm: Arc<dyn LlmClient>, search: Arc<dyn SearchClient>) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(SearchAndContentsTool::new(search.clone()));
        let executor = ToolExecutor::new(registry, cfg.tools.tool_timeout_secs);
        let extractor = TextExtractor::new(cfg.llm.reply_fields.clone());

        Self {
            runner: AgentRunner::new(llm, executor, extractor),
            search,
            roles: Roles::new(),
        }
    }

    /// 手动检索：结果直接注入 Prompt，失败打印并降级
    async fn manual_search(&self, query: &str, recency_days: i64) -> SearchResponse {
        println!("📊 Performing manual search for: '{}'...", query);
        let response = self
            .search
            .search(&SearchQuery::new(query, recency_days, SEARCH_MAX_RESULTS))
            .await;
        if response.success {
            println!(
                "✅ Search successful: {} results found",
                response.total_results_found
            );
        } else {
            println!(
                "❌ Search failed: {}",
                response
                    .error_message
                    .as_deref()
                    .unwrap_or("Unknown error")
            );
        }
        response
    }

    fn report_tool_calls(reply: &crate::agent::StageReply, stage: &str) {
        if reply.tool_calls.is_empty() {
            println!(
                "  - Note: No additional tool calls were made during {} (using pre-fetched data)",
                stage
            );
        } else {
            println!(
                "  - Made {} tool calls during {}",
                reply.tool_calls.len(),
                stage
            );
        }
    }

    /// 跑完整流水线：两次检索 + 四个阶段，返回阶段文本集合
    pub async fn run(&self, topic: &str) -> Result<PipelineResult, AgentError> {
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, topic, "pipeline run started");

        // 两次检索相互独立，但按序执行
        let primary = self
            .manual_search(&format!("latest developments in {}", topic), PRIMARY_RECENCY_DAYS)
            .await;
        let secondary = self
            .manual_search(&format!("impact of {}", topic), SECONDARY_RECENCY_DAYS)
            .await;

        let digest = build_digest(&primary, &secondary);

        // Stage 1: research——完整摘要注入
        println!("\n🔍 Stage 1: Conducting research...");
        let research_message = format!(
            "Research task: Analyze these search results about {}.\n\n{}\n\n\
             Organize these findings into clear research with reliable sources. \
             Include the significance of each development and its broader industry impact. \
             If you need more specific information, use the search_and_contents tool with a specific query.",
            topic, digest
        );
        let research = self
            .runner
            .run(&self.roles.researcher, &[Message::user(research_message)])
            .await?;
        println!("✅ Research completed");
        Self::report_tool_calls(&research, "research");

        // Stage 2: insights——research 输出 + 截断摘要
        println!("\n🧠 Stage 2: Generating insights...");
        let truncated_digest: String = digest.chars().take(SECONDARY_DIGEST_CHARS).collect();
        let insights_message = format!(
            "Add insights to the following research about {}.\n\n\
             Research to analyze:\n{}\n\n\
             Also consider these additional search results:\n{}...\n\n\
             If you need any specific information, use the search_and_contents tool with a specific query.",
            topic, research.text, truncated_digest
        );
        let insights = self
            .runner
            .run(&self.roles.insights, &[Message::user(insights_message)])
            .await?;
        println!("✅ Insights generated");
        Self::report_tool_calls(&insights, "insights generation");

        // Stage 3: writing——仅 insights 输出
        println!("\n✍️ Stage 3: Creating newsletter draft...");
        let writing_message = format!(
            "Transform these insights about {} into engaging newsletter content:\n\n{}",
            topic, insights.text
        );
        let draft = self
            .runner
            .run(&self.roles.writer, &[Message::user(writing_message)])
            .await?;
        println!("✅ Draft created");

        // Stage 4: editing——仅草稿
        println!("\n📝 Stage 4: Editing and finalizing...");
        let editing_message = format!(
            "Proofread and refine this newsletter draft about {}. \
             Ensure all sources are properly cited and the content is engaging and informative:\n\n{}",
            topic, draft.text
        );
        let final_reply = self
            .runner
            .run(&self.roles.editor, &[Message::user(editing_message)])
            .await?;
        println!("✅ Newsletter finalized");

        let (prompt_tokens, completion_tokens, total_tokens) = self.runner.token_usage();
        tracing::info!(
            %run_id,
            prompt_tokens,
            completion_tokens,
            total_tokens,
            "pipeline run finished"
        );

        Ok(PipelineResult {
            research: research.text,
            insights: insights.text,
            draft: draft.text,
            final_text: final_reply.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmReply, MockLlmClient};
    use crate::search::SearchResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 主检索成功（两条结果）、次检索失败的检索桩
    struct DegradedSearch;

    #[async_trait]
    impl SearchClient for DegradedSearch {
        async fn search(&self, query: &SearchQuery) -> SearchResponse {
            if query.query.starts_with("latest developments in") {
                SearchResponse::ok(
                    &query.query,
                    vec![
                        SearchResult {
                            title: "Qubit count doubles".into(),
                            url: "https://example.com/qubits".into(),
                            published_date: Some("2024-05-01".into()),
                            content_preview: Some("A lab doubled its qubit count".into()),
                        },
                        SearchResult {
                            title: "Error correction breakthrough".into(),
                            url: "https://example.com/ecc".into(),
                            published_date: Some("2024-05-02".into()),
                            content_preview: Some("New code halves the error rate".into()),
                        },
                    ],
                )
            } else {
                SearchResponse::failure(&query.query, "HTTP 500 Internal Server Error")
            }
        }
    }

    /// 记录每次 complete 收到的消息，按脚本回复
    struct RecordingLlm {
        seen: Mutex<Vec<Vec<Message>>>,
        replies: Mutex<Vec<String>>,
    }

    impl RecordingLlm {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, messages: &[Message]) -> Result<LlmReply, String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| "fallback".to_string());
            Ok(LlmReply::from_content(reply))
        }
    }

    fn orchestrator_with(
        llm: Arc<dyn LlmClient>,
        search: Arc<dyn SearchClient>,
    ) -> PipelineOrchestrator {
        PipelineOrchestrator::new(&AppConfig::default(), llm, search)
    }

    #[tokio::test]
    async fn completed_run_yields_four_stage_texts() {
        let llm = Arc::new(MockLlmClient::scripted(vec![
            "research text".into(),
            "insights text".into(),
            "draft text".into(),
            "final text".into(),
        ]));
        let orchestrator = orchestrator_with(llm, Arc::new(DegradedSearch));

        let result = orchestrator.run("quantum computing").await.unwrap();
        assert_eq!(result.research, "research text");
        assert_eq!(result.insights, "insights text");
        assert_eq!(result.draft, "draft text");
        assert_eq!(result.final_text, "final text");
    }

    #[test]
    fn result_serializes_with_the_four_contract_keys() {
        let result = PipelineResult {
            research: "r".into(),
            insights: "i".into(),
            draft: "d".into(),
            final_text: "f".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["research", "insights", "draft", "final"]);
    }

    #[tokio::test]
    async fn failed_secondary_search_degrades_but_run_completes() {
        let llm = Arc::new(RecordingLlm::new(vec!["r", "i", "d", "f"]));
        let orchestrator = orchestrator_with(llm.clone(), Arc::new(DegradedSearch));

        let result = orchestrator.run("quantum computing").await.unwrap();
        assert_eq!(result.final_text, "f");

        // research 阶段的注入消息包含主检索的标题与预览，不包含失败的次检索段落
        let seen = llm.seen.lock().unwrap();
        let research_user = &seen[0]
            .iter()
            .find(|m| matches!(m.role, crate::conversation::Role::User))
            .unwrap()
            .content;
        assert!(research_user.contains("Qubit count doubles"));
        assert!(research_user.contains("Error correction breakthrough"));
        assert!(research_user.contains("Preview: A lab doubled its qubit count..."));
        assert!(!research_user.contains("found 0 results"));
        assert!(!research_user.contains("Search for 'impact of quantum computing'"));
    }

    #[tokio::test]
    async fn each_stage_sees_only_its_own_injected_context() {
        let llm = Arc::new(RecordingLlm::new(vec!["r", "i", "d", "f"]));
        let orchestrator = orchestrator_with(llm.clone(), Arc::new(DegradedSearch));
        orchestrator.run("quantum computing").await.unwrap();

        let seen = llm.seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        // 每个阶段只有 system + 单条 user（无累计对话）
        for messages in seen.iter() {
            assert_eq!(messages.len(), 2);
        }
        // writing 阶段只嵌入 insights 输出，不再包含检索摘要
        let writing_user = &seen[2][1].content;
        assert!(writing_user.contains("Transform these insights"));
        assert!(writing_user.contains('i'));
        assert!(!writing_user.contains("SEARCH RESULTS:"));
    }
}
