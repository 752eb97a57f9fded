//! search_and_contents 工具
//!
//! 把 Exa 客户端包装成 Agent 可自主调用的工具。检索失败不报错：
//! 失败信息作为观察文本返回给模型（与手动检索的降级语义一致）。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::digest::format_results;
use crate::search::{SearchClient, SearchQuery};
use crate::tools::Tool;

/// 工具名（角色配置与 JSON 调用中的 "tool" 字段引用它）
pub const SEARCH_TOOL_NAME: &str = "search_and_contents";

/// 检索工具默认参数（与编排器的手动检索一致）
const DEFAULT_DAYS_AGO: i64 = 30;
const DEFAULT_MAX_RESULTS: usize = 5;

/// search_and_contents：关键词 + 回溯天数 + 结果上限，返回渲染后的结果段落
pub struct SearchAndContentsTool {
    client: Arc<dyn SearchClient>,
}

impl SearchAndContentsTool {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SearchAndContentsTool {
    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Search the web for recent content. Args: {\"search_query\": \"...\", \"days_ago\": 30, \"max_results\": 5}."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "search_query": {
                    "type": "string",
                    "description": "The search query"
                },
                "days_ago": {
                    "type": "integer",
                    "description": "How many days back to search (default 30)"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results (1-10, default 5)"
                }
            },
            "required": ["search_query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let search_query = args
            .get("search_query")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();
        if search_query.is_empty() {
            return Err("Missing search_query".to_string());
        }

        let days_ago = args
            .get("days_ago")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_DAYS_AGO)
            .max(1);
        let max_results = args
            .get("max_results")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, 10);

        let response = self
            .client
            .search(&SearchQuery::new(search_query, days_ago, max_results))
            .await;

        if response.success {
            Ok(format_results(&response.results, &response.query))
        } else {
            // 降级为观察文本，让模型基于已有上下文继续
            Ok(format!(
                "Search for '{}' failed: {}",
                response.query,
                response.error_message.unwrap_or_else(|| "Unknown error".to_string())
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchResponse, SearchResult};

    struct StubSearch {
        fail: bool,
    }

    #[async_trait]
    impl SearchClient for StubSearch {
        async fn search(&self, query: &SearchQuery) -> SearchResponse {
            if self.fail {
                SearchResponse::failure(&query.query, "HTTP 502 Bad Gateway")
            } else {
                SearchResponse::ok(
                    &query.query,
                    vec![SearchResult {
                        title: "hit".into(),
                        url: "https://example.com/hit".into(),
                        published_date: None,
                        content_preview: Some("preview".into()),
                    }],
                )
            }
        }
    }

    #[tokio::test]
    async fn renders_results_as_observation() {
        let tool = SearchAndContentsTool::new(Arc::new(StubSearch { fail: false }));
        let out = tool
            .execute(serde_json::json!({"search_query": "rust agents"}))
            .await
            .unwrap();
        assert!(out.contains("'rust agents' found 1 results"));
        assert!(out.contains("Title: hit"));
    }

    #[tokio::test]
    async fn failure_becomes_observation_not_error() {
        let tool = SearchAndContentsTool::new(Arc::new(StubSearch { fail: true }));
        let out = tool
            .execute(serde_json::json!({"search_query": "rust agents"}))
            .await
            .unwrap();
        assert!(out.contains("failed: HTTP 502"));
    }

    #[tokio::test]
    async fn missing_query_is_rejected() {
        let tool = SearchAndContentsTool::new(Arc::new(StubSearch { fail: false }));
        assert!(tool.execute(serde_json::json!({})).await.is_err());
    }
}
