//! Exa 检索客户端：关键词查询 + 时间窗口 + 结果上限
//!
//! search 的契约是"从不失败"：凭证缺失、网络错误、解码错误一律折叠为
//! success=false + error_message 的信封，由上层决定摘要段落缺省。
//! 结果顺序即服务端相关性顺序，不做去重。

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// 默认 Exa 端点
pub const EXA_ENDPOINT: &str = "https://api.exa.ai/search";

/// 单次检索请求：查询词、回溯天数、结果上限。每次调用新建，不可变
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub recency_days: i64,
    pub max_results: usize,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, recency_days: i64, max_results: usize) -> Self {
        Self {
            query: query.into(),
            recency_days,
            max_results,
        }
    }
}

/// 单条检索结果；缺失字段保留 None，渲染时按空处理
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub published_date: Option<String>,
    pub content_preview: Option<String>,
}

/// 检索响应信封：success=false 时 results 为空、error_message 给出原因
#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results_found: usize,
    pub error_message: Option<String>,
}

impl SearchResponse {
    pub fn ok(query: impl Into<String>, results: Vec<SearchResult>) -> Self {
        let total = results.len();
        Self {
            success: true,
            query: query.into(),
            results,
            total_results_found: total,
            error_message: None,
        }
    }

    pub fn failure(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            query: query.into(),
            results: Vec::new(),
            total_results_found: 0,
            error_message: Some(message.into()),
        }
    }
}

/// 检索能力接口：实现方保证不 panic、不返回 Err
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> SearchResponse;
}

// ---- Exa 线上协议（camelCase JSON）----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaSearchRequest {
    query: String,
    num_results: u32,
    #[serde(rename = "type")]
    search_type: String,
    start_published_date: String,
    contents: ExaContents,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaContents {
    text: ExaTextConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaTextConfig {
    max_characters: u32,
}

#[derive(Deserialize)]
struct ExaSearchResponse {
    #[serde(default)]
    results: Vec<ExaRawResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaRawResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// 回溯窗口起点，Exa 要求 ISO 8601（如 2024-05-01T00:00:00.000Z）
fn start_published_date(recency_days: i64) -> String {
    let start = Utc::now() - chrono::Duration::days(recency_days);
    start.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Exa 客户端：持有 reqwest::Client 与可选凭证；凭证缺失时检索降级而非报错
pub struct ExaSearchClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    max_content_chars: usize,
}

impl ExaSearchClient {
    pub fn new(
        api_key: Option<String>,
        endpoint: Option<&str>,
        timeout_secs: u64,
        max_content_chars: usize,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            endpoint: endpoint.unwrap_or(EXA_ENDPOINT).to_string(),
            max_content_chars,
        }
    }
}

#[async_trait]
impl SearchClient for ExaSearchClient {
    async fn search(&self, query: &SearchQuery) -> SearchResponse {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                return SearchResponse::failure(&query.query, "EXA API key not configured");
            }
        };

        let request = ExaSearchRequest {
            query: query.query.clone(),
            num_results: query.max_results.clamp(1, 10) as u32,
            search_type: "auto".to_string(),
            start_published_date: start_published_date(query.recency_days),
            contents: ExaContents {
                text: ExaTextConfig {
                    max_characters: self.max_content_chars as u32,
                },
            },
        };

        tracing::info!(query = %query.query, days = query.recency_days, "exa search");

        let response = match self
            .client
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => return SearchResponse::failure(&query.query, format!("Request failed: {}", e)),
        };

        if !response.status().is_success() {
            return SearchResponse::failure(&query.query, format!("HTTP {}", response.status()));
        }

        let body: ExaSearchResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                return SearchResponse::failure(&query.query, format!("Decode failed: {}", e))
            }
        };

        let results = body
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title.unwrap_or_default(),
                url: r.url.unwrap_or_default(),
                published_date: r.published_date,
                content_preview: r.text,
            })
            .collect();

        SearchResponse::ok(&query.query, results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_exa_wire_shape() {
        let request = ExaSearchRequest {
            query: "latest developments in quantum computing".into(),
            num_results: 5,
            search_type: "auto".into(),
            start_published_date: "2024-05-01T00:00:00.000Z".into(),
            contents: ExaContents {
                text: ExaTextConfig {
                    max_characters: 2000,
                },
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["numResults"], 5);
        assert_eq!(json["type"], "auto");
        assert_eq!(json["startPublishedDate"], "2024-05-01T00:00:00.000Z");
        assert_eq!(json["contents"]["text"]["maxCharacters"], 2000);
    }

    #[test]
    fn response_decoding_tolerates_missing_fields() {
        let body: ExaSearchResponse = serde_json::from_str(
            r#"{"results": [{"title": "Qubit milestone", "url": "https://example.com/a"},
                            {"url": "https://example.com/b", "text": "preview text"}]}"#,
        )
        .unwrap();
        assert_eq!(body.results.len(), 2);
        assert!(body.results[0].text.is_none());
        assert_eq!(body.results[1].text.as_deref(), Some("preview text"));
        assert!(body.results[1].title.is_none());
    }

    #[test]
    fn start_date_is_iso8601_utc() {
        let date = start_published_date(30);
        assert!(date.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&date).is_ok());
    }

    #[tokio::test]
    async fn missing_credential_degrades_without_error() {
        let client = ExaSearchClient::new(None, None, 5, 2000);
        let response = client
            .search(&SearchQuery::new("impact of quantum computing", 60, 5))
            .await;
        assert!(!response.success);
        assert!(response.results.is_empty());
        assert!(response
            .error_message
            .as_deref()
            .unwrap()
            .contains("API key"));
    }
}
