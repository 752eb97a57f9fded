//! 检索结果摘要渲染
//!
//! 把原始检索结果拼成注入 Prompt 用的有界可读摘要。纯函数：无副作用、
//! 无失败路径，缺失字段按空渲染；单条预览截断在 300 字符。

use crate::search::{SearchResponse, SearchResult};

/// 单条预览的字符上限
pub const PREVIEW_CHARS: usize = 300;

fn truncate_chars(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// 渲染一次检索的结果段落：标题行 + 按序编号的条目
pub fn format_results(results: &[SearchResult], query: &str) -> String {
    let mut out = format!("Search for '{}' found {} results:\n\n", query, results.len());
    for (i, result) in results.iter().enumerate() {
        out.push_str(&format!("[Result {}]\n", i + 1));
        out.push_str(&format!("Title: {}\n", result.title));
        out.push_str(&format!("URL: {}\n", result.url));
        out.push_str(&format!(
            "Published: {}\n",
            result.published_date.as_deref().unwrap_or("")
        ));
        if let Some(preview) = result.content_preview.as_deref() {
            if !preview.is_empty() {
                out.push_str(&format!(
                    "Preview: {}...\n\n",
                    truncate_chars(preview, PREVIEW_CHARS)
                ));
            }
        }
    }
    out
}

/// 汇总两次检索为注入用摘要；失败的响应不产生段落（降级而非中断）
pub fn build_digest(primary: &SearchResponse, secondary: &SearchResponse) -> String {
    let mut digest = String::from("SEARCH RESULTS:\n\n");
    if primary.success {
        digest.push_str(&format_results(&primary.results, &primary.query));
    }
    if secondary.success {
        digest.push('\n');
        digest.push_str(&format_results(&secondary.results, &secondary.query));
    }
    digest
}
