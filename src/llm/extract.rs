//! 回复正文提取
//!
//! 对 LlmReply 按命名字段的优先级顺序探测正文；全部缺失时退回 raw 负载的
//! 字符串化。识别的字段名列表来自配置（[llm].reply_fields），不是稳定协议。

use crate::llm::LlmReply;

/// 默认探测顺序
pub const DEFAULT_REPLY_FIELDS: [&str; 3] = ["response_message", "content", "response_content"];

/// 按优先级探测 LlmReply 正文字段的提取器
#[derive(Debug, Clone)]
pub struct TextExtractor {
    fields: Vec<String>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self {
            fields: DEFAULT_REPLY_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextExtractor {
    /// 使用自定义字段顺序；空列表退回默认顺序
    pub fn new(fields: Vec<String>) -> Self {
        if fields.is_empty() {
            Self::default()
        } else {
            Self { fields }
        }
    }

    /// 依序探测各字段，命中第一个非空值；未命中的字段名直接跳过
    pub fn extract(&self, reply: &LlmReply) -> String {
        for field in &self.fields {
            let value = match field.as_str() {
                "response_message" => reply.response_message.as_deref(),
                "content" => reply.content.as_deref(),
                "response_content" => reply.response_content.as_deref(),
                _ => None,
            };
            if let Some(text) = value {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }

        // 兜底：raw 负载字符串化（字符串值取内容本身，避免多一层引号）；
        // raw 也缺失时退回整个回复对象的字符串化
        match &reply.raw {
            Some(raw) => raw
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| raw.to_string()),
            None => format!("{:?}", reply),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_sole_content_field() {
        let reply = LlmReply::from_content("the research text");
        let extractor = TextExtractor::default();
        assert_eq!(extractor.extract(&reply), "the research text");
    }

    #[test]
    fn respects_precedence_order() {
        let reply = LlmReply {
            response_message: Some("first".into()),
            content: Some("second".into()),
            ..Default::default()
        };
        assert_eq!(TextExtractor::default().extract(&reply), "first");

        let reversed = TextExtractor::new(vec!["content".into(), "response_message".into()]);
        assert_eq!(reversed.extract(&reply), "second");
    }

    #[test]
    fn skips_unknown_and_empty_fields() {
        let reply = LlmReply {
            response_message: Some(String::new()),
            response_content: Some("fallthrough".into()),
            ..Default::default()
        };
        let extractor = TextExtractor::new(vec![
            "no_such_field".into(),
            "response_message".into(),
            "response_content".into(),
        ]);
        assert_eq!(extractor.extract(&reply), "fallthrough");
    }

    #[test]
    fn falls_back_to_raw_payload() {
        let reply = LlmReply {
            raw: Some(json!("plain string payload")),
            ..Default::default()
        };
        assert_eq!(
            TextExtractor::default().extract(&reply),
            "plain string payload"
        );

        let structured = LlmReply {
            raw: Some(json!({"text": "x"})),
            ..Default::default()
        };
        assert_eq!(
            TextExtractor::default().extract(&structured),
            r#"{"text":"x"}"#
        );
    }
}
