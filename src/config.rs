//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `NEWSROOM__*` 覆盖
//! （双下划线表示嵌套，如 `NEWSROOM__LLM__PROVIDER=openai`）。
//! 凭证是显式可选字段：[search].api_key 缺失时检索降级，不阻塞启动。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::DEFAULT_REPLY_FIELDS;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择、模型与回复字段优先级
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / deepseek；实际选择还取决于哪个 API Key 在场
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// 采样温度；检索/分析类场景常配较低值（如 0.1）
    pub temperature: Option<f32>,
    /// 回复正文字段的探测顺序（兼容层配置，非稳定协议）
    pub reply_fields: Vec<String>,
    pub openai: LlmOpenAiSection,
    pub deepseek: LlmDeepSeekSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            temperature: None,
            reply_fields: default_reply_fields(),
            openai: LlmOpenAiSection::default(),
            deepseek: LlmDeepSeekSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_reply_fields() -> Vec<String> {
    DEFAULT_REPLY_FIELDS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

/// [search] 段：Exa 凭证（可选）、端点与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    /// 显式可选凭证；None 时所有检索返回 success=false
    pub api_key: Option<String>,
    /// 覆盖默认端点（测试/代理用）
    pub endpoint: Option<String>,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
    /// 请求 Exa 返回的单条正文字符上限
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            timeout_secs: default_search_timeout_secs(),
            max_content_chars: default_max_content_chars(),
        }
    }
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_max_content_chars() -> usize {
    2000
}

/// [tools] 段：工具调用超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            search: SearchSection::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 NEWSROOM__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 NEWSROOM__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("NEWSROOM")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_original_constants() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.llm.model, "gpt-4-turbo");
        assert_eq!(
            cfg.llm.reply_fields,
            vec!["response_message", "content", "response_content"]
        );
        assert!(cfg.search.api_key.is_none());
        assert_eq!(cfg.search.timeout_secs, 15);
        assert_eq!(cfg.tools.tool_timeout_secs, 30);
    }

    #[test]
    fn loads_overrides_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "deepseek"
temperature = 0.1

[search]
api_key = "exa-test-key"
timeout_secs = 5
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.provider, "deepseek");
        assert_eq!(cfg.llm.temperature, Some(0.1));
        assert_eq!(cfg.search.api_key.as_deref(), Some("exa-test-key"));
        assert_eq!(cfg.search.timeout_secs, 5);
        // 未覆盖的键保持默认
        assert_eq!(cfg.llm.model, "gpt-4-turbo");
    }
}
