//! 四个固定角色：researcher / insights / writer / editor
//!
//! 每个角色固定人设、任务指令与输出格式；检索类角色持有 search_and_contents 工具，
//! 调用预算 5 次。角色在编排器初始化时构建一次，跨运行复用。

use crate::agent::AgentRole;
use crate::tools::search::SEARCH_TOOL_NAME;

/// 检索类角色的工具调用预算
const SEARCH_TOOL_ATTEMPTS: usize = 5;

/// 一组流水线角色，按阶段顺序持有
#[derive(Debug, Clone)]
pub struct Roles {
    pub researcher: AgentRole,
    pub insights: AgentRole,
    pub writer: AgentRole,
    pub editor: AgentRole,
}

impl Roles {
    pub fn new() -> Self {
        Self {
            researcher: researcher(),
            insights: insights_expert(),
            writer: writer(),
            editor: editor(),
        }
    }
}

impl Default for Roles {
    fn default() -> Self {
        Self::new()
    }
}

fn researcher() -> AgentRole {
    AgentRole::new(
        "researcher",
        "You are an AI Researcher tracking the latest advancements and trends in AI, \
         machine learning, and deep learning.",
        "Analyze the search results provided in your context and organize them into \
         comprehensive research with reliable sources. Include the exact queries behind \
         the findings and summarize the most relevant ones. If you need more specific \
         information, use the search_and_contents tool with a specific query.",
        "1. Organize your findings into clear sections with source links.\n\
         2. Always highlight the potential impact of each development.",
    )
    .with_tools(vec![SEARCH_TOOL_NAME.to_string()], SEARCH_TOOL_ATTEMPTS)
}

fn insights_expert() -> AgentRole {
    AgentRole::new(
        "insights",
        "You are an AI Insights Expert with deep knowledge of the field of AI.",
        "Verify and expand upon the research provided. Provide detailed analysis on the \
         significance, applications, and future potential of each development. If you \
         need any specific information, use the search_and_contents tool with a \
         specific query.",
        "1. Organize your analysis into clear sections.\n\
         2. Always include potential industry implications and future directions.",
    )
    .with_tools(vec![SEARCH_TOOL_NAME.to_string()], SEARCH_TOOL_ATTEMPTS)
}

fn writer() -> AgentRole {
    AgentRole::new(
        "writer",
        "You are a Newsletter Content Creator with expertise in writing about AI \
         technologies.",
        "Transform insights from the AI Insights Expert into engaging and \
         reader-friendly newsletter content about recent developments in AI, machine \
         learning, and deep learning. Make complex topics accessible and engaging for \
         a diverse audience, highlighting the innovation, relevance, and potential \
         impact of each development.",
        "Write in a professional yet engaging tone. Structure the content with clear \
         headings and concise paragraphs. Keep the content aligned with the \
         newsletter's goals.",
    )
}

fn editor() -> AgentRole {
    AgentRole::new(
        "editor",
        "You are a meticulous Newsletter Editor for AI content.",
        "Proofread, refine, and structure the newsletter to ensure it is ready for \
         publication. Maintain professional tone while ensuring content is accessible \
         to the target audience. Ensure clarity, eliminate errors, enhance readability, \
         and align the tone with the newsletter's vision. Focus on improving flow, \
         highlighting key insights effectively, and ensuring the newsletter engages \
         the audience.",
        "Include valid website URLs to reliable sources for the advancements \
         discussed. Format the newsletter with proper headings, bullet points, and \
         paragraph spacing. Ensure all technical terms are adequately explained for \
         the target audience.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_roles_carry_the_tool_budget() {
        let roles = Roles::new();
        assert_eq!(roles.researcher.tools, vec![SEARCH_TOOL_NAME]);
        assert_eq!(roles.researcher.max_tool_call_attempts, 5);
        assert_eq!(roles.insights.tools, vec![SEARCH_TOOL_NAME]);
        assert!(roles.writer.tools.is_empty());
        assert!(roles.editor.tools.is_empty());
    }

    #[test]
    fn system_prompt_advertises_tools_only_when_carried() {
        let roles = Roles::new();
        let descriptions = vec![(
            SEARCH_TOOL_NAME.to_string(),
            "Search the web".to_string(),
        )];
        let researcher_prompt = roles.researcher.system_prompt(&descriptions);
        assert!(researcher_prompt.contains("Available tools:"));
        assert!(researcher_prompt.contains(SEARCH_TOOL_NAME));

        let writer_prompt = roles.writer.system_prompt(&descriptions);
        assert!(!writer_prompt.contains("Available tools:"));
    }
}
