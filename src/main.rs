//! Newsroom - Rust 多智能体 Newsletter 生成流水线
//!
//! 入口：初始化日志、凭证检查（Exa 缺失时交互确认）、组装流水线并运行，
//! 输出最终 Newsletter，并可交互查看中间阶段产物。

use std::io::{self, Write};
use std::sync::Arc;

use newsroom::config::{load_config, AppConfig};
use newsroom::llm::create_llm_from_config;
use newsroom::pipeline::PipelineOrchestrator;
use newsroom::search::{ExaSearchClient, SearchClient};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 读取一行交互输入（提示写到 stdout 并立即刷新）
fn prompt_line(prompt: &str) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// 凭证门控的判定：仅 y/Y 视为继续
fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    // 凭证在入口处解析一次，库内不再读环境变量
    let exa_api_key = cfg
        .search
        .api_key
        .clone()
        .or_else(|| std::env::var("EXA_API_KEY").ok());
    let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
    let deepseek_api_key = std::env::var("DEEPSEEK_API_KEY").ok();

    // Exa 凭证缺失：告警 + 交互门控（拒绝则退出码 1，不构建任何 Agent）
    if exa_api_key.is_none() {
        println!("⚠️ Warning: EXA_API_KEY environment variable not set.");
        println!("Web search functionality will not work without an Exa API key.");
        println!("Get an API key from https://exa.ai and set it as an environment variable.");
        let answer = prompt_line("Do you want to proceed without web search? (y/n): ")?;
        if !is_yes(&answer) {
            println!("Exiting. Please set the EXA_API_KEY environment variable and try again.");
            std::process::exit(1);
        }
    }

    println!("Initializing newsletter generation agents...");
    let llm = create_llm_from_config(
        &cfg.llm,
        openai_api_key.as_deref(),
        deepseek_api_key.as_deref(),
    );
    let search: Arc<dyn SearchClient> = Arc::new(ExaSearchClient::new(
        exa_api_key,
        cfg.search.endpoint.as_deref(),
        cfg.search.timeout_secs,
        cfg.search.max_content_chars,
    ));
    let orchestrator = PipelineOrchestrator::new(&cfg, llm, search);

    // 主题：命令行参数拼接，否则交互输入
    let args: Vec<String> = std::env::args().skip(1).collect();
    let topic = if args.is_empty() {
        prompt_line("Enter a topic for your AI newsletter: ")?
    } else {
        args.join(" ")
    };

    println!("\n===== GENERATING NEWSLETTER ON: {} =====\n", topic);
    println!("This may take a few minutes...\n");

    let result = match orchestrator.run(&topic).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "newsletter generation failed");
            eprintln!("\n❌ Error during newsletter generation: {}", e);
            eprintln!("Please check your API keys and internet connection and try again.");
            return Err(e.into());
        }
    };

    println!("\n===== FINAL NEWSLETTER =====\n");
    println!("{}", result.final_text);

    let show_details = prompt_line("\nWould you like to see the intermediate steps? (y/n): ")?;
    if is_yes(&show_details) {
        println!("\n===== RESEARCH CONTENT =====\n");
        println!("{}", result.research);

        println!("\n===== INSIGHTS CONTENT =====\n");
        println!("{}", result.insights);

        println!("\n===== DRAFT NEWSLETTER =====\n");
        println!("{}", result.draft);
    }

    Ok(())
}
