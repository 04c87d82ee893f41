use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{error, warn};

use statute_review::utils::logging;
use statute_review::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(document_path) = args.first() else {
        bail!("用法: statute_review <document.txt> [config.toml]");
    };

    // 加载配置
    let config = Config::load(args.get(1).map(Path::new)).context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    if config.llm_api_key.is_empty() {
        warn!("⚠️ 未设置 LLM_API_KEY");
    }

    // 初始化并运行应用
    let report = App::initialize(config, document_path).run().await?;

    if !report.is_complete {
        error!("❌ 审查未完成，请对遗漏的条重新分析");
        std::process::exit(2);
    }

    Ok(())
}
