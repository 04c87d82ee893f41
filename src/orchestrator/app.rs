//! 应用入口 - 编排层
//!
//! 读取文档 → 运行审查流水线 → 写出 JSON 报告 → 打印统计。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::orchestrator::pipeline::{ExpertisePipeline, ExpertiseReport};
use crate::services::{Analyzer, OpenAiAnalyzer};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    document_path: PathBuf,
    pipeline: ExpertisePipeline,
}

impl App {
    /// 使用配置中的 LLM 初始化应用
    pub fn initialize(config: Config, document_path: impl Into<PathBuf>) -> Self {
        let analyzer: Arc<dyn Analyzer> = Arc::new(OpenAiAnalyzer::new(&config));
        info!("🤖 分析模型: {}", analyzer.model_name());
        Self::with_analyzer(config, document_path, analyzer)
    }

    /// 使用指定的分析器初始化应用
    pub fn with_analyzer(
        config: Config,
        document_path: impl Into<PathBuf>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        let pipeline = ExpertisePipeline::from_config(analyzer, &config);
        Self {
            config,
            document_path: document_path.into(),
            pipeline,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<ExpertiseReport> {
        log_startup(
            &self.document_path.display().to_string(),
            self.config.batch_size,
            self.config.concurrency,
        );
        info!("📋 审查阶段: {}", self.pipeline.stage_names().join(", "));

        let document = tokio::fs::read_to_string(&self.document_path)
            .await
            .map_err(|source| AppError::Io {
                path: self.document_path.display().to_string(),
                source,
            })?;
        info!("📄 文档已读取: {} 字符", document.chars().count());

        let report = self
            .pipeline
            .run_with_skips(&document, &self.config.skip_stages)
            .await;

        write_report(Path::new(&self.config.report_path), &report).await?;

        let (analyzed, total) = report.stages.iter().fold((0, 0), |(a, t), s| {
            (
                a + s.completeness.analyzed_articles,
                t + s.completeness.total_articles,
            )
        });
        print_final_stats(analyzed, total, report.is_complete, &self.config.report_path);

        Ok(report)
    }
}

/// 把报告写成 JSON 文件
async fn write_report(path: &Path, report: &ExpertiseReport) -> AppResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })
}
