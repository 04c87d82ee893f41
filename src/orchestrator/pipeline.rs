//! 审查流水线 - 编排层
//!
//! 一次审查的完整过程：
//!
//! 1. 解析文档，检查条编号（仅警告）
//! 2. 对每个审查阶段建立独立的完整性账本
//! 3. 分批并发分析；账本未完成时对遗漏的条逐条补分析
//! 4. 汇总为 `ExpertiseReport`
//!
//! 流水线本身不会失败：最坏结果是一份标明遗漏条编号的未完成报告。

use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::ledger::CompletenessLedger;
use crate::models::{AnalysisResult, Batch, CompletionReport, Fragment};
use crate::orchestrator::scheduler::ParallelScheduler;
use crate::parser::{check_sequence, FragmentStats, FragmentTree, NumberingWarning, StructuralParser};
use crate::services::{Analyzer, ExpertProfile};
use crate::utils::logging::log_stage_start;
use crate::workflow::BatchAnalyzer;

/// 流水线参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub batch_size: usize,
    pub concurrency: usize,
    pub retry_rounds: usize,
    pub call_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            concurrency: 3,
            retry_rounds: 1,
            call_timeout: None,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            concurrency: config.concurrency,
            retry_rounds: config.retry_rounds,
            call_timeout: config.call_timeout(),
        }
    }
}

/// 单个审查阶段的结果
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage_name: String,
    pub started_at: String,
    pub duration_seconds: f64,
    /// 实际执行的补分析轮数
    pub retry_rounds_used: usize,
    /// 失败的分析调用次数（含补分析）
    pub failed_calls: usize,
    pub completeness: CompletionReport,
    /// 已挂到清单上的结果，文档顺序
    pub results: Vec<AnalysisResult>,
}

/// 整次审查的报告
#[derive(Debug, Clone, Serialize)]
pub struct ExpertiseReport {
    pub started_at: String,
    pub finished_at: String,
    pub parsing: FragmentStats,
    pub numbering_warnings: Vec<NumberingWarning>,
    pub skipped_stages: Vec<String>,
    pub stages: Vec<StageReport>,
    /// 所有执行的阶段都完整
    pub is_complete: bool,
    /// 各阶段成功结果总数
    pub findings_count: usize,
}

impl ExpertiseReport {
    /// 第一个未完成阶段的遗漏条编号
    pub fn first_gap(&self) -> Option<(&str, &[String])> {
        self.stages
            .iter()
            .find(|s| !s.completeness.is_complete)
            .map(|s| {
                (
                    s.stage_name.as_str(),
                    s.completeness.missing_article_numbers.as_slice(),
                )
            })
    }
}

/// 审查流水线
pub struct ExpertisePipeline {
    analyzer: Arc<dyn Analyzer>,
    stages: Vec<ExpertProfile>,
    options: PipelineOptions,
}

impl ExpertisePipeline {
    pub fn new(analyzer: Arc<dyn Analyzer>, stages: Vec<ExpertProfile>, options: PipelineOptions) -> Self {
        Self {
            analyzer,
            stages,
            options,
        }
    }

    pub fn from_config(analyzer: Arc<dyn Analyzer>, config: &Config) -> Self {
        Self::new(analyzer, config.expert_stages(), PipelineOptions::from(config))
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// 执行全部阶段
    pub async fn run(&self, document: &str) -> ExpertiseReport {
        self.run_with_skips(document, &[]).await
    }

    /// 执行审查，跳过名称在 `skip_stages` 中的阶段
    pub async fn run_with_skips(&self, document: &str, skip_stages: &[String]) -> ExpertiseReport {
        let started_at = Local::now().to_rfc3339();

        let tree = StructuralParser::new().parse(document);
        let parsing = tree.stats();
        info!(
            "✅ 文档解析完成: {} 个片段，其中 {} 条",
            parsing.total_fragments, parsing.articles
        );
        if parsing.articles == 0 {
            warn!("⚠️ 未识别到任何条，完整性检查将为空真");
        }

        let numbering_warnings = check_sequence(tree.articles());
        for warning in &numbering_warnings {
            warn!("⚠️ {}", warning);
        }

        let active: Vec<&ExpertProfile> = self
            .stages
            .iter()
            .filter(|s| !skip_stages.iter().any(|skip| skip == &s.name))
            .collect();
        let skipped_stages: Vec<String> = self
            .stages
            .iter()
            .filter(|s| skip_stages.iter().any(|skip| skip == &s.name))
            .map(|s| s.name.clone())
            .collect();
        for name in &skipped_stages {
            info!("⏭️ 跳过阶段: {}", name);
        }

        let mut stages = Vec::with_capacity(active.len());
        for (i, profile) in active.iter().enumerate() {
            log_stage_start(&profile.name, i + 1, active.len(), parsing.articles);
            stages.push(self.run_stage(profile, &tree).await);
        }

        let is_complete = stages.iter().all(|s| s.completeness.is_complete);
        let findings_count = stages.iter().map(|s| s.results.len()).sum();

        let report = ExpertiseReport {
            started_at,
            finished_at: Local::now().to_rfc3339(),
            parsing,
            numbering_warnings,
            skipped_stages,
            stages,
            is_complete,
            findings_count,
        };

        if let Some((stage, missing)) = report.first_gap() {
            error!(
                "⚠️ 阶段 '{}' 未完成，遗漏条: {}",
                stage,
                missing.join(", ")
            );
        }
        report
    }

    async fn run_stage(&self, profile: &ExpertProfile, tree: &FragmentTree) -> StageReport {
        let started_at = Local::now().to_rfc3339();
        let clock = Instant::now();

        let mut ledger = CompletenessLedger::new(tree.articles());
        let articles: Vec<Fragment> = ledger.missing().into_iter().cloned().collect();
        let analyzer = BatchAnalyzer::new(self.analyzer.clone(), profile.clone())
            .with_call_timeout(self.options.call_timeout);
        let scheduler = ParallelScheduler::new(self.options.concurrency);

        let checklist = ledger.render_checklist();
        let results = scheduler
            .run_into_ledger(
                &analyzer,
                Batch::split(&articles, self.options.batch_size),
                &checklist,
                &mut ledger,
            )
            .await;
        let mut failed_calls = results.iter().filter(|r| !r.succeeded).count();

        let mut retry_rounds_used = 0;
        while !ledger.is_complete() && retry_rounds_used < self.options.retry_rounds {
            retry_rounds_used += 1;
            let missing: Vec<Fragment> = ledger.missing().into_iter().cloned().collect();
            warn!(
                "🔄 [{}] 第 {} 轮补分析: {} 条遗漏",
                profile.name,
                retry_rounds_used,
                missing.len()
            );

            let checklist = ledger.render_checklist();
            let retried = scheduler
                .run_into_ledger(&analyzer, Batch::split(&missing, 1), &checklist, &mut ledger)
                .await;
            failed_calls += retried.iter().filter(|r| !r.succeeded).count();
        }

        let completeness = ledger.report();
        if completeness.is_complete {
            info!("✅ [{}] {}", profile.name, completeness.recommendation);
        } else {
            error!(
                "⚠️ [{}] {} 遗漏: {}",
                profile.name,
                completeness.recommendation,
                completeness.missing_article_numbers.join(", ")
            );
        }

        StageReport {
            stage_name: profile.name.clone(),
            started_at,
            duration_seconds: clock.elapsed().as_secs_f64(),
            retry_rounds_used,
            failed_calls,
            completeness,
            results: ledger.results().cloned().collect(),
        }
    }
}
