//! 批量分析流程 - 流程层
//!
//! 核心职责：定义"一批条"的完整分析流程
//!
//! 流程顺序：
//! 1. 只有一条 → 直接走逐条路径
//! 2. 多条 → 合并为一次分组调用，按横幅拆分响应
//! 3. 某条找不到横幅 → 用完整响应兜底（降级但不丢失）
//! 4. 分组调用本身失败 → 本批每条各自走逐条路径

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AnalyzerError;
use crate::models::{AnalysisResult, Batch, Fragment};
use crate::orchestrator::scheduler::ParallelScheduler;
use crate::services::{Analyzer, ExpertProfile, GroupResponse};

/// 批量分析流程
///
/// - 不持有清单，只产出结果
/// - 每个输入片段恰好产出一个结果
/// - 克隆成本低，可以直接移入并发任务
#[derive(Clone)]
pub struct BatchAnalyzer {
    analyzer: Arc<dyn Analyzer>,
    profile: Arc<ExpertProfile>,
    call_timeout: Option<Duration>,
}

impl BatchAnalyzer {
    pub fn new(analyzer: Arc<dyn Analyzer>, profile: ExpertProfile) -> Self {
        Self {
            analyzer,
            profile: Arc::new(profile),
            call_timeout: None,
        }
    }

    /// 设置单次调用期限，超时按调用失败处理
    pub fn with_call_timeout(mut self, call_timeout: Option<Duration>) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// 结果中的 `agent_name`
    pub fn agent_name(&self) -> &str {
        &self.profile.name
    }

    pub fn profile(&self) -> &ExpertProfile {
        &self.profile
    }

    async fn call(&self, prompt: &str) -> Result<String, AnalyzerError> {
        let call = self.analyzer.generate(prompt, &self.profile.system_prompt);
        match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| AnalyzerError::Timeout { limit })?,
            None => call.await,
        }
    }

    /// 逐条路径：一次调用，一个结果
    pub async fn analyze_fragment(&self, fragment: &Fragment, checklist: &str) -> AnalysisResult {
        debug!("[{}] 分析: {}", self.agent_name(), fragment.full_path);

        let prompt = self.profile.fragment_prompt(fragment, checklist);
        match self.call(&prompt).await {
            Ok(text) => {
                debug!("[{}] 条 {} 分析完成", self.agent_name(), fragment.number);
                AnalysisResult::success(fragment, self.agent_name(), text, false)
            }
            Err(e) => {
                warn!(
                    "[{}] ❌ 条 {} 分析失败: {}",
                    self.agent_name(),
                    fragment.number,
                    e
                );
                AnalysisResult::failure(fragment, self.agent_name(), e)
            }
        }
    }

    /// 分析一批，返回的结果与 `batch.fragments` 一一对应
    pub async fn analyze_batch(&self, batch: &Batch, checklist: &str) -> Vec<AnalysisResult> {
        match batch.fragments.as_slice() {
            [] => Vec::new(),
            [single] => vec![self.analyze_fragment(single, checklist).await],
            fragments => self.analyze_group(fragments, checklist).await,
        }
    }

    async fn analyze_group(&self, fragments: &[Fragment], checklist: &str) -> Vec<AnalysisResult> {
        let prompt = self.profile.group_prompt(fragments, checklist);
        match self.call(&prompt).await {
            Ok(response) => self.split_group_response(fragments, &response),
            Err(e) => {
                warn!(
                    "[{}] ⚠️ 分组调用失败，回退为逐条分析 ({} 条): {}",
                    self.agent_name(),
                    fragments.len(),
                    e
                );
                join_all(fragments.iter().map(|f| self.analyze_fragment(f, checklist))).await
            }
        }
    }

    /// 把分组响应拆回每条的结果
    ///
    /// 找不到自己横幅的条使用完整响应，仍视为成功。
    pub fn split_group_response(&self, fragments: &[Fragment], response: &str) -> Vec<AnalysisResult> {
        let parsed = GroupResponse::parse(response);
        debug!(
            "[{}] 分组响应解析出 {}/{} 段",
            self.agent_name(),
            parsed.len(),
            fragments.len()
        );

        fragments
            .iter()
            .map(|fragment| match parsed.section(&fragment.number) {
                Some(text) => AnalysisResult::success(fragment, self.agent_name(), text, true),
                None => {
                    warn!(
                        "[{}] 条 {} 的分析横幅缺失或格式错误，使用完整响应",
                        self.agent_name(),
                        fragment.number
                    );
                    AnalysisResult::success(fragment, self.agent_name(), response, true)
                }
            })
            .collect()
    }

    /// 分批并发分析全部片段；结果顺序不保证，按 `fragment_number` 对应
    pub async fn analyze_all(
        &self,
        fragments: &[Fragment],
        checklist: &str,
        batch_size: usize,
        concurrency: usize,
    ) -> Vec<AnalysisResult> {
        let batches = Batch::split(fragments, batch_size);
        info!(
            "[{}] 共 {} 条，分为 {} 批，并发 {}",
            self.agent_name(),
            fragments.len(),
            batches.len(),
            concurrency
        );
        ParallelScheduler::new(concurrency)
            .run(self, batches, checklist, |_, _| {})
            .await
    }
}
