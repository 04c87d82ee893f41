//! 并行调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：使用 Semaphore 限制同时进行的批次数
//! 2. **任务隔离**：每批一个 tokio 任务，一批崩溃不影响其它批
//! 3. **结果汇总**：按完成顺序收集结果，在同一个循环里交给调用方合并
//!
//! 账本只由收集循环写入，工作任务之间不共享任何可变状态。

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::ledger::CompletenessLedger;
use crate::models::{AnalysisResult, Batch};
use crate::utils::logging::log_batch_complete;
use crate::workflow::BatchAnalyzer;

/// 并行调度器
#[derive(Debug, Clone, Copy)]
pub struct ParallelScheduler {
    workers: usize,
}

impl ParallelScheduler {
    /// `workers` 为 0 时按 1 处理
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 并发处理所有批次
    ///
    /// 每批完成后调用一次 `on_batch`（在调用方所在任务中，按完成顺序）。
    /// 崩溃的批次为其每个片段产出失败结果。
    pub async fn run<F>(
        &self,
        analyzer: &BatchAnalyzer,
        batches: Vec<Batch>,
        checklist: &str,
        mut on_batch: F,
    ) -> Vec<AnalysisResult>
    where
        F: FnMut(&Batch, &[AnalysisResult]),
    {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let checklist: Arc<str> = Arc::from(checklist);
        let mut pending = FuturesUnordered::new();

        // 为每批创建并发任务
        for batch in batches {
            let index = batch.index;
            let semaphore = semaphore.clone();
            let worker = analyzer.clone();
            let checklist = checklist.clone();
            let task_batch = batch.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return task_batch
                        .fragments
                        .iter()
                        .map(|f| AnalysisResult::failure(f, worker.agent_name(), "调度器已关闭"))
                        .collect::<Vec<_>>();
                };
                debug!("第 {} 批开始: {:?}", index + 1, task_batch.numbers());
                worker.analyze_batch(&task_batch, &checklist).await
            });

            // 批次随任务一起返回，不按 index 查找
            pending.push(async move { (batch, handle.await) });
        }

        // 按完成顺序收集
        let mut results = Vec::new();
        while let Some((batch, joined)) = pending.next().await {
            let index = batch.index;
            let batch_results: Vec<AnalysisResult> = match joined {
                Ok(batch_results) => batch_results,
                Err(e) => {
                    error!("第 {} 批任务执行失败: {}", index + 1, e);
                    batch
                        .fragments
                        .iter()
                        .map(|f| {
                            AnalysisResult::failure(
                                f,
                                analyzer.agent_name(),
                                format!("批次任务执行失败: {}", e),
                            )
                        })
                        .collect()
                }
            };

            let success = batch_results.iter().filter(|r| r.succeeded).count();
            log_batch_complete(index + 1, success, batch.len());

            on_batch(&batch, &batch_results);
            results.extend(batch_results);
        }

        results
    }

    /// 并发处理所有批次，并把成功结果逐批合并进账本
    pub async fn run_into_ledger(
        &self,
        analyzer: &BatchAnalyzer,
        batches: Vec<Batch>,
        checklist: &str,
        ledger: &mut CompletenessLedger,
    ) -> Vec<AnalysisResult> {
        self.run(analyzer, batches, checklist, |_, batch_results| {
            for result in batch_results {
                ledger.record(result);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use crate::models::{Fragment, FragmentKind};
    use crate::services::{Analyzer, ExpertProfile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// 记录同时在途的调用数
    #[derive(Default)]
    struct GaugeAnalyzer {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Analyzer for GaugeAnalyzer {
        fn model_name(&self) -> &str {
            "gauge"
        }

        async fn generate(&self, _prompt: &str, _system_message: &str) -> Result<String, AnalyzerError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok("анализ".into())
        }
    }

    /// 含 "Статья 2" 的请求直接崩溃
    struct PanickyAnalyzer;

    #[async_trait]
    impl Analyzer for PanickyAnalyzer {
        fn model_name(&self) -> &str {
            "panicky"
        }

        async fn generate(&self, prompt: &str, _system_message: &str) -> Result<String, AnalyzerError> {
            if prompt.contains("Статья 2\n") {
                panic!("сбой анализатора");
            }
            Ok("анализ".into())
        }
    }

    fn articles(count: usize) -> Vec<Fragment> {
        (1..=count)
            .map(|n| Fragment {
                kind: FragmentKind::Article,
                number: n.to_string(),
                title: None,
                text: format!("Статья {}\nтекст", n),
                full_path: format!("Глава 1 → Статья {}", n),
                parent_number: Some("1".into()),
                char_start: 0,
                char_end: 0,
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_limit_is_respected() {
        let gauge = Arc::new(GaugeAnalyzer::default());
        let analyzer = BatchAnalyzer::new(gauge.clone(), ExpertProfile::default());
        let batches = Batch::split(&articles(10), 1);

        let results = ParallelScheduler::new(2)
            .run(&analyzer, batches, "", |_, _| {})
            .await;

        assert_eq!(results.len(), 10);
        assert!(gauge.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_panicking_batch_leaves_fragments_missing() {
        let fragments = articles(4);
        let analyzer = BatchAnalyzer::new(Arc::new(PanickyAnalyzer), ExpertProfile::default());
        let mut ledger = CompletenessLedger::new(&fragments);

        let results = ParallelScheduler::new(2)
            .run_into_ledger(&analyzer, Batch::split(&fragments, 1), "", &mut ledger)
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results.iter().filter(|r| !r.succeeded).count(), 1);
        let missing: Vec<_> = ledger.missing().iter().map(|f| f.number.clone()).collect();
        assert_eq!(missing, vec!["2"]);
    }

    #[tokio::test]
    async fn test_batches_with_same_index_keep_all_results() {
        let fragments = articles(4);
        let analyzer = BatchAnalyzer::new(Arc::new(GaugeAnalyzer::default()), ExpertProfile::default());
        let batches = vec![
            Batch {
                index: 0,
                fragments: fragments[..2].to_vec(),
            },
            Batch {
                index: 0,
                fragments: fragments[2..].to_vec(),
            },
        ];
        let mut ledger = CompletenessLedger::new(&fragments);

        let results = ParallelScheduler::new(2)
            .run_into_ledger(&analyzer, batches, "", &mut ledger)
            .await;

        let mut numbers: Vec<_> = results.iter().map(|r| r.fragment_number.clone()).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec!["1", "2", "3", "4"]);
        assert!(ledger.is_complete());
    }

    #[tokio::test]
    async fn test_on_batch_sees_every_batch_once() {
        let fragments = articles(5);
        let analyzer = BatchAnalyzer::new(Arc::new(GaugeAnalyzer::default()), ExpertProfile::default());
        let mut seen = Vec::new();

        ParallelScheduler::new(3)
            .run(&analyzer, Batch::split(&fragments, 2), "", |batch, results| {
                assert_eq!(batch.len(), results.len());
                seen.push(batch.index);
            })
            .await;

        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
