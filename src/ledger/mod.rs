//! 完整性账本（Completeness Ledger）
//!
//! "每一条是否都被分析过"的唯一事实来源。其它组件不能自行宣称完整。
//!
//! - 构造时为每个条片段建立一个清单条目，初始全部未分析
//! - `mark_analyzed` 只会把条目从未分析变为已分析，不会回退
//! - 对不存在的条编号只记录警告，不报错
//! - 空清单的完成率为 1.0（空真）

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::models::report::{RECOMMENDATION_COMPLETE, RECOMMENDATION_INCOMPLETE};
use crate::models::{
    AnalysisResult, ChecklistEntry, CompletionReport, Fragment, MissingArticle,
};

/// 完整性账本
#[derive(Debug, Clone, Default)]
pub struct CompletenessLedger {
    /// 文档顺序
    entries: Vec<ChecklistEntry>,
    /// fragment_id → 下标
    index: HashMap<String, usize>,
}

impl CompletenessLedger {
    /// 为所有条片段建立清单；重复编号只登记第一次出现
    pub fn new<'a>(fragments: impl IntoIterator<Item = &'a Fragment>) -> Self {
        let mut ledger = Self::default();
        for fragment in fragments.into_iter().filter(|f| f.is_article()) {
            let entry = ChecklistEntry::new(fragment.clone());
            if ledger.index.contains_key(&entry.fragment_id) {
                warn!("⚠️ 条编号重复，清单中只保留第一次出现: {}", fragment.number);
                continue;
            }
            ledger
                .index
                .insert(entry.fragment_id.clone(), ledger.entries.len());
            ledger.entries.push(entry);
        }
        debug!("完整性清单已建立，条目数: {}", ledger.entries.len());
        ledger
    }

    /// 把条标记为已分析并挂上结果
    ///
    /// 返回是否发生了状态变化。未知编号记录警告后忽略；已分析的条保留第一次的结果。
    pub fn mark_analyzed(&mut self, article_number: &str, result: AnalysisResult) -> bool {
        let fragment_id = Fragment::checklist_id(article_number);
        let Some(&position) = self.index.get(&fragment_id) else {
            warn!("⚠️ 尝试标记不存在的条: {}", article_number);
            return false;
        };

        let entry = &mut self.entries[position];
        if entry.analyzed {
            debug!("条 {} 已标记过，忽略重复结果", article_number);
            return false;
        }
        entry.analyzed = true;
        entry.result = Some(result);
        debug!("条 {} 已标记为已分析", article_number);
        true
    }

    /// 合并一个结果：只有成功的结果才会标记账本
    pub fn record(&mut self, result: &AnalysisResult) -> bool {
        if !result.succeeded {
            debug!(
                "条 {} 分析失败，保持未分析状态: {}",
                result.fragment_number,
                result.error.as_deref().unwrap_or("未知错误")
            );
            return false;
        }
        self.mark_analyzed(&result.fragment_number, result.clone())
    }

    pub fn is_analyzed(&self, article_number: &str) -> bool {
        self.index
            .get(&Fragment::checklist_id(article_number))
            .map(|&i| self.entries[i].analyzed)
            .unwrap_or(false)
    }

    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    pub fn analyzed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.analyzed).count()
    }

    /// 尚未分析的条，文档顺序
    pub fn missing(&self) -> Vec<&Fragment> {
        self.entries
            .iter()
            .filter(|e| !e.analyzed)
            .map(|e| &e.fragment)
            .collect()
    }

    /// 完成率，空清单为 1.0
    pub fn completion_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 1.0;
        }
        self.analyzed_count() as f64 / self.entries.len() as f64
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(|e| e.analyzed)
    }

    /// 已挂到清单上的分析结果，文档顺序
    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter().filter_map(|e| e.result.as_ref())
    }

    /// 渲染给分析器看的控制清单
    ///
    /// 格式是与分析器之间的提示词约定，更换模型供应商时保持不变：
    /// 按章分组，每条一行 `✅|⬜ Статья N[: 标题]`，末尾三行汇总。
    pub fn render_checklist(&self) -> String {
        let mut lines = vec![
            "=== ОГЛАВЛЕНИЕ-ЧЕКЛИСТ ДЛЯ КОНТРОЛЯ ПОЛНОТЫ АНАЛИЗА ===".to_string(),
            String::new(),
        ];

        let mut current_chapter: Option<&str> = None;
        for entry in &self.entries {
            let article = &entry.fragment;
            if let Some(chapter) = article.parent_number.as_deref() {
                if current_chapter != Some(chapter) {
                    current_chapter = Some(chapter);
                    lines.push(format!("Глава {}:", chapter));
                }
            }

            let status = if entry.analyzed { "✅" } else { "⬜" };
            let title = article
                .title
                .as_deref()
                .map(|t| format!(": {}", t))
                .unwrap_or_default();
            lines.push(format!("  {} Статья {}{}", status, article.number, title));
        }

        lines.push(String::new());
        lines.push(format!("Всего статей: {}", self.total_count()));
        lines.push(format!("Проанализировано: {}", self.analyzed_count()));
        lines.push(format!(
            "Процент завершения: {:.1}%",
            self.completion_rate() * 100.0
        ));

        lines.join("\n")
    }

    /// 完整性报告
    pub fn report(&self) -> CompletionReport {
        let missing = self.missing();
        let completion_rate = self.completion_rate();
        let is_complete = missing.is_empty();

        CompletionReport {
            total_articles: self.total_count(),
            analyzed_articles: self.analyzed_count(),
            missing_article_numbers: missing.iter().map(|a| a.number.clone()).collect(),
            missing_articles: missing.iter().map(|&a| MissingArticle::from(a)).collect(),
            completion_rate,
            completion_percentage: format!("{:.1}%", completion_rate * 100.0),
            is_complete,
            recommendation: if is_complete {
                RECOMMENDATION_COMPLETE.to_string()
            } else {
                RECOMMENDATION_INCOMPLETE.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::StructuralParser;

    const DOC: &str = "Глава 1. Общие положения\n\
Статья 1. Понятия\n\
текст\n\
Статья 2\n\
текст\n\
Глава 2\n\
Статья 3. Ответственность\n";

    fn ledger() -> CompletenessLedger {
        let tree = StructuralParser::new().parse(DOC);
        CompletenessLedger::new(tree.fragments())
    }

    fn ok(ledger: &CompletenessLedger, number: &str) -> AnalysisResult {
        let fragment = ledger
            .entries()
            .iter()
            .find(|e| e.fragment.number == number)
            .map(|e| e.fragment.clone())
            .unwrap();
        AnalysisResult::success(&fragment, "test", format!("анализ {}", number), false)
    }

    #[test]
    fn test_new_ledger_tracks_only_articles() {
        let ledger = ledger();
        assert_eq!(ledger.total_count(), 3);
        assert_eq!(ledger.analyzed_count(), 0);
        assert_eq!(ledger.missing().len(), 3);
        assert_eq!(ledger.completion_rate(), 0.0);
        assert!(!ledger.is_complete());
    }

    #[test]
    fn test_mark_analyzed_is_monotone() {
        let mut ledger = ledger();
        let first = ok(&ledger, "2");

        assert!(ledger.mark_analyzed("2", first.clone()));
        let mut second = first.clone();
        second.analysis_text = "другой".into();
        assert!(!ledger.mark_analyzed("2", second));

        assert!(ledger.is_analyzed("2"));
        assert_eq!(ledger.results().next().unwrap().analysis_text, first.analysis_text);
        assert_eq!(ledger.missing().iter().map(|f| f.number.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn test_unknown_article_is_noop() {
        let mut ledger = ledger();
        let result = ok(&ledger, "1");
        assert!(!ledger.mark_analyzed("99", result));
        assert_eq!(ledger.analyzed_count(), 0);
    }

    #[test]
    fn test_failed_result_does_not_mark() {
        let mut ledger = ledger();
        let fragment = ledger.entries()[0].fragment.clone();
        let failed = AnalysisResult::failure(&fragment, "test", "timeout");
        assert!(!ledger.record(&failed));
        assert!(!ledger.is_analyzed("1"));
    }

    #[test]
    fn test_empty_ledger_is_vacuously_complete() {
        let ledger = CompletenessLedger::new(&Vec::<Fragment>::new());
        assert_eq!(ledger.completion_rate(), 1.0);
        let report = ledger.report();
        assert!(report.is_complete);
        assert_eq!(report.total_articles, 0);
        assert_eq!(report.completion_percentage, "100.0%");
    }

    #[test]
    fn test_render_checklist_groups_by_chapter() {
        let mut ledger = ledger();
        let result = ok(&ledger, "1");
        ledger.mark_analyzed("1", result);

        let expected = "=== ОГЛАВЛЕНИЕ-ЧЕКЛИСТ ДЛЯ КОНТРОЛЯ ПОЛНОТЫ АНАЛИЗА ===\n\
\n\
Глава 1:\n  ✅ Статья 1: Понятия\n  ⬜ Статья 2\n\
Глава 2:\n  ⬜ Статья 3: Ответственность\n\
\n\
Всего статей: 3\n\
Проанализировано: 1\n\
Процент завершения: 33.3%";
        assert_eq!(ledger.render_checklist(), expected);
    }

    #[test]
    fn test_report_lists_missing_in_document_order() {
        let mut ledger = ledger();
        let result = ok(&ledger, "2");
        ledger.mark_analyzed("2", result);

        let report = ledger.report();
        assert_eq!(report.analyzed_articles, 1);
        assert_eq!(report.missing_article_numbers, vec!["1", "3"]);
        assert_eq!(report.missing_articles[1].full_path, "Глава 2 → Статья 3");
        assert!(!report.is_complete);
        assert_eq!(report.recommendation, RECOMMENDATION_INCOMPLETE);
    }
}
