use serde::{Deserialize, Serialize};

use crate::models::analysis::AnalysisResult;
use crate::models::fragment::Fragment;

/// 分析不完整时的建议
pub const RECOMMENDATION_INCOMPLETE: &str = "КРИТИЧЕСКОЕ ПРЕДУПРЕЖДЕНИЕ: Анализ не завершён! \
Необходимо повторно проанализировать пропущенные статьи для обеспечения полноты экспертизы.";

/// 分析完整时的建议
pub const RECOMMENDATION_COMPLETE: &str = "Анализ выполнен полностью. Все статьи НПА обработаны.";

/// 完整性清单条目
///
/// 每条一个，`analyzed` 在一次运行内只会从 false 变为 true 一次。
#[derive(Debug, Clone)]
pub struct ChecklistEntry {
    /// "article_" + 条编号
    pub fragment_id: String,
    pub fragment: Fragment,
    pub analyzed: bool,
    pub result: Option<AnalysisResult>,
}

impl ChecklistEntry {
    pub fn new(fragment: Fragment) -> Self {
        Self {
            fragment_id: Fragment::checklist_id(&fragment.number),
            fragment,
            analyzed: false,
            result: None,
        }
    }
}

/// 缺失条的明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingArticle {
    pub number: String,
    pub title: Option<String>,
    pub full_path: String,
    pub text_preview: String,
}

impl From<&Fragment> for MissingArticle {
    fn from(fragment: &Fragment) -> Self {
        Self {
            number: fragment.number.clone(),
            title: fragment.title.clone(),
            full_path: fragment.full_path.clone(),
            text_preview: fragment.preview(100),
        }
    }
}

/// 完整性报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    pub total_articles: usize,
    pub analyzed_articles: usize,
    pub missing_article_numbers: Vec<String>,
    pub missing_articles: Vec<MissingArticle>,
    /// [0, 1]，空清单为 1.0
    pub completion_rate: f64,
    pub completion_percentage: String,
    pub is_complete: bool,
    pub recommendation: String,
}

impl CompletionReport {
    pub fn missing_count(&self) -> usize {
        self.missing_article_numbers.len()
    }
}
