use serde::{Deserialize, Serialize};

use crate::models::fragment::Fragment;

/// 单个片段的分析结果
///
/// 由 `BatchAnalyzer` 为每个片段创建一次；挂到清单条目后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub fragment_number: String,
    pub fragment_path: String,
    pub agent_name: String,
    pub analysis_text: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 是否从分组分析的合并响应中拆出
    pub from_group_analysis: bool,
}

impl AnalysisResult {
    /// 成功结果
    pub fn success(
        fragment: &Fragment,
        agent_name: &str,
        analysis_text: impl Into<String>,
        from_group_analysis: bool,
    ) -> Self {
        Self {
            fragment_number: fragment.number.clone(),
            fragment_path: fragment.full_path.clone(),
            agent_name: agent_name.to_string(),
            analysis_text: analysis_text.into(),
            succeeded: true,
            error: None,
            from_group_analysis,
        }
    }

    /// 失败结果，分析文本为空
    pub fn failure(fragment: &Fragment, agent_name: &str, error: impl ToString) -> Self {
        Self {
            fragment_number: fragment.number.clone(),
            fragment_path: fragment.full_path.clone(),
            agent_name: agent_name.to_string(),
            analysis_text: String::new(),
            succeeded: false,
            error: Some(error.to_string()),
            from_group_analysis: false,
        }
    }
}
