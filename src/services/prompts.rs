//! 审查阶段的提示词
//!
//! 一个 `ExpertProfile` 描述一个审查阶段：名称、系统提示和附加要求。
//! 提示词文本使用俄语，与被审查的法规文本保持同一语言。

use serde::{Deserialize, Serialize};

use crate::models::Fragment;
use crate::services::protocol;

/// 审查阶段配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertProfile {
    /// 阶段名称，同时作为结果中的 `agent_name`
    pub name: String,
    pub system_prompt: String,
    /// 追加到每个分析请求末尾的要求
    #[serde(default)]
    pub instructions: String,
}

impl Default for ExpertProfile {
    fn default() -> Self {
        Self {
            name: "Юридико-техническая экспертиза".to_string(),
            system_prompt: "Ты опытный юрист-эксперт, проводящий экспертизу проектов \
нормативных правовых актов. Анализируй текст строго по существу, указывай на \
противоречия, пробелы, неясные формулировки и нарушения юридической техники. \
Ссылайся на конкретные пункты анализируемой статьи."
                .to_string(),
            instructions: String::new(),
        }
    }
}

impl ExpertProfile {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: system_prompt.into(),
            instructions: String::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    fn append_instructions(&self, prompt: &mut String) {
        if !self.instructions.trim().is_empty() {
            prompt.push_str("\n\nДополнительные требования:\n");
            prompt.push_str(self.instructions.trim());
        }
    }

    /// 单个片段的分析请求
    pub fn fragment_prompt(&self, fragment: &Fragment, checklist: &str) -> String {
        let mut prompt = format!(
            "{}\n\n\
Проанализируй следующий фрагмент документа.\n\
Расположение: {}\n\n\
{}",
            checklist, fragment.full_path, fragment.text
        );
        self.append_instructions(&mut prompt);
        prompt
    }

    /// 一组片段的合并分析请求
    pub fn group_prompt(&self, fragments: &[Fragment], checklist: &str) -> String {
        let mut prompt = format!(
            "{}\n\n{}\n\n{}",
            checklist,
            protocol::response_format_instructions(fragments),
            protocol::render_request(fragments)
        );
        self.append_instructions(&mut prompt);
        prompt
    }
}
