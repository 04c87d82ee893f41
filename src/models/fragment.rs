use serde::{Deserialize, Serialize};
use std::fmt;

/// 结构单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    /// 章（Глава / Раздел）
    Chapter,
    /// 条（Статья）
    Article,
    /// 款（Пункт）
    Paragraph,
    /// 项（Подпункт）
    Subparagraph,
}

impl FragmentKind {
    /// 索引键前缀
    pub fn key_prefix(self) -> &'static str {
        match self {
            FragmentKind::Chapter => "chapter",
            FragmentKind::Article => "article",
            FragmentKind::Paragraph => "paragraph",
            FragmentKind::Subparagraph => "subparagraph",
        }
    }

    /// 文档语言中的名称，用于路径和提示词
    pub fn label(self) -> &'static str {
        match self {
            FragmentKind::Chapter => "Глава",
            FragmentKind::Article => "Статья",
            FragmentKind::Paragraph => "Пункт",
            FragmentKind::Subparagraph => "Подпункт",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_prefix())
    }
}

/// 文档片段
///
/// 由解析器按文档顺序生成，生成后不再修改。`parent_number` 只是对上级
/// 单元编号的弱引用，所有片段都归 `FragmentTree` 所有。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    /// 编号，只在同类同级范围内唯一（条的编号在全文范围内唯一）
    pub number: String,
    pub title: Option<String>,
    /// 片段自身文本，条包含完整的多行正文
    pub text: String,
    /// 面包屑路径，例如 "Глава 3 → Статья 15"
    pub full_path: String,
    pub parent_number: Option<String>,
    /// 在原文中的字节偏移 [char_start, char_end)
    pub char_start: usize,
    pub char_end: usize,
}

impl Fragment {
    /// 清单条目 ID，只对条有意义
    pub fn checklist_id(number: &str) -> String {
        format!("article_{}", number)
    }

    pub fn is_article(&self) -> bool {
        self.kind == FragmentKind::Article
    }

    /// 正文预览（按字符截断）
    pub fn preview(&self, max_chars: usize) -> String {
        crate::utils::logging::truncate_text(&self.text, max_chars)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.kind, self.full_path)
    }
}
