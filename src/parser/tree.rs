//! 片段树：按文档顺序保存全部片段，并提供按键查找
//!
//! 解析完成后只读，可以在多个任务间共享而无需同步。

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::{Fragment, FragmentKind};

/// 片段统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FragmentStats {
    pub total_fragments: usize,
    pub chapters: usize,
    pub articles: usize,
    pub paragraphs: usize,
    pub subparagraphs: usize,
    pub article_numbers: Vec<String>,
}

/// 片段树
#[derive(Debug, Clone, Default)]
pub struct FragmentTree {
    fragments: Vec<Fragment>,
    /// "{kind}_{number}" → 下标；款为 "paragraph_{条}_{款}"
    index: HashMap<String, usize>,
}

impl FragmentTree {
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// 按索引键查找
    pub fn get(&self, key: &str) -> Option<&Fragment> {
        self.index.get(key).map(|&i| &self.fragments[i])
    }

    /// 按条编号查找
    pub fn article(&self, number: &str) -> Option<&Fragment> {
        self.get(&Fragment::checklist_id(number))
    }

    /// 所有条，文档顺序
    pub fn articles(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(|f| f.is_article())
    }

    pub fn count(&self, kind: FragmentKind) -> usize {
        self.fragments.iter().filter(|f| f.kind == kind).count()
    }

    pub fn stats(&self) -> FragmentStats {
        FragmentStats {
            total_fragments: self.fragments.len(),
            chapters: self.count(FragmentKind::Chapter),
            articles: self.count(FragmentKind::Article),
            paragraphs: self.count(FragmentKind::Paragraph),
            subparagraphs: self.count(FragmentKind::Subparagraph),
            article_numbers: self.articles().map(|a| a.number.clone()).collect(),
        }
    }

    /// 目录：每条一行，款缩进一级
    pub fn table_of_contents(&self) -> Vec<String> {
        self.fragments
            .iter()
            .filter_map(|f| match f.kind {
                FragmentKind::Article => Some(format!(
                    "Статья {}: {}",
                    f.number,
                    f.title.as_deref().unwrap_or("(без заголовка)")
                )),
                FragmentKind::Paragraph => Some(format!("  Пункт {}", f.number)),
                _ => None,
            })
            .collect()
    }

    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

/// 片段树构建器，只由扫描器使用
#[derive(Debug, Default)]
pub(crate) struct FragmentTreeBuilder {
    fragments: Vec<Fragment>,
    index: HashMap<String, usize>,
}

impl FragmentTreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 追加片段并登记索引键，返回片段下标；重复的键保留第一次出现
    pub(crate) fn push(&mut self, key: String, fragment: Fragment) -> usize {
        let position = self.fragments.len();
        if self.index.contains_key(&key) {
            debug!("索引键重复，保留首次出现: {}", key);
        } else {
            self.index.insert(key, position);
        }
        self.fragments.push(fragment);
        position
    }

    /// 条的正文在扫描到下一个章/条标记时才确定
    pub(crate) fn close_article(&mut self, position: usize, text: String, char_end: usize) {
        if let Some(article) = self.fragments.get_mut(position) {
            article.text = text;
            article.char_end = char_end;
        }
    }

    pub(crate) fn build(self) -> FragmentTree {
        FragmentTree {
            fragments: self.fragments,
            index: self.index,
        }
    }
}
