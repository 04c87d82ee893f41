//! 结构标记的正则表
//!
//! 每类标记是一组按优先级排列的模式，第一个命中的模式生效。
//! 所有模式都锚定在（已去除首尾空白的）行首，并忽略大小写。

use once_cell::sync::Lazy;
use regex::Regex;

/// 一次命中的编号和标题
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerMatch {
    pub number: String,
    pub title: Option<String>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("structural pattern must compile"))
        .collect()
}

/// 章：普通写法、全大写写法、"Раздел" 同义词
pub static CHAPTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^Глава\s+(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
        r"^ГЛАВА\s+(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
        r"^Раздел\s+(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
    ])
});

/// 条：普通写法、全大写写法、缩写 "Ст."
pub static ARTICLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"^Статья\s+(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
        r"^СТАТЬЯ\s+(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
        r"^Ст\.\s*(\d+(?:-\d+)?)\s*\.?\s*(.*)$",
    ])
});

/// 款："1. 文本" 或 "1) 文本"
pub static PARAGRAPH_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"^(\d+)\s*\.\s+(.+)$", r"^(\d+)\s*\)\s+(.+)$"]));

/// 项："а) 文本"
pub static SUBPARAGRAPH_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"^([а-яё])\s*\)\s+(.+)$"]));

/// 按优先级依次尝试，返回第一个命中
pub fn match_first(patterns: &[Regex], line: &str) -> Option<MarkerMatch> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(line)?;
        let number = caps.get(1)?.as_str().to_string();
        let title = caps
            .get(2)
            .map(|m| m.as_str().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Some(MarkerMatch { number, title })
    })
}

pub fn match_chapter(line: &str) -> Option<MarkerMatch> {
    match_first(&CHAPTER_PATTERNS, line)
}

pub fn match_article(line: &str) -> Option<MarkerMatch> {
    match_first(&ARTICLE_PATTERNS, line)
}

pub fn match_paragraph(line: &str) -> Option<MarkerMatch> {
    match_first(&PARAGRAPH_PATTERNS, line)
}

pub fn match_subparagraph(line: &str) -> Option<MarkerMatch> {
    match_first(&SUBPARAGRAPH_PATTERNS, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_variants() {
        let m = match_chapter("Глава 3. Права граждан").unwrap();
        assert_eq!(m.number, "3");
        assert_eq!(m.title.as_deref(), Some("Права граждан"));

        assert_eq!(match_chapter("ГЛАВА 4").unwrap().number, "4");
        assert_eq!(match_chapter("Раздел 2 Общая часть").unwrap().number, "2");
        assert!(match_chapter("Главное управление").is_none());
    }

    #[test]
    fn test_article_variants() {
        let m = match_article("Статья 15. Сфера действия").unwrap();
        assert_eq!(m.number, "15");
        assert_eq!(m.title.as_deref(), Some("Сфера действия"));

        let m = match_article("статья 7-1").unwrap();
        assert_eq!(m.number, "7-1");
        assert_eq!(m.title, None);

        assert_eq!(match_article("Ст. 12 Ответственность").unwrap().number, "12");
        assert!(match_article("Статьями 5 и 6 установлено").is_none());
    }

    #[test]
    fn test_paragraph_and_subparagraph() {
        let m = match_paragraph("1. Настоящий Закон регулирует").unwrap();
        assert_eq!(m.number, "1");
        assert_eq!(match_paragraph("2) иные лица").unwrap().number, "2");
        assert!(match_paragraph("2020 году").is_none());

        assert_eq!(match_subparagraph("а) граждане").unwrap().number, "а");
        assert!(match_subparagraph("1) граждане").is_none());
    }
}
