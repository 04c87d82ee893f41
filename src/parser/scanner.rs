//! 结构解析器 - 逐行扫描的显式状态机
//!
//! ## 状态
//!
//! ```text
//! Start ──章──▶ InChapter ──条──▶ InArticle ──款──▶ InParagraph
//!   │                ▲  ▲            │  ▲               │  ▲
//!   └──────条────────┼──┼────────────┘  └──────条───────┘  └─项
//!                    └──┴──────────── 章（任意状态）
//! ```
//!
//! 每个非空行先按当前状态分类（章 → 条 → 款 → 项，先命中者生效），
//! 再由 `ScanState::next` 决定下一状态。款只在条内有效，项只在款内有效；
//! 其余行作为当前条的正文续行，不在条内时忽略。
//!
//! 条的正文从标题行开始，一直延续到下一个章或条标记；空行被丢弃，
//! 各行去除首尾空白后以 `\n` 连接。款和项只占一行，但同时也计入所在条的正文。
//! 条正文不在第一个款标记或空行处截断，款的内容随条一起进入分析请求。
//!
//! 解析从不失败：无法识别任何标记时得到空树。

use tracing::{debug, info};

use crate::models::{Fragment, FragmentKind};
use crate::parser::patterns::{self, MarkerMatch};
use crate::parser::tree::{FragmentTree, FragmentTreeBuilder};

/// 扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Start,
    InChapter,
    InArticle,
    InParagraph,
}

/// 行分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Blank,
    Chapter(MarkerMatch),
    Article(MarkerMatch),
    Paragraph(MarkerMatch),
    Subparagraph(MarkerMatch),
    /// 不是结构标记的普通文本
    Text,
}

impl ScanState {
    /// 在当前状态下对一行（已去除首尾空白）分类
    pub fn classify(self, line: &str) -> LineClass {
        if line.is_empty() {
            return LineClass::Blank;
        }
        if let Some(m) = patterns::match_chapter(line) {
            return LineClass::Chapter(m);
        }
        if let Some(m) = patterns::match_article(line) {
            return LineClass::Article(m);
        }
        if matches!(self, ScanState::InArticle | ScanState::InParagraph) {
            if let Some(m) = patterns::match_paragraph(line) {
                return LineClass::Paragraph(m);
            }
        }
        if self == ScanState::InParagraph {
            if let Some(m) = patterns::match_subparagraph(line) {
                return LineClass::Subparagraph(m);
            }
        }
        LineClass::Text
    }

    /// 状态转移表
    pub fn next(self, class: &LineClass) -> ScanState {
        match (self, class) {
            (_, LineClass::Chapter(_)) => ScanState::InChapter,
            (_, LineClass::Article(_)) => ScanState::InArticle,
            (ScanState::InArticle | ScanState::InParagraph, LineClass::Paragraph(_)) => {
                ScanState::InParagraph
            }
            (state, _) => state,
        }
    }
}

/// 一行及其在原文中的字节范围（去除首尾空白之后）
struct Line<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn split_lines(document: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in document.split('\n') {
        let leading = raw.len() - raw.trim_start().len();
        let text = raw.trim();
        let start = offset + leading;
        lines.push(Line {
            text,
            start,
            end: start + text.len(),
        });
        offset += raw.len() + 1;
    }
    lines
}

/// 正在收集正文的条
struct OpenArticle {
    position: usize,
    lines: Vec<String>,
    char_end: usize,
}

/// 扫描寄存器
struct Registers {
    chapter: Option<String>,
    article: Option<(String, String)>,
    paragraph: Option<(String, String)>,
    open_article: Option<OpenArticle>,
}

/// 结构解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralParser;

impl StructuralParser {
    pub fn new() -> Self {
        Self
    }

    /// 把原文解析为片段树
    pub fn parse(&self, document: &str) -> FragmentTree {
        info!("开始解析文档，长度: {} 字节", document.len());

        let mut builder = FragmentTreeBuilder::new();
        let mut state = ScanState::Start;
        let mut regs = Registers {
            chapter: None,
            article: None,
            paragraph: None,
            open_article: None,
        };

        for line in split_lines(document) {
            let class = state.classify(line.text);
            match &class {
                LineClass::Blank => {}
                LineClass::Chapter(m) => {
                    close_article(&mut builder, &mut regs);
                    regs.article = None;
                    regs.paragraph = None;
                    regs.chapter = Some(m.number.clone());

                    let fragment = Fragment {
                        kind: FragmentKind::Chapter,
                        number: m.number.clone(),
                        title: m.title.clone(),
                        text: line.text.to_string(),
                        full_path: format!("Глава {}", m.number),
                        parent_number: None,
                        char_start: line.start,
                        char_end: line.end,
                    };
                    builder.push(format!("chapter_{}", m.number), fragment);
                    debug!("识别到章: {}", m.number);
                }
                LineClass::Article(m) => {
                    close_article(&mut builder, &mut regs);
                    regs.paragraph = None;

                    let full_path = match &regs.chapter {
                        Some(chapter) => format!("Глава {} → Статья {}", chapter, m.number),
                        None => format!("Статья {}", m.number),
                    };
                    let fragment = Fragment {
                        kind: FragmentKind::Article,
                        number: m.number.clone(),
                        title: m.title.clone(),
                        text: line.text.to_string(),
                        full_path: full_path.clone(),
                        parent_number: regs.chapter.clone(),
                        char_start: line.start,
                        char_end: line.end,
                    };
                    let position = builder.push(Fragment::checklist_id(&m.number), fragment);
                    regs.open_article = Some(OpenArticle {
                        position,
                        lines: vec![line.text.to_string()],
                        char_end: line.end,
                    });
                    regs.article = Some((m.number.clone(), full_path));
                    debug!("识别到条: {}", m.number);
                }
                LineClass::Paragraph(m) => {
                    // 分类保证此时处于条内
                    if let Some((article_number, article_path)) = &regs.article {
                        let number = format!("{}.{}", article_number, m.number);
                        let full_path = format!("{} → Пункт {}", article_path, m.number);
                        let fragment = Fragment {
                            kind: FragmentKind::Paragraph,
                            number: number.clone(),
                            title: None,
                            text: line.text.to_string(),
                            full_path: full_path.clone(),
                            parent_number: Some(article_number.clone()),
                            char_start: line.start,
                            char_end: line.end,
                        };
                        builder.push(
                            format!("paragraph_{}_{}", article_number, m.number),
                            fragment,
                        );
                        regs.paragraph = Some((number, full_path));
                    }
                    append_body(&mut regs, &line);
                }
                LineClass::Subparagraph(m) => {
                    if let Some((paragraph_number, paragraph_path)) = &regs.paragraph {
                        let number = format!("{}.{}", paragraph_number, m.number);
                        let fragment = Fragment {
                            kind: FragmentKind::Subparagraph,
                            number: number.clone(),
                            title: None,
                            text: line.text.to_string(),
                            full_path: format!("{} → Подпункт {}", paragraph_path, m.number),
                            parent_number: Some(paragraph_number.clone()),
                            char_start: line.start,
                            char_end: line.end,
                        };
                        builder.push(format!("subparagraph_{}", number.replace('.', "_")), fragment);
                    }
                    append_body(&mut regs, &line);
                }
                LineClass::Text => append_body(&mut regs, &line),
            }
            state = state.next(&class);
        }
        close_article(&mut builder, &mut regs);

        let tree = builder.build();
        let stats = tree.stats();
        info!(
            "解析完成，片段总数: {} (章: {}, 条: {}, 款: {}, 项: {})",
            stats.total_fragments,
            stats.chapters,
            stats.articles,
            stats.paragraphs,
            stats.subparagraphs
        );
        tree
    }
}

/// 按文档顺序返回全部片段
pub fn parse(document: &str) -> Vec<Fragment> {
    StructuralParser::new().parse(document).into_fragments()
}

fn append_body(regs: &mut Registers, line: &Line<'_>) {
    if let Some(open) = regs.open_article.as_mut() {
        open.lines.push(line.text.to_string());
        open.char_end = line.end;
    }
}

fn close_article(builder: &mut FragmentTreeBuilder, regs: &mut Registers) {
    if let Some(open) = regs.open_article.take() {
        builder.close_article(open.position, open.lines.join("\n"), open.char_end);
    }
}
