//! 分组分析的横幅协议
//!
//! 请求中每个片段写成：
//!
//! ```text
//! ### FRAGMENT <i>: <number> (<full_path>)
//! <text>
//! ```
//!
//! 并要求分析器对每个片段按如下格式作答：
//!
//! ```text
//! === АНАЛИЗ ФРАГМЕНТА: <number> ===
//! <analysis>
//! === КОНЕЦ АНАЛИЗА ФРАГМЕНТА: <number> ===
//! ```
//!
//! 响应的语法：
//!
//! ```text
//! response := (noise | section)*
//! section  := START(n) body END(n)      // 两个横幅中的编号忽略大小写后完全相同
//! body     := 不含任何横幅的文本
//! ```
//!
//! 一个段落只延伸到下一个横幅为止，所以格式错误的片段不会吞掉相邻片段的内容。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::models::Fragment;

pub const START_LABEL: &str = "АНАЛИЗ ФРАГМЕНТА";
pub const END_LABEL: &str = "КОНЕЦ АНАЛИЗА ФРАГМЕНТА";

/// 开始或结束横幅；结束横幅放在前面，保证按最左优先匹配到完整标签
static BANNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)===\s*(КОНЕЦ\s+АНАЛИЗА\s+ФРАГМЕНТА|АНАЛИЗ\s+ФРАГМЕНТА)\s*:\s*([^=\r\n]+?)\s*===",
    )
    .expect("banner pattern must compile")
});

pub fn start_banner(number: &str) -> String {
    format!("=== {}: {} ===", START_LABEL, number)
}

pub fn end_banner(number: &str) -> String {
    format!("=== {}: {} ===", END_LABEL, number)
}

/// 把一批片段写成请求正文
pub fn render_request(fragments: &[Fragment]) -> String {
    fragments
        .iter()
        .enumerate()
        .map(|(i, f)| format!("### FRAGMENT {}: {} ({})\n{}", i + 1, f.number, f.full_path, f.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 要求分析器按横幅格式作答的说明
pub fn response_format_instructions(fragments: &[Fragment]) -> String {
    let numbers = fragments
        .iter()
        .map(|f| f.number.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let example = fragments
        .first()
        .map(|f| format!("{}\n<анализ>\n{}", start_banner(&f.number), end_banner(&f.number)))
        .unwrap_or_default();

    format!(
        "Проанализируй КАЖДЫЙ из {} фрагментов ({}) отдельно.\n\
Оформи анализ каждого фрагмента строго между двумя строками-маркерами, \
подставив номер фрагмента, например:\n{}\n\
Не пропускай ни одного фрагмента и не изменяй формат маркеров.",
        fragments.len(),
        numbers,
        example
    )
}

fn normalize(number: &str) -> String {
    number.trim().to_lowercase()
}

/// 解析后的分组响应
#[derive(Debug, Clone, Default)]
pub struct GroupResponse {
    sections: HashMap<String, String>,
}

impl GroupResponse {
    /// 解析分析器返回的合并文本；无法配对的横幅被丢弃
    pub fn parse(response: &str) -> Self {
        let mut sections = HashMap::new();
        let mut open: Option<(String, usize)> = None;

        for caps in BANNER.captures_iter(response) {
            let (Some(banner), Some(label), Some(number)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            let number = normalize(number.as_str());
            let is_end = label.as_str().to_lowercase().starts_with("конец");

            if !is_end {
                if let Some((unclosed, _)) = open.take() {
                    debug!("片段 {} 的横幅未闭合，丢弃", unclosed);
                }
                open = Some((number, banner.end()));
                continue;
            }

            match open.take() {
                Some((opened, body_start)) if opened == number => {
                    let body = response[body_start..banner.start()].trim();
                    if body.is_empty() {
                        debug!("片段 {} 的分析为空，丢弃", number);
                    } else {
                        sections.entry(number).or_insert_with(|| body.to_string());
                    }
                }
                Some((opened, _)) => {
                    debug!("横幅编号不匹配: 开始 {}，结束 {}", opened, number);
                }
                None => debug!("多余的结束横幅: {}", number),
            }
        }

        Self { sections }
    }

    /// 取出某个片段的分析文本
    pub fn section(&self, number: &str) -> Option<&str> {
        self.sections.get(&normalize(number)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
