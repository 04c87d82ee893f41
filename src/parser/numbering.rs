//! 条编号连续性检查
//!
//! 只产生警告，不参与完整性判定。编号按字符串登记，比较时取 "-" 之前的
//! 整数部分，因此 "7-1" 紧跟 "7" 之后视为连续。

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::models::Fragment;

/// 编号异常
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumberingWarning {
    /// 编号跳跃，例如 5 之后直接是 7
    Gap {
        previous: String,
        next: String,
        expected: u64,
    },
    /// 同一编号出现多次
    Duplicate { number: String },
    /// 编号倒退
    OutOfOrder { previous: String, next: String },
}

impl fmt::Display for NumberingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberingWarning::Gap {
                previous,
                next,
                expected,
            } => write!(
                f,
                "条编号不连续: {} 之后是 {} (应为 {})",
                previous, next, expected
            ),
            NumberingWarning::Duplicate { number } => write!(f, "条编号重复: {}", number),
            NumberingWarning::OutOfOrder { previous, next } => {
                write!(f, "条编号倒退: {} 之后是 {}", previous, next)
            }
        }
    }
}

fn base_number(number: &str) -> Option<u64> {
    number.split('-').next()?.trim().parse().ok()
}

/// 检查条编号序列
pub fn check_sequence<'a>(articles: impl IntoIterator<Item = &'a Fragment>) -> Vec<NumberingWarning> {
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();
    let mut previous: Option<(&str, u64)> = None;

    for article in articles {
        let number = article.number.as_str();
        if !seen.insert(number) {
            warnings.push(NumberingWarning::Duplicate {
                number: number.to_string(),
            });
            continue;
        }
        let Some(current) = base_number(number) else {
            continue;
        };

        if let Some((prev_number, prev)) = previous {
            // u64::MAX 之后没有可期望的编号，不做跳跃检查
            let expected = prev.checked_add(1);
            if let Some(expected) = expected.filter(|&e| current > e) {
                warnings.push(NumberingWarning::Gap {
                    previous: prev_number.to_string(),
                    next: number.to_string(),
                    expected,
                });
            } else if current < prev {
                warnings.push(NumberingWarning::OutOfOrder {
                    previous: prev_number.to_string(),
                    next: number.to_string(),
                });
            }
        }
        previous = Some((number, current));
    }

    warnings
}
