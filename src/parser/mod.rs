//! 解析层（Parsing Layer）
//!
//! - `patterns` - 章 / 条 / 款 / 项的正则表（按优先级排列）
//! - `scanner` - 逐行扫描的状态机，生成有序片段
//! - `tree` - 片段树及其索引
//! - `numbering` - 条编号连续性检查（仅警告）

pub mod numbering;
pub mod patterns;
pub mod scanner;
pub mod tree;

pub use numbering::{check_sequence, NumberingWarning};
pub use scanner::{parse, LineClass, ScanState, StructuralParser};
pub use tree::{FragmentStats, FragmentTree};
