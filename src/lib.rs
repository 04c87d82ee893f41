//! # Statute Review
//!
//! 法规文本（НПА）完整性审查：保证每一条都被送去分析，并在最终报告中有据可查。
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 解析层（Parser）
//! - `parser/` - 逐行状态机，把原始文本切成有序片段（章 → 条 → 款 → 项）
//! - `FragmentTree` - 片段及其索引，解析后只读
//!
//! ### ② 账本（Ledger）
//! - `ledger/` - 完整性清单，"每条是否已分析"的唯一事实来源
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Analyzer` - 文本生成能力（LLM）
//! - `protocol` - 分组请求 / 响应的横幅协议
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/` - 定义"一批条"的完整分析流程（分组 → 拆分 → 兜底）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/scheduler` - 并行调度批次并合并进账本
//! - `orchestrator/pipeline` - 多阶段审查与补分析
//! - `orchestrator/app` - 读取文档、写出报告
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod parser;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AnalyzerError, AppError, AppResult, ConfigError};
pub use ledger::CompletenessLedger;
pub use models::{AnalysisResult, Batch, CompletionReport, Fragment, FragmentKind};
pub use orchestrator::{App, ExpertisePipeline, ExpertiseReport, ParallelScheduler, PipelineOptions};
pub use parser::{FragmentTree, StructuralParser};
pub use services::{Analyzer, ExpertProfile, OpenAiAnalyzer};
pub use workflow::BatchAnalyzer;
