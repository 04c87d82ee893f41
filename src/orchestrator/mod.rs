//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和整次审查的流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 读取文档、写出报告、输出全局统计
//!
//! ### `pipeline` - 审查流水线
//! - 解析文档，为每个审查阶段建立完整性账本
//! - 对遗漏的条补分析
//! - 汇总 `ExpertiseReport`
//!
//! ### `scheduler` - 并行调度器
//! - 控制并发批次数（Semaphore）
//! - 隔离崩溃的批次
//! - 逐批把结果合并进账本
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! pipeline (处理全部阶段)
//!     ↓
//! scheduler (处理 Vec<Batch>)
//!     ↓
//! workflow::BatchAnalyzer (处理单个 Batch)
//!     ↓
//! services (能力层：analyzer / prompts / protocol)
//! ```

pub mod app;
pub mod pipeline;
pub mod scheduler;

// 重新导出主要类型
pub use app::App;
pub use pipeline::{ExpertisePipeline, ExpertiseReport, PipelineOptions, StageReport};
pub use scheduler::ParallelScheduler;
