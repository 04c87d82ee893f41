//! 业务能力层（Services Layer）
//!
//! 职责：
//! - `analyzer` - 分析器接口（核心唯一依赖的外部能力）
//! - `openai_analyzer` - OpenAI 兼容接口的实现
//! - `prompts` - 审查阶段与提示词
//! - `protocol` - 分组请求 / 响应的横幅协议

pub mod analyzer;
pub mod openai_analyzer;
pub mod prompts;
pub mod protocol;

pub use analyzer::Analyzer;
pub use openai_analyzer::OpenAiAnalyzer;
pub use prompts::ExpertProfile;
pub use protocol::GroupResponse;
