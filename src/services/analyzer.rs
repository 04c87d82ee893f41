//! 分析器能力 - 业务能力层
//!
//! 核心只依赖这一个接口：给定提示词和系统消息，返回一段文本。
//! 具体是哪家模型、如何路由都由实现方决定。

use async_trait::async_trait;

use crate::error::AnalyzerError;

/// 文本生成能力（通常是一个 LLM 客户端）
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// 模型或实现名称，只用于日志
    fn model_name(&self) -> &str;

    /// 生成分析文本
    async fn generate(&self, prompt: &str, system_message: &str) -> Result<String, AnalyzerError>;
}
