use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 分析器调用错误
    #[error("分析器错误: {0}")]
    Analyzer(#[from] AnalyzerError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件读写错误
    #[error("文件错误 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 报告序列化错误
    #[error("报告序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 分析器（LLM）调用错误
///
/// 核心层只关心"调用失败了"，具体原因仅用于日志和结果中的 `error` 字段。
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// API 调用失败（网络、鉴权、限流等）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    Request {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 超过调用期限
    #[error("LLM调用超时 ({limit:?})")]
    Timeout { limit: Duration },
    /// 其他实现方报告的错误
    #[error("分析器错误: {message}")]
    Provider { message: String },
}

impl AnalyzerError {
    /// 创建通用的分析器错误
    pub fn provider(message: impl Into<String>) -> Self {
        AnalyzerError::Provider {
            message: message.into(),
        }
    }

    /// 创建API请求失败错误
    pub fn request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AnalyzerError::Request {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置值不合法
    #[error("配置项 {field} 不合法: {reason}")]
    Invalid { field: String, reason: String },
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
