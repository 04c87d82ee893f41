//! 程序配置
//!
//! 加载顺序：默认值 → TOML 文件（可选）→ 环境变量。后者覆盖前者。

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::services::prompts::ExpertProfile;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每次分组调用包含的片段数
    pub batch_size: usize,
    /// 同时进行的批次数
    pub concurrency: usize,
    /// 单次分析器调用的期限（秒），0 表示不限
    pub call_timeout_secs: u64,
    /// 对遗漏条逐条补分析的轮数
    pub retry_rounds: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 审查报告输出路径
    pub report_path: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 审查阶段；为空时使用默认的单一阶段
    pub stages: Vec<ExpertProfile>,
    /// 按名称跳过的阶段
    pub skip_stages: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: 5,
            concurrency: 3,
            call_timeout_secs: 180,
            retry_rounds: 1,
            verbose_logging: false,
            report_path: "expertise_report.json".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4.1".to_string(),
            temperature: 0.1,
            max_tokens: 4000,
            stages: Vec::new(),
            skip_stages: Vec::new(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, value: String, expected_type: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::EnvVarParseFailed {
        var_name: name.to_string(),
        value,
        expected_type: expected_type.to_string(),
    })
}

impl Config {
    /// 从 TOML 文件读取，缺失的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })
    }

    /// 默认值叠加环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 完整加载：默认值 → TOML → 环境变量，最后校验
    pub fn load(toml_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match toml_path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("BATCH_SIZE") {
            self.batch_size = parse_var("BATCH_SIZE", v, "usize")?;
        }
        if let Some(v) = lookup("CONCURRENCY") {
            self.concurrency = parse_var("CONCURRENCY", v, "usize")?;
        }
        if let Some(v) = lookup("CALL_TIMEOUT_SECS") {
            self.call_timeout_secs = parse_var("CALL_TIMEOUT_SECS", v, "u64")?;
        }
        if let Some(v) = lookup("RETRY_ROUNDS") {
            self.retry_rounds = parse_var("RETRY_ROUNDS", v, "usize")?;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", v, "bool")?;
        }
        if let Some(v) = lookup("REPORT_PATH") {
            self.report_path = v;
        }
        if let Some(v) = lookup("LLM_API_KEY") {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        if let Some(v) = lookup("LLM_TEMPERATURE") {
            self.temperature = parse_var("LLM_TEMPERATURE", v, "f32")?;
        }
        if let Some(v) = lookup("LLM_MAX_TOKENS") {
            self.max_tokens = parse_var("LLM_MAX_TOKENS", v, "u32")?;
        }
        if let Some(v) = lookup("SKIP_STAGES") {
            self.skip_stages = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    /// 校验配置值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "batch_size".into(),
                reason: "必须大于 0".into(),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency".into(),
                reason: "必须大于 0".into(),
            });
        }
        if let Some(stage) = self.stages.iter().find(|s| s.name.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "stages".into(),
                reason: format!("阶段名称不能为空 (系统提示: {:.20})", stage.system_prompt),
            });
        }
        Ok(())
    }

    /// 单次调用期限，0 表示不限
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs))
    }

    /// 实际使用的审查阶段
    pub fn expert_stages(&self) -> Vec<ExpertProfile> {
        if self.stages.is_empty() {
            vec![ExpertProfile::default()]
        } else {
            self.stages.clone()
        }
    }
}
