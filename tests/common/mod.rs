//! 集成测试共用的分析器桩
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};

use statute_review::services::protocol::{end_banner, start_banner};
use statute_review::{Analyzer, AnalyzerError, Fragment, FragmentKind};

static REQUEST_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^### FRAGMENT \d+: (\S+) \(").unwrap());

pub fn is_group_prompt(prompt: &str) -> bool {
    REQUEST_BLOCK.is_match(prompt)
}

/// 分组请求中的条编号，按出现顺序
pub fn requested_numbers(prompt: &str) -> Vec<String> {
    REQUEST_BLOCK
        .captures_iter(prompt)
        .map(|c| c[1].to_string())
        .collect()
}

/// 按协议正确作答：分组请求回复带横幅的段落，单条请求回复一段文本
#[derive(Default)]
pub struct EchoAnalyzer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Analyzer for EchoAnalyzer {
    fn model_name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, prompt: &str, _system_message: &str) -> Result<String, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !is_group_prompt(prompt) {
            return Ok("анализ одной статьи".to_string());
        }
        Ok(requested_numbers(prompt)
            .iter()
            .map(|n| format!("{}\nанализ статьи {}\n{}", start_banner(n), n, end_banner(n)))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

/// 分组请求一律失败，单条请求成功
#[derive(Default)]
pub struct GroupFailingAnalyzer {
    pub group_calls: AtomicUsize,
    pub single_calls: AtomicUsize,
}

#[async_trait]
impl Analyzer for GroupFailingAnalyzer {
    fn model_name(&self) -> &str {
        "group-failing"
    }

    async fn generate(&self, prompt: &str, _system_message: &str) -> Result<String, AnalyzerError> {
        if is_group_prompt(prompt) {
            self.group_calls.fetch_add(1, Ordering::SeqCst);
            return Err(AnalyzerError::provider("503 Service Unavailable"));
        }
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok("анализ одной статьи".to_string())
    }
}

/// 以概率 `failure_rate` 失败，成功时按协议作答
pub struct RandomFailingAnalyzer {
    pub failure_rate: f64,
    echo: EchoAnalyzer,
}

impl RandomFailingAnalyzer {
    pub fn new(failure_rate: f64) -> Self {
        Self {
            failure_rate,
            echo: EchoAnalyzer::default(),
        }
    }
}

#[async_trait]
impl Analyzer for RandomFailingAnalyzer {
    fn model_name(&self) -> &str {
        "random-failing"
    }

    async fn generate(&self, prompt: &str, system_message: &str) -> Result<String, AnalyzerError> {
        let (fail, pause) = {
            let mut rng = rand::thread_rng();
            (rng.gen_bool(self.failure_rate), rng.gen_range(0..3u64))
        };
        tokio::time::sleep(std::time::Duration::from_millis(pause)).await;
        if fail {
            return Err(AnalyzerError::provider("случайный сбой"));
        }
        self.echo.generate(prompt, system_message).await
    }
}

/// 请求中出现 `trigger` 时崩溃
pub struct PanickingAnalyzer {
    pub trigger: &'static str,
}

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    fn model_name(&self) -> &str {
        "panicking"
    }

    async fn generate(&self, prompt: &str, system_message: &str) -> Result<String, AnalyzerError> {
        if prompt.contains(self.trigger) {
            panic!("анализатор упал");
        }
        EchoAnalyzer::default().generate(prompt, system_message).await
    }
}

/// 总是返回同一段文本
pub struct CannedAnalyzer {
    pub response: String,
}

#[async_trait]
impl Analyzer for CannedAnalyzer {
    fn model_name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str, _system_message: &str) -> Result<String, AnalyzerError> {
        Ok(self.response.clone())
    }
}

/// `count` 条合成的条片段，编号 1..=count
pub fn synthetic_articles(count: usize) -> Vec<Fragment> {
    (1..=count)
        .map(|n| Fragment {
            kind: FragmentKind::Article,
            number: n.to_string(),
            title: None,
            text: format!("Статья {}\nсодержание статьи {}", n, n),
            full_path: format!("Глава 1 → Статья {}", n),
            parent_number: Some("1".to_string()),
            char_start: 0,
            char_end: 0,
        })
        .collect()
}
