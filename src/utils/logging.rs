/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志订阅器
///
/// 优先使用 `RUST_LOG`；未设置时默认 `info`，详细模式下为 `debug`。
/// 重复初始化（例如测试中）静默忽略。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `document`: 待审查文档路径
/// - `batch_size`: 每批片段数
/// - `concurrency`: 最大并发批次数
pub fn log_startup(document: &str, batch_size: usize, concurrency: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 法规文本完整性审查");
    info!("📄 文档: {}", document);
    info!("📊 每批片段数: {}，最大并发批次: {}", batch_size, concurrency);
    info!("{}", "=".repeat(60));
}

/// 记录审查阶段开始信息
pub fn log_stage_start(stage: &str, index: usize, total: usize, articles: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始第 {}/{} 阶段: {}", index, total, stage);
    info!("📋 待分析条数: {}", articles);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
///
/// # 参数
/// - `batch_num`: 批次编号（从 1 开始）
/// - `success`: 成功数量
/// - `total`: 批次片段数
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
}

/// 打印最终统计信息
///
/// # 参数
/// - `analyzed`: 已分析条数
/// - `total`: 条总数
/// - `is_complete`: 是否全部完成
/// - `report_path`: 报告文件路径
pub fn print_final_stats(analyzed: usize, total: usize, is_complete: bool, report_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 审查完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已分析: {}/{}", analyzed, total);
    if is_complete {
        info!("🎉 所有条均已分析");
    } else {
        info!("❌ 未分析: {}", total.saturating_sub(analyzed));
    }
    info!("{}", "=".repeat(60));
    info!("\n报告已保存至: {}", report_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_text("Статья", 3), "Ста...");
        assert_eq!(truncate_text("Статья", 6), "Статья");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
