use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::{info, warn};

use crate::models::{BatchResult, BatchSummary, Progress};

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n文章批量生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(provider: &str, default_concurrency: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文章生成模式");
    info!("🤖 内容服务: {}", provider);
    info!("📊 默认并发数: {}", default_concurrency);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 题目总数
/// - `concurrency`: 实际并发数
/// - `serial`: 是否为串行策略
pub fn log_batch_start(total: usize, concurrency: usize, serial: bool) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理批次，共 {} 个题目", total);
    if serial {
        info!("🐢 当前服务与功能组合容易触发限流，改为串行处理");
    } else {
        info!("📋 并发数: {}", concurrency);
    }
    info!("{}", "=".repeat(60));
}

/// 记录进度
pub fn log_progress(progress: &Progress) {
    info!(
        "⏳ 进度: {}/{} (失败 {}, 进行中 {})",
        progress.completed, progress.total, progress.failed, progress.active
    );
}

/// 记录单个题目的结果
pub fn log_result(result: &BatchResult) {
    if result.is_completed() {
        info!(
            "[题目 {}] ✓ 生成完成: {} ({} 字符, 关键词 {}, 内链 {})",
            result.topic_index + 1,
            truncate_text(&result.topic, 40),
            result.content.chars().count(),
            result.strategy.keyword_count,
            result.strategy.link_count
        );
    } else {
        warn!(
            "[题目 {}] ❌ 生成失败: {} ({})",
            result.topic_index + 1,
            truncate_text(&result.topic, 40),
            truncate_text(&result.content, 120)
        );
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 批次汇总
/// - `output_file`: 结果文件路径
pub fn print_final_stats(summary: &BatchSummary, output_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("耗时: {:.1} 秒", summary.elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded(), summary.total);
    info!("❌ 失败: {}", summary.failed);
    if summary.cancelled {
        info!("🛑 已取消，放弃 {} 个题目", summary.abandoned);
    }
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
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
    use super::truncate_text;

    #[test]
    fn truncates_by_chars_not_bytes() {
        assert_eq!(truncate_text("批量生成文章", 2), "批量...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
