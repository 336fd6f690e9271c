use crate::config::Config;
/// 日志工具模块
///
/// 提供进度和统计信息输出的辅助函数
use crate::orchestrator::BookReport;
use tracing::{debug, info};

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("📚 书籍提取器启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("📖 书籍: {} (ID: {})", config.book_name, config.book_id);
    info!("📊 最大并发数: {}", config.max_concurrent_pages);
    info!(
        "🔁 最大尝试次数: {}，退避间隔: {}ms",
        config.max_retries, config.retry_delay_ms
    );
    info!("{}", "=".repeat(60));
}

/// 记录单页完成进度
///
/// # 参数
/// - `completed`: 已完成页数
/// - `total`: 总页数
/// - `page_number`: 刚完成的页码（任务异常时为 None）
/// - `status`: 结果描述
pub fn log_progress(completed: u32, total: u32, page_number: Option<u32>, status: &str) {
    let percent = if total == 0 {
        100.0
    } else {
        f64::from(completed) * 100.0 / f64::from(total)
    };
    match page_number {
        Some(page) => info!(
            "⏳ [{}/{} {:.1}%] 第 {} 页: {}",
            completed, total, percent, page, status
        ),
        None => info!("⏳ [{}/{} {:.1}%] {}", completed, total, percent, status),
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `report`: 运行报告
pub fn print_final_stats(report: &BookReport) {
    let stats = &report.stats;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.extracted, stats.total_pages);
    info!("⚪ 空页: {}", stats.empty);
    info!("❌ 失败: {}", stats.failed);
    if stats.skipped > 0 {
        info!("⏭️ 未完成: {}", stats.skipped);
    }
    info!("⏱️ 耗时: {:.1}s", report.elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("\n书籍已保存至: {}", report.output_path.display());
    debug!("开头预览: {}", truncate_text(&report.preview, 80));
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
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate_text("صيد الخاطر", 3), "صيد...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
