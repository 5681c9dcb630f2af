use crate::config::Config;
use crate::workflow::JobSnapshot;
use anyhow::{Context, Result};
/// 日志工具模块
///
/// 提供日志初始化、运行日志文件和格式化输出的辅助函数
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 输出
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug 或 info。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n排班生成日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)
        .with_context(|| format!("无法创建日志文件: {}", log_file_path))?;
    Ok(())
}

/// 追加若干行到日志文件
pub fn append_lines(log_file_path: &str, lines: &[String]) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .with_context(|| format!("无法打开日志文件: {}", log_file_path))?;
    for line in lines {
        writeln!(file, "{}", line)?;
    }
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 监考排班客户端");
    info!("🌐 服务器: {}", config.scheduler_base_url);
    info!("📁 导出目录: {}", config.output_dir);
    if config.sequenced_settings_save {
        info!("💾 设置保存完成后再提交任务");
    }
    info!("{}", "=".repeat(60));
}

/// 打印任务结束时的统计信息
///
/// # 参数
/// - `snapshot`: 任务快照
/// - `log_file_path`: 日志文件路径
pub fn print_job_summary(snapshot: &JobSnapshot, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 排班任务结束");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("状态: {:?}", snapshot.status);
    info!("进度: {}%", snapshot.progress_percent);
    info!("服务器日志: {} 行", snapshot.log_lines.len());
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
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
