//! 日志工具模块
//!
//! 初始化 tracing 订阅器并提供日志格式化辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::CycleStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式为 `debug`。
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
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 BFJ → MIX 同步启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📊 混铁站: {:?}", config.mix_stations);
    info!("⏱ 轮询间隔: {} 秒", config.poll_interval_secs);
    info!(
        "🔐 授权重试: 最多 {} 次, 间隔 {} 秒",
        config.auth_retry.max_attempts, config.auth_retry.delay_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录单轮统计
pub fn log_cycle_stats(stats: &CycleStats) {
    info!("{}", "─".repeat(60));
    info!(
        "✓ 本轮完成 ({}): 高炉 {} 座, 转发出铁 {} 次, 跳过 {} 次",
        chrono::Local::now().format("%H:%M:%S"),
        stats.furnaces,
        stats.tappings_relayed,
        stats.tappings_skipped
    );
    info!(
        "化验记录 {}/{}, 铁水罐移动 {}/{}",
        stats.chemicals.sent,
        stats.chemicals.total(),
        stats.movements.sent,
        stats.movements.total()
    );
    info!("{}", "─".repeat(60));
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
