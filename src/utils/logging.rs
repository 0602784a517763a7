/// 日志工具模块
///
/// 提供日志初始化和格式化输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// 默认级别 info，可通过 `RUST_LOG` 覆盖；重复初始化时静默忽略
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 打印分隔线包围的标题
pub fn log_banner(title: &str) {
    info!("{}", "=".repeat(60));
    info!("{}", title);
    info!("{}", "=".repeat(60));
}

/// 打印计数分布（最多 `limit` 项）
///
/// # 参数
/// - `title`: 标题
/// - `entries`: (名称, 数量) 列表，调用方负责排序
/// - `limit`: 最多显示的项数
pub fn log_distribution(title: &str, entries: &[(String, usize)], limit: usize) {
    info!("\n{}:", title);
    for (name, count) in entries.iter().take(limit) {
        info!("  {}: {}", name, count);
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
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
