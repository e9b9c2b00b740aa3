/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BackendEndpoints, Config};
use crate::workflow::{FlowKind, ResultView, Tone};

/// 初始化 tracing 日志
///
/// 优先使用 `RUST_LOG`，未设置时默认 `omr_lan_check=info`；
/// 重复调用是安全的（测试中会多次初始化）
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "omr_lan_check=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 程序配置
/// - `endpoints`: 推导出的后端地址
pub fn log_startup(config: &Config, endpoints: &BackendEndpoints) {
    info!("{}", "=".repeat(60));
    info!("🚀 OMR LAN Check 启动 - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
    info!("🌐 后端地址: {}", display_or_dash(&endpoints.base_url));
    info!("❤️ 健康检查: {}", display_or_dash(&endpoints.health_url));
    info!("📤 OMR 接口: {}", display_or_dash(&endpoints.submission_url));
    info!("🗂️ 元数据路径: {}", config.metadata_path);
    info!("{}", "=".repeat(60));
}

/// 输出一张结果卡片
///
/// # 参数
/// - `kind`: 流程种类
/// - `view`: 结果卡片
/// - `verbose`: 是否输出完整响应体
pub fn log_result_view(kind: FlowKind, view: &ResultView, verbose: bool) {
    info!("\n{}", "─".repeat(60));
    match view.tone {
        Tone::Success => info!("✅ [{}] {}", kind, view.title),
        Tone::Error => warn!("❌ [{}] {}", kind, view.title),
    }
    info!("{}", view.detail);

    if let Some(summary) = &view.quality_summary {
        info!("📊 汇总: {}", summary);
    }

    if let Some(payload) = &view.payload {
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        if verbose {
            info!("{}", pretty);
        } else {
            info!("{}", truncate_text(&pretty, 400));
        }
    }
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `succeeded`: 成功的流程数量
/// - `total`: 执行的流程数量
pub fn print_final_stats(succeeded: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 诊断完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", succeeded, total);
    info!("❌ 失败: {}", total - succeeded);
    info!("{}", "=".repeat(60));
}

fn display_or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
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
    fn test_truncate_text() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("答题卡识别", 2), "答题...");
    }

    #[test]
    fn test_display_or_dash() {
        assert_eq!(display_or_dash(""), "-");
        assert_eq!(display_or_dash("http://x"), "http://x");
    }

    #[test]
    fn test_init_twice_is_safe() {
        init();
        init();
    }
}
