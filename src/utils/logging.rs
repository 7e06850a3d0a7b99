/// 日志工具模块
///
/// 提供日志初始化与格式化输出的辅助函数
use crate::config::Config;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// 优先使用 `RUST_LOG`；否则 `verbose` 时为 debug，默认 info。
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("warn,obs_schedule_scrape={}", level))
    });

    // 测试中可能被多次调用
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 课程表抓取开始 - {}", now());
    info!("🌐 页面: {}", config.site_url);
    info!("📊 工作者数量: {}", config.worker_count);
    if !config.excluded_codes.is_empty() {
        info!("🚫 排除课程代码: {}", config.excluded_codes.join(", "));
    }
    info!("{}", "=".repeat(60));
}

/// 记录课程代码发现结果
pub fn log_codes_discovered(total: usize) {
    info!("✓ 找到 {} 个课程代码，开始抓取 - {}", total, now());
}

/// 记录分块情况
pub fn log_partition<T>(chunks: &[Vec<T>]) {
    let sizes: Vec<String> = chunks.iter().map(|c| c.len().to_string()).collect();
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 并行抓取开始: {} 个工作者, 每个工作者 {} 个课程代码",
        chunks.len(),
        sizes.join(", ")
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个工作者完成
pub fn log_worker_complete(worker_index: usize, records: usize, collected: usize) {
    info!(
        "[worker-{}] ✓ 完成, 新增 {} 条记录 (当前累计: {})",
        worker_index, records, collected
    );
}

/// 打印最终统计信息
pub fn print_final_stats(records: usize, workers_ok: usize, workers_failed: usize, output: Option<&str>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 抓取完成统计");
    info!("完成时间: {}", now());
    info!("{}", "=".repeat(60));
    info!("✅ 工作者成功: {}", workers_ok);
    info!("❌ 工作者失败: {}", workers_failed);
    info!("📄 记录总数: {}", records);
    match output {
        Some(path) => info!("\n结果已保存至: {}", path),
        None => warn!("!!! 没有抓取到任何数据"),
    }
    info!("{}", "=".repeat(60));
}
