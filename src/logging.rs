// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别, 支持 JSON 输出
// 行内数据（客户名、电话）只在 debug 及以下级别出现
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 人类可读
    #[default]
    Pretty,
    /// 每行一个 JSON 对象
    Json,
}

/// 日志选项（命令行层）
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// 显式级别/过滤器（覆盖 RUST_LOG）, 例如 "debug" 或 "recobro_facturas=trace"
    pub level: Option<String>,
    pub format: LogFormat,
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=recobro_facturas=trace
///
/// # 错误
/// 全局订阅者已设置时返回错误
///
/// # 示例
/// ```no_run
/// use recobro_facturas::logging;
/// logging::init()?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init() -> anyhow::Result<()> {
    init_with(&LogOptions::default())
}

/// 按选项初始化日志系统
///
/// 级别优先级: options.level > RUST_LOG > info
pub fn init_with(options: &LogOptions) -> anyhow::Result<()> {
    let filter = match &options.level {
        Some(level) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("无效的日志级别 {}: {}", level, e))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    // 日志写到 stderr, stdout 留给运行摘要
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    let result = match options.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
