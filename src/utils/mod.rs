use tracing_subscriber::EnvFilter;

/// 初始化日志系统
///
/// 优先读取 `RUST_LOG`,未设置时使用 `info` 级别。重复调用不会报错。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
