use tracing_subscriber::EnvFilter;

/// 初始化日志。`debug` 时默认 `debug` 级别并允许 `RUST_LOG` 覆盖，否则固定为 `info`。
///
/// 重复调用不会报错，先装好的订阅者保留。
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
