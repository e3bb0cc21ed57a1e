use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认日志过滤规则
pub const DEFAULT_LOG_FILTER: &str = "focuskeeper_lib=debug,warn";

/// Initialize logging with tracing
///
/// - Reads filter from RUST_LOG environment variable if available
/// - Falls back to [`DEFAULT_LOG_FILTER`] if RUST_LOG is not set
/// - Uses a formatted output layer
///
/// Returns `false` when a global subscriber was already installed.
///
/// # Example
///
/// ```no_run
/// use focuskeeper_lib::utils::logging::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("FocusKeeper logging initialized");
    }
    installed
}
