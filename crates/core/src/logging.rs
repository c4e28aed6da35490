//! 日志初始化

use tracing_subscriber::EnvFilter;

use crate::errors::{BatchRunError, BatchRunResult};

/// 初始化tracing日志，RUST_LOG优先于传入的默认级别
pub fn init_logging(default_filter: &str) -> BatchRunResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| BatchRunError::Configuration(format!("初始化日志失败: {e}")))
}
