//! 日志初始化
//!
//! 基于 tracing 日志框架，日志级别优先读取 `RUST_LOG` 环境变量，其次使用配置文件中的级别。

use crate::config::{LogLevel, LoggingConfig};
use tracing_subscriber::EnvFilter;

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// 构建日志过滤器
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()))
}

/// 初始化日志系统
///
/// 重复调用是安全的：已安装全局订阅者时直接返回。
pub fn initialize_logging(config: &LoggingConfig) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_target(config.show_targets)
        .try_init();

    if result.is_ok() {
        tracing::info!(target: "host", level = config.level.as_filter(), "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_names() {
        assert_eq!(LogLevel::Warn.as_filter(), "warn");
        assert_eq!(LogLevel::Trace.as_filter(), "trace");
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        let config = LoggingConfig::default();
        initialize_logging(&config);
        initialize_logging(&config);
    }
}
