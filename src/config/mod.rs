/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和启动参数解析
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod launch;
pub mod runtime;

pub use launch::LaunchArguments;
pub use runtime::{ExecutorFactory, RuntimeConfiguration, RuntimeSettings};

/// 宿主配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
    /// 启动参数缺少取值
    #[error("Expected value for {argument} argument.")]
    MissingArgumentValue { argument: &'static str },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 宿主主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// 运行时配置
    #[serde(default)]
    pub runtime: RuntimeSettings,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HostConfig {
    /// 以主组件名创建默认配置
    pub fn new(main_component_name: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.runtime.main_component_name = main_component_name.into();
        config
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SCRIPT_HOST_DEVELOPER_MODE") {
            if let Ok(enabled) = val.trim().parse() {
                self.runtime.developer_mode_enabled = enabled;
            }
        }
        if let Some(val) = lookup("SCRIPT_HOST_BUNDLE_FILE") {
            self.runtime.bundle_file_path = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
        if let Some(val) = lookup("SCRIPT_HOST_MAIN_MODULE") {
            self.runtime.main_module_name = val;
        }
        if let Some(val) = lookup("SCRIPT_HOST_MAIN_COMPONENT") {
            self.runtime.main_component_name = val;
        }
        if let Some(val) = lookup("SCRIPT_HOST_LOG_LEVEL") {
            if let Some(level) = LogLevel::parse(&val) {
                self.logging.level = level;
            }
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.runtime.validate()
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./script_host.toml
    /// 2. ./script_host.json
    /// 3. ~/.config/script_host/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("script_host.toml") {
            tracing::debug!(target: "host", "Loaded config from script_host.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("script_host.json") {
            tracing::debug!(target: "host", "Loaded config from script_host.json");
            return config;
        }

        if let Some(home) = env::var_os("HOME") {
            let config_path = PathBuf::from(home)
                .join(".config")
                .join("script_host")
                .join("config.toml");

            if let Ok(config) = Self::from_toml_file(&config_path) {
                tracing::debug!(target: "host", path = ?config_path, "Loaded config");
                return config;
            }
        }

        tracing::debug!(target: "host", "Using default configuration");
        Self::default()
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: LogLevel,

    /// 是否输出日志 target
    pub show_targets: bool,
}

use crate::impl_default;

impl_default!(LoggingConfig {
    level: LogLevel::Info,
    show_targets: true,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// 跟踪
    Trace,
    /// 调试
    Debug,
    /// 信息
    Info,
    /// 警告
    Warn,
    /// 错误
    Error,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}
