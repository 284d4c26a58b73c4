//! 统一错误处理模块
//!
//! 提供宿主范围内的统一错误类型定义
//!
//! ## 错误类型分层
//!
//! - **配置错误** (`config::ConfigError`): 配置文件与启动参数解析
//! - **绑定错误** (`BindingError`): 原生模块调用、输入分类
//! - **运行时错误** (`RuntimeError`): 脚本引擎构建、包加载、异步销毁
//! - **生命周期错误** (`LifecycleError`): 在错误的控制器状态下调用生命周期操作
//!
//! `HostError` 可以同时承载以上所有层的错误。

use crate::config::ConfigError;
use thiserror::Error;

/// 宿主顶层错误类型
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
}

/// 原生模块绑定错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// 输入值不在封闭枚举内（例如未知的事件分类码）
    #[error("Unsupported {kind}: {value}")]
    UnsupportedInput { kind: &'static str, value: String },

    #[error("Native module not found: {0}")]
    UnknownModule(String),

    #[error("Method '{method}' is not exported by module '{module}'")]
    UnknownMethod { module: String, method: String },

    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// 结果槽在被决议前已被丢弃
    #[error("Promise dropped before it was settled")]
    PromiseDropped,
}

impl BindingError {
    pub fn unsupported(kind: &'static str, value: impl ToString) -> Self {
        Self::UnsupportedInput {
            kind,
            value: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for BindingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// 脚本运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Script engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Script error: {0}")]
    Script(String),

    #[error("Failed to load bundle {path}: {reason}")]
    BundleLoad { path: String, reason: String },

    #[error("Binding error: {0}")]
    Binding(#[from] BindingError),

    #[error("Runtime context has not been started")]
    NotStarted,

    #[error("Runtime manager already disposed")]
    AlreadyDisposed,

    #[error("Runtime disposal failed: {0}")]
    Dispose(String),
}

/// 生命周期顺序错误
///
/// 重载窗口期间（旧管理器已销毁、新管理器尚未创建）或销毁之后调用生命周期操作时返回。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("{operation} requires a live runtime manager")]
    NoActiveRuntime { operation: &'static str },

    #[error("{operation} is not allowed while the controller is {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },
}

/// 宿主结果类型别名
pub type HostResult<T> = Result<T, HostError>;
pub type BindingResult<T> = Result<T, BindingError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = BindingError::unsupported("touch event type", 42);
        let host_err: HostError = err.into();
        assert!(matches!(
            host_err,
            HostError::Binding(BindingError::UnsupportedInput { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let err = LifecycleError::NoActiveRuntime {
            operation: "on_suspend",
        };
        assert_eq!(err.to_string(), "on_suspend requires a live runtime manager");

        let err = BindingError::unsupported("key event kind", 99);
        assert_eq!(err.to_string(), "Unsupported key event kind: 99");
    }

    #[test]
    fn test_runtime_error_wraps_binding_error() {
        let err: RuntimeError = BindingError::UnknownModule("Missing".into()).into();
        assert_eq!(
            err.to_string(),
            "Binding error: Native module not found: Missing"
        );
    }
}
