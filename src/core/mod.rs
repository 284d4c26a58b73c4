//! 核心模块
//!
//! 包含宿主的基础设施：
//! - `error` - 错误类型定义
//! - `generation` - 代际编号与按代际索引的竞技场
//! - `logging` - 日志初始化
//! - `macros` - 声明式默认值宏

pub mod error;
pub mod generation;
pub mod logging;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    BindingError, BindingResult, HostError, HostResult, LifecycleError, LifecycleResult,
    RuntimeError, RuntimeResult,
};

pub use generation::{GenerationArena, GenerationId};
pub use logging::initialize_logging;
