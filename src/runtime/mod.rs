//! 运行时模块
//!
//! - `controller` - 运行时宿主控制器
//! - `manager` - 运行时管理器抽象与初始化信号
//! - `bridge` - 基于脚本执行器的运行时管理器
//! - `context` - 桥接运行时上下文与事件队列
//! - `executor` - 脚本执行器抽象
//! - `quickjs` - QuickJS 执行器
//! - `dev_input` - 开发者按键状态机

pub mod bridge;
pub mod context;
pub mod controller;
pub mod dev_input;
pub mod executor;
pub mod manager;
pub mod quickjs;

pub use bridge::{BridgedRuntimeBuilder, BridgedRuntimeManager};
pub use context::{BridgeContext, ScriptEvent, APP_STATE_DID_CHANGE};
pub use controller::{ControllerOptions, HostState, RootViewFactory, RuntimeHostController};
pub use dev_input::{DevAction, DevInputStateMachine};
pub use executor::ScriptExecutor;
pub use manager::{
    context_initialized_channel, BackPressedFallback, ContextInitializedNotifier, ContextInitializedSignal,
    RuntimeManager, RuntimeManagerBuilder,
};
pub use quickjs::{quickjs_executor_factory, QuickJsExecutor};
