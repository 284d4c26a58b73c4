//! 脚本执行器抽象
//!
//! 运行时管理器只通过这个接口驱动脚本引擎，具体引擎（QuickJS 或测试替身）可以替换。

use crate::bindings::ModuleBridge;
use crate::core::RuntimeResult;
use serde_json::Value;
use std::sync::Arc;

/// 单个脚本上下文的执行器
pub trait ScriptExecutor {
    /// 把本代际的原生模块表暴露给脚本侧，必须在加载包之前调用
    fn install_bridge(&mut self, bridge: Arc<ModuleBridge>) -> RuntimeResult<()>;

    /// 执行一段脚本源码
    fn run_script(&mut self, source: &str, source_url: &str) -> RuntimeResult<()>;

    /// 以 JSON 参数调用全局函数
    ///
    /// 函数不存在时返回 `Ok(None)`；返回值按 JSON 转换，`undefined` 视为 `None`。
    fn call_global(&mut self, function: &str, args: &[Value]) -> RuntimeResult<Option<Value>>;

    /// 执行挂起的微任务，返回执行的数量
    fn run_pending_jobs(&mut self) -> RuntimeResult<usize>;
}

/// 全局函数名校验，只允许标识符字符
pub fn is_valid_global_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
