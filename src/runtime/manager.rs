//! 运行时管理器抽象
//!
//! 控制器独占一个运行时管理器，并通过此接口转发宿主生命周期。
//! 管理器由 [`RuntimeManagerBuilder`] 构建；"上下文已初始化"通知在构建时就交给管理器，
//! 因此订阅必然发生在脚本开始执行之前。

use crate::bindings::{ModuleRegistrar, RuntimeContext};
use crate::config::RuntimeConfiguration;
use crate::core::{RuntimeError, RuntimeResult};
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::oneshot;

/// 脚本侧没有处理返回导航时执行的后备动作
pub type BackPressedFallback = Box<dyn FnMut()>;

/// 单个运行时代际的管理器
pub trait RuntimeManager {
    /// 开发者支持（开发菜单、热重载）是否启用
    fn dev_support_enabled(&self) -> bool;

    fn set_remote_debugging_enabled(&mut self, enabled: bool);

    fn remote_debugging_enabled(&self) -> bool;

    /// 启动命名的主组件
    fn start_application(&mut self, component_name: &str, initial_props: Option<&Value>) -> RuntimeResult<()>;

    fn on_suspend(&mut self);

    /// 恢复运行，并记录返回导航的后备动作
    fn on_resume(&mut self, fallback: BackPressedFallback);

    /// 交给脚本侧处理返回导航
    fn on_back_pressed(&mut self);

    fn show_dev_menu(&mut self);

    /// 重新加载脚本包
    fn force_reload(&mut self) -> RuntimeResult<()>;

    /// 向脚本侧派发宿主事件（排队，由 `process_events` 投递）
    fn dispatch_event(&mut self, name: &str, payload: Value);

    /// 投递排队的事件，返回投递数量
    fn process_events(&mut self) -> RuntimeResult<usize>;

    /// 异步销毁
    ///
    /// 返回的 future 不借用管理器；销毁动作在 future 被等待时完成。
    fn dispose(&mut self) -> LocalBoxFuture<'static, RuntimeResult<()>>;
}

/// 运行时管理器构建器
pub trait RuntimeManagerBuilder {
    type Manager: RuntimeManager + 'static;

    fn build(
        &mut self,
        config: RuntimeConfiguration,
        registrars: Vec<Arc<dyn ModuleRegistrar>>,
        initialized: ContextInitializedNotifier,
    ) -> RuntimeResult<Self::Manager>;
}

/// 创建一对"上下文已初始化"通知端与信号端
pub fn context_initialized_channel() -> (ContextInitializedNotifier, ContextInitializedSignal) {
    let (tx, rx) = oneshot::channel();
    (ContextInitializedNotifier { tx }, ContextInitializedSignal { rx })
}

/// 通知端：由管理器在上下文构造完成时触发，只能触发一次
pub struct ContextInitializedNotifier {
    tx: oneshot::Sender<Arc<dyn RuntimeContext>>,
}

impl ContextInitializedNotifier {
    pub fn notify(self, context: Arc<dyn RuntimeContext>) {
        if self.tx.send(context).is_err() {
            tracing::trace!(target: "runtime", "Nobody is waiting for context initialization");
        }
    }
}

/// 信号端：控制器持有，可被轮询或等待
pub struct ContextInitializedSignal {
    rx: oneshot::Receiver<Arc<dyn RuntimeContext>>,
}

impl ContextInitializedSignal {
    /// 非阻塞获取已初始化的上下文
    pub fn try_take(&mut self) -> Option<Arc<dyn RuntimeContext>> {
        self.rx.try_recv().ok()
    }

    /// 等待上下文初始化；管理器在触发前被销毁时返回 `NotStarted`
    pub async fn wait(self) -> RuntimeResult<Arc<dyn RuntimeContext>> {
        self.rx.await.map_err(|_| RuntimeError::NotStarted)
    }
}
