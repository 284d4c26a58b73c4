//! 桥接运行时管理器
//!
//! 以任意 [`ScriptExecutor`] 为后端的 [`RuntimeManager`] 实现：
//! 首次启动应用时构造脚本上下文（收集原生模块、安装桥、加载包、触发初始化通知），
//! 之后负责生命周期转发、事件投递和开发者重载。

use super::context::{BridgeContext, ScriptEvent};
use super::executor::ScriptExecutor;
use super::manager::{BackPressedFallback, ContextInitializedNotifier, RuntimeManager, RuntimeManagerBuilder};
use super::quickjs::quickjs_executor_factory;
use crate::bindings::{ModuleBridge, ModuleRegistrar, NativeModule, RuntimeContext};
use crate::config::{ExecutorFactory, RuntimeConfiguration};
use crate::core::{RuntimeError, RuntimeResult};
use crossbeam_channel::Receiver;
use futures::future::LocalBoxFuture;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::fs;
use std::sync::Arc;

/// 脚本侧启动入口
pub const RUN_APPLICATION: &str = "__runApplication";
/// 脚本侧事件分发入口
pub const EMIT_NATIVE_EVENT: &str = "__emitNativeEvent";
/// 脚本侧返回导航处理入口
pub const HARDWARE_BACK_PRESS: &str = "__onHardwareBackPress";

/// 一个已构造的脚本上下文
struct ScriptSession {
    executor: Box<dyn ScriptExecutor>,
    context: Arc<BridgeContext>,
    events: Receiver<ScriptEvent>,
    bridge: Arc<ModuleBridge>,
}

impl ScriptSession {
    fn destroy(self) {
        self.bridge.for_each_listener(|listener| listener.on_destroy());
    }
}

pub struct BridgedRuntimeManager {
    config: RuntimeConfiguration,
    registrars: Vec<Arc<dyn ModuleRegistrar>>,
    executor_factory: ExecutorFactory,
    initialized: Option<ContextInitializedNotifier>,
    session: Option<ScriptSession>,
    pending: VecDeque<ScriptEvent>,
    back_fallback: Option<BackPressedFallback>,
    application: Option<(String, Option<Value>)>,
    remote_debugging: bool,
    dev_menu_requests: usize,
    disposed: bool,
}

impl BridgedRuntimeManager {
    pub fn new(
        config: RuntimeConfiguration,
        registrars: Vec<Arc<dyn ModuleRegistrar>>,
        executor_factory: ExecutorFactory,
        initialized: ContextInitializedNotifier,
    ) -> Self {
        Self {
            config,
            registrars,
            executor_factory,
            initialized: Some(initialized),
            session: None,
            pending: VecDeque::new(),
            back_fallback: None,
            application: None,
            remote_debugging: false,
            dev_menu_requests: 0,
            disposed: false,
        }
    }

    pub fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    /// 当前脚本上下文（尚未启动时为 `None`）
    pub fn context(&self) -> Option<Arc<BridgeContext>> {
        self.session.as_ref().map(|s| Arc::clone(&s.context))
    }

    pub fn bridge(&self) -> Option<Arc<ModuleBridge>> {
        self.session.as_ref().map(|s| Arc::clone(&s.bridge))
    }

    pub fn dev_menu_requests(&self) -> usize {
        self.dev_menu_requests
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn ensure_live(&self) -> RuntimeResult<()> {
        if self.disposed {
            return Err(RuntimeError::AlreadyDisposed);
        }
        Ok(())
    }

    fn build_session(&mut self) -> RuntimeResult<ScriptSession> {
        let (context, events) = BridgeContext::new(self.config.initial_lifecycle_state);
        let shared: Arc<dyn RuntimeContext> = context.clone();

        let modules: Vec<Arc<dyn NativeModule>> = self
            .registrars
            .iter()
            .flat_map(|registrar| registrar.create_native_modules(&shared))
            .collect();
        let bridge = Arc::new(ModuleBridge::new(modules));

        let mut executor = (self.executor_factory)()?;
        executor.install_bridge(Arc::clone(&bridge))?;

        match &self.config.bundle_file_path {
            Some(path) => {
                let source = fs::read_to_string(path).map_err(|e| RuntimeError::BundleLoad {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                executor.run_script(&source, &path.display().to_string())?;
            }
            None if self.config.developer_mode_enabled => {
                tracing::info!(
                    target: "runtime",
                    module = %self.config.main_module_name,
                    "No bundle file configured; expecting the bundle from the development server"
                );
            }
            None => {
                tracing::warn!(target: "runtime", "No bundle file configured");
            }
        }

        if let Some(notifier) = self.initialized.take() {
            notifier.notify(shared);
        }

        tracing::info!(target: "runtime", modules = bridge.len(), "Script context initialized");
        Ok(ScriptSession {
            executor,
            context,
            events,
            bridge,
        })
    }

    fn run_application(&mut self) -> RuntimeResult<()> {
        let Some((component, props)) = self.application.clone() else {
            return Ok(());
        };
        let session = self.session.as_mut().ok_or(RuntimeError::NotStarted)?;
        session
            .executor
            .call_global(RUN_APPLICATION, &[json!(component), props.unwrap_or(Value::Null)])?;
        Ok(())
    }

    fn run_back_fallback(&mut self) {
        match self.back_fallback.as_mut() {
            Some(fallback) => fallback(),
            None => tracing::debug!(target: "runtime", "Back press unhandled and no fallback registered"),
        }
    }
}

impl RuntimeManager for BridgedRuntimeManager {
    fn dev_support_enabled(&self) -> bool {
        self.config.developer_mode_enabled
    }

    fn set_remote_debugging_enabled(&mut self, enabled: bool) {
        tracing::debug!(target: "runtime", enabled, "Remote debugging toggled");
        self.remote_debugging = enabled;
    }

    fn remote_debugging_enabled(&self) -> bool {
        self.remote_debugging
    }

    fn start_application(&mut self, component_name: &str, initial_props: Option<&Value>) -> RuntimeResult<()> {
        self.ensure_live()?;
        if self.session.is_none() {
            let session = self.build_session()?;
            self.session = Some(session);
        }
        self.application = Some((component_name.to_string(), initial_props.cloned()));

        tracing::info!(target: "runtime", component = component_name, "Starting application");
        self.run_application()
    }

    fn on_suspend(&mut self) {
        if let Some(session) = &self.session {
            session.bridge.for_each_listener(|listener| listener.on_suspend());
            session.context.on_suspend();
        }
    }

    fn on_resume(&mut self, fallback: BackPressedFallback) {
        self.back_fallback = Some(fallback);
        if let Some(session) = &self.session {
            session.context.on_resume();
            session.bridge.for_each_listener(|listener| listener.on_resume());
        }
    }

    fn on_back_pressed(&mut self) {
        let handled = match self.session.as_mut() {
            Some(session) => match session.executor.call_global(HARDWARE_BACK_PRESS, &[]) {
                Ok(result) => result == Some(Value::Bool(true)),
                Err(e) => {
                    tracing::warn!(target: "runtime", error = %e, "Back press handler failed");
                    false
                }
            },
            None => false,
        };

        if !handled {
            self.run_back_fallback();
        }
    }

    fn show_dev_menu(&mut self) {
        if !self.dev_support_enabled() {
            return;
        }
        self.dev_menu_requests += 1;
        tracing::info!(target: "runtime", "Developer menu requested");
    }

    fn force_reload(&mut self) -> RuntimeResult<()> {
        if !self.dev_support_enabled() {
            return Ok(());
        }
        self.ensure_live()?;

        tracing::info!(target: "runtime", "Reloading script context");
        if let Some(previous) = self.session.take() {
            previous.destroy();
        }
        let session = self.build_session()?;
        self.session = Some(session);
        self.run_application()
    }

    fn dispatch_event(&mut self, name: &str, payload: Value) {
        // 没有脚本会话时无人接收，直接丢弃
        if self.disposed || self.session.is_none() {
            tracing::debug!(target: "runtime", event = name, "Dropping event without a script session");
            return;
        }
        self.pending.push_back(ScriptEvent {
            name: name.to_string(),
            payload,
        });
    }

    fn process_events(&mut self) -> RuntimeResult<usize> {
        let Some(session) = self.session.as_mut() else {
            return Ok(0);
        };

        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            session
                .executor
                .call_global(EMIT_NATIVE_EVENT, &[json!(event.name), event.payload])?;
            delivered += 1;
        }
        while let Ok(event) = session.events.try_recv() {
            session
                .executor
                .call_global(EMIT_NATIVE_EVENT, &[json!(event.name), event.payload])?;
            delivered += 1;
        }

        if delivered > 0 {
            tracing::trace!(target: "runtime", delivered, "Delivered script events");
        }
        Ok(delivered)
    }

    fn dispose(&mut self) -> LocalBoxFuture<'static, RuntimeResult<()>> {
        if self.disposed {
            return Box::pin(async { Err(RuntimeError::AlreadyDisposed) });
        }
        self.disposed = true;

        let session = self.session.take();
        self.initialized = None;
        self.back_fallback = None;
        self.pending.clear();

        Box::pin(async move {
            if let Some(session) = session {
                session.destroy();
            }
            tracing::info!(target: "runtime", "Runtime manager disposed");
            Ok(())
        })
    }
}

/// 构建 [`BridgedRuntimeManager`]
///
/// 执行器来源优先级：配置中的工厂 > 构建器上的工厂 > QuickJS。
#[derive(Default, Clone)]
pub struct BridgedRuntimeBuilder {
    executor_factory: Option<ExecutorFactory>,
}

impl BridgedRuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_executor_factory(mut self, factory: ExecutorFactory) -> Self {
        self.executor_factory = Some(factory);
        self
    }
}

impl RuntimeManagerBuilder for BridgedRuntimeBuilder {
    type Manager = BridgedRuntimeManager;

    fn build(
        &mut self,
        config: RuntimeConfiguration,
        registrars: Vec<Arc<dyn ModuleRegistrar>>,
        initialized: ContextInitializedNotifier,
    ) -> RuntimeResult<Self::Manager> {
        let factory = config
            .executor_factory
            .clone()
            .or_else(|| self.executor_factory.clone())
            .unwrap_or_else(quickjs_executor_factory);

        tracing::debug!(target: "runtime", config = ?config, registrars = registrars.len(), "Building runtime manager");
        Ok(BridgedRuntimeManager::new(config, registrars, factory, initialized))
    }
}
