//! 运行时宿主控制器
//!
//! 独占一个运行时管理器与一个根视图，把宿主生命周期（创建、挂起、恢复、返回导航、按键、
//! 重载、销毁）转换为运行时生命周期。
//!
//! 状态流转：
//! ```text
//! Uninitialized -> Created -> Running <-> Suspended
//!                     ^                      |
//!                     |    on_new_bundle     v
//!                     +------ Disposing <----+
//!                                 |
//!                                 v  dispose
//!                              Disposed
//! ```
//!
//! 重载期间（`Disposing`）到达的生命周期调用返回 [`LifecycleError`]。

use super::dev_input::{DevAction, DevInputStateMachine};
use super::manager::{context_initialized_channel, ContextInitializedSignal, RuntimeManager, RuntimeManagerBuilder};
use crate::bindings::registrar::lock_arena;
use crate::bindings::{
    default_model_factory, ModelArena, ModelFactory, ModelValue, ModuleRegistrar, NativeObjectModel,
    ObjectModelRegistrar,
};
use crate::config::{ExecutorFactory, HostConfig, LaunchArguments, RuntimeConfiguration};
use crate::core::{GenerationId, HostResult, LifecycleError, LifecycleResult};
use crate::platform::{
    BackRequestedArgs, HostEnvironment, HostEventSource, KeyEvent, RootView, SubscriptionId, TouchEventType,
};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 控制器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    Created,
    Running,
    Suspended,
    Disposing,
    Disposed,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostState::Uninitialized => "uninitialized",
            HostState::Created => "created",
            HostState::Running => "running",
            HostState::Suspended => "suspended",
            HostState::Disposing => "disposing",
            HostState::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// 根视图工厂
pub type RootViewFactory = Box<dyn FnMut() -> Box<dyn RootView>>;

/// 控制器的可选协作者
pub struct ControllerOptions<T> {
    /// 脚本执行器工厂，写入每一代的运行时配置
    pub executor_factory: Option<ExecutorFactory>,
    /// 对象模型构造函数
    pub model_factory: ModelFactory<T>,
    /// 额外的模块注册器，排在对象模型注册器之后
    pub registrars: Vec<Arc<dyn ModuleRegistrar>>,
}

impl<T: ModelValue> Default for ControllerOptions<T> {
    fn default() -> Self {
        Self {
            executor_factory: None,
            model_factory: default_model_factory(),
            registrars: Vec::new(),
        }
    }
}

pub struct RuntimeHostController<T: ModelValue, B: RuntimeManagerBuilder> {
    config: HostConfig,
    builder: B,
    host: Box<dyn HostEnvironment>,
    root_view_factory: RootViewFactory,
    options: ControllerOptions<T>,
    models: ModelArena<T>,
    generation: GenerationId,
    state: HostState,
    manager: Option<B::Manager>,
    root_view: Option<Box<dyn RootView>>,
    dev_input: DevInputStateMachine,
    key_subscription: Option<SubscriptionId>,
    back_subscription: Option<SubscriptionId>,
    context_initialized: Option<ContextInitializedSignal>,
    initial_props: Option<Value>,
}

impl<T: ModelValue, B: RuntimeManagerBuilder> RuntimeHostController<T, B> {
    pub fn new(
        config: HostConfig,
        builder: B,
        host: Box<dyn HostEnvironment>,
        root_view_factory: impl FnMut() -> Box<dyn RootView> + 'static,
    ) -> HostResult<Self> {
        Self::with_options(config, builder, host, root_view_factory, ControllerOptions::default())
    }

    /// 创建控制器并立即构建第一代运行时
    pub fn with_options(
        config: HostConfig,
        builder: B,
        host: Box<dyn HostEnvironment>,
        root_view_factory: impl FnMut() -> Box<dyn RootView> + 'static,
        options: ControllerOptions<T>,
    ) -> HostResult<Self> {
        config.validate()?;

        let mut controller = Self {
            config,
            builder,
            host,
            root_view_factory: Box::new(root_view_factory),
            options,
            models: ModelArena::<T>::default(),
            generation: GenerationId::NONE,
            state: HostState::Uninitialized,
            manager: None,
            root_view: None,
            dev_input: DevInputStateMachine::new(),
            key_subscription: None,
            back_subscription: None,
            context_initialized: None,
            initial_props: None,
        };
        controller.create_new_instance()?;
        Ok(controller)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn generation(&self) -> GenerationId {
        self.generation
    }

    pub fn root_view(&self) -> Option<&dyn RootView> {
        self.root_view.as_deref()
    }

    pub fn manager(&self) -> Option<&B::Manager> {
        self.manager.as_ref()
    }

    pub fn manager_mut(&mut self) -> Option<&mut B::Manager> {
        self.manager.as_mut()
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// 当前代际的对象模型；脚本上下文构造之前为 `None`
    pub fn native_object_model(&self) -> Option<Arc<NativeObjectModel<T>>> {
        lock_arena(&self.models).get(self.generation).cloned()
    }

    /// 取走当前代际的"上下文已初始化"信号，每代只能取一次
    pub fn context_initialized(&mut self) -> Option<ContextInitializedSignal> {
        self.context_initialized.take()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// 构建新一代运行时管理器和根视图
    fn create_new_instance(&mut self) -> HostResult<()> {
        let generation = self.generation.next();
        let runtime_config =
            RuntimeConfiguration::from_settings(&self.config.runtime, self.options.executor_factory.clone());

        let registrar = ObjectModelRegistrar::new(
            generation,
            Arc::clone(&self.models),
            Arc::clone(&self.options.model_factory),
        );
        let mut registrars: Vec<Arc<dyn ModuleRegistrar>> = vec![Arc::new(registrar)];
        registrars.extend(self.options.registrars.iter().cloned());

        // 通知端随构建一起交给管理器，脚本开始执行前订阅就已完成
        let (notifier, signal) = context_initialized_channel();
        let manager = self.builder.build(runtime_config, registrars, notifier)?;

        let mut root_view = (self.root_view_factory)();
        root_view.attach();

        self.generation = generation;
        self.manager = Some(manager);
        self.root_view = Some(root_view);
        self.context_initialized = Some(signal);
        self.state = HostState::Created;

        tracing::info!(target: "host", generation = %generation, "Runtime instance created");
        Ok(())
    }

    /// 应用主题、解析启动参数、启动主组件并订阅宿主事件
    pub fn on_create(&mut self, launch_arguments: Option<&str>, initial_props: Option<Value>) -> HostResult<()> {
        if self.state != HostState::Created {
            return Err(self.invalid_state("on_create").into());
        }

        let theme = self.host.background_theme();
        if let Some(view) = self.root_view.as_mut() {
            view.set_background(&theme);
        }

        let arguments = LaunchArguments::parse(launch_arguments)?;

        let (Some(view), Some(manager)) = (self.root_view.as_mut(), self.manager.as_mut()) else {
            return Err(LifecycleError::NoActiveRuntime { operation: "on_create" }.into());
        };
        if let Some(enabled) = arguments.remote_debugging {
            manager.set_remote_debugging_enabled(enabled);
        }

        view.start_application(manager, &self.config.runtime.main_component_name, initial_props.as_ref())?;
        self.initial_props = initial_props;

        self.back_subscription = Some(self.host.subscribe(HostEventSource::BackRequested));
        self.key_subscription = Some(self.host.subscribe(HostEventSource::KeyEvents));
        self.state = HostState::Running;

        tracing::info!(
            target: "host",
            component = %self.config.runtime.main_component_name,
            generation = %self.generation,
            "Application started"
        );
        Ok(())
    }

    pub fn on_suspend(&mut self) -> LifecycleResult<()> {
        self.live_manager("on_suspend")?.on_suspend();
        if self.state == HostState::Running {
            self.state = HostState::Suspended;
        }
        tracing::debug!(target: "host", "Suspended");
        Ok(())
    }

    /// 恢复运行；`back_pressed_fallback` 在脚本侧未处理返回导航时执行
    pub fn on_resume(&mut self, back_pressed_fallback: impl FnMut() + 'static) -> LifecycleResult<()> {
        self.live_manager("on_resume")?
            .on_resume(Box::new(back_pressed_fallback));
        if self.state == HostState::Suspended {
            self.state = HostState::Running;
        }
        tracing::debug!(target: "host", "Resumed");
        Ok(())
    }

    /// 返回导航总是交给运行时并标记为已处理
    pub fn on_back_requested(&mut self, args: &mut BackRequestedArgs) -> LifecycleResult<()> {
        if self.back_subscription.is_none() {
            return Ok(());
        }
        self.live_manager("on_back_requested")?.on_back_pressed();
        args.handled = true;
        Ok(())
    }

    /// 开发者按键处理
    pub fn on_key_event(&mut self, event: &KeyEvent) -> LifecycleResult<Option<DevAction>> {
        if self.key_subscription.is_none() {
            return Ok(None);
        }

        let developer_mode = self.live_manager("on_key_event")?.dev_support_enabled();
        let action = self.dev_input.process(developer_mode, event);

        match action {
            Some(DevAction::ShowDevMenu) => {
                tracing::debug!(target: "dev_input", %event, "Show developer menu");
                self.live_manager("on_key_event")?.show_dev_menu();
            }
            Some(DevAction::ForceReload) => {
                tracing::debug!(target: "dev_input", %event, "Force reload");
                if let Err(e) = self.live_manager("on_key_event")?.force_reload() {
                    tracing::error!(target: "dev_input", error = %e, "Forced reload failed");
                }
            }
            None => {}
        }
        Ok(action)
    }

    /// 按宿主原始编码处理按键，未知的事件分类直接失败
    pub fn on_raw_key_event(&mut self, raw_key: u32, raw_kind: u32) -> HostResult<Option<DevAction>> {
        let event = KeyEvent::from_raw(raw_key, raw_kind)?;
        Ok(self.on_key_event(&event)?)
    }

    /// 把指针事件转发给脚本侧
    pub fn on_pointer_event(&mut self, raw_kind: u32, payload: Value) -> HostResult<()> {
        let kind = TouchEventType::try_from(raw_kind)?;
        self.live_manager("on_pointer_event")?
            .dispatch_event(kind.js_event_name(), payload);
        Ok(())
    }

    /// 投递排队的脚本事件
    pub fn process_events(&mut self) -> HostResult<usize> {
        Ok(self.live_manager("process_events")?.process_events()?)
    }

    /// 重新加载脚本包
    ///
    /// 旧管理器的销毁必须完成后才会构建新一代；`&mut self` 保证期间不会有其他调用交错。
    pub async fn on_new_bundle(&mut self) -> HostResult<()> {
        if matches!(self.state, HostState::Disposing | HostState::Disposed) {
            return Err(self.invalid_state("on_new_bundle").into());
        }
        let Some(mut manager) = self.manager.take() else {
            return Err(LifecycleError::NoActiveRuntime { operation: "on_new_bundle" }.into());
        };

        tracing::info!(target: "host", generation = %self.generation, "Reloading bundle");
        self.unsubscribe_all();
        if let Some(mut view) = self.root_view.take() {
            view.detach();
        }
        self.state = HostState::Disposing;

        let disposal = manager.dispose().await;
        drop(manager);
        lock_arena(&self.models).remove(self.generation);
        self.context_initialized = None;
        if let Err(e) = disposal {
            self.state = HostState::Disposed;
            return Err(e.into());
        }

        // 新一代构建失败时没有可用的管理器，控制器终止于 Disposed
        if let Err(e) = self.create_new_instance() {
            self.state = HostState::Disposed;
            return Err(e);
        }
        let props = self.initial_props.clone();
        self.on_create(None, props)
    }

    /// 销毁控制器，返回前运行时管理器已完全销毁
    pub async fn dispose(&mut self) -> HostResult<()> {
        if matches!(self.state, HostState::Disposing | HostState::Disposed) {
            return Err(self.invalid_state("dispose").into());
        }

        self.unsubscribe_all();
        if let Some(mut view) = self.root_view.take() {
            view.detach();
        }
        self.state = HostState::Disposing;

        let result = match self.manager.take() {
            Some(mut manager) => manager.dispose().await,
            None => Ok(()),
        };
        lock_arena(&self.models).remove(self.generation);
        self.context_initialized = None;
        self.state = HostState::Disposed;

        result?;
        tracing::info!(target: "host", generation = %self.generation, "Controller disposed");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn live_manager(&mut self, operation: &'static str) -> LifecycleResult<&mut B::Manager> {
        if matches!(self.state, HostState::Disposing | HostState::Disposed) {
            return Err(self.invalid_state(operation));
        }
        self.manager
            .as_mut()
            .ok_or(LifecycleError::NoActiveRuntime { operation })
    }

    fn invalid_state(&self, operation: &'static str) -> LifecycleError {
        LifecycleError::InvalidState {
            operation,
            state: self.state.to_string(),
        }
    }

    fn unsubscribe_all(&mut self) {
        if let Some(id) = self.key_subscription.take() {
            self.host.unsubscribe(id);
        }
        if let Some(id) = self.back_subscription.take() {
            self.host.unsubscribe(id);
        }
    }
}
