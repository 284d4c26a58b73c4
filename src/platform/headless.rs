//! 无界面宿主实现
//!
//! 供 playground 可执行文件和测试使用：记录挂载、主题与订阅状态，而不依赖真实的UI框架。

use super::{HostEnvironment, HostEventSource, RootView, SubscriptionId, Theme};
use crate::core::RuntimeResult;
use crate::runtime::RuntimeManager;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct ViewState {
    attached: bool,
    background: Option<Theme>,
    started_components: Vec<String>,
}

/// 无界面根视图，克隆体共享同一份状态
#[derive(Debug, Clone, Default)]
pub struct HeadlessRootView {
    state: Rc<RefCell<ViewState>>,
}

impl HeadlessRootView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background(&self) -> Option<Theme> {
        self.state.borrow().background.clone()
    }

    pub fn started_components(&self) -> Vec<String> {
        self.state.borrow().started_components.clone()
    }
}

impl RootView for HeadlessRootView {
    fn attach(&mut self) {
        self.state.borrow_mut().attached = true;
    }

    fn detach(&mut self) {
        self.state.borrow_mut().attached = false;
    }

    fn is_attached(&self) -> bool {
        self.state.borrow().attached
    }

    fn set_background(&mut self, theme: &Theme) {
        self.state.borrow_mut().background = Some(theme.clone());
    }

    fn start_application(
        &mut self,
        manager: &mut dyn RuntimeManager,
        component_name: &str,
        initial_props: Option<&Value>,
    ) -> RuntimeResult<()> {
        manager.start_application(component_name, initial_props)?;
        self.state
            .borrow_mut()
            .started_components
            .push(component_name.to_string());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct HostState {
    theme: Theme,
    next_subscription: u64,
    subscriptions: BTreeMap<SubscriptionId, HostEventSource>,
    views: Vec<HeadlessRootView>,
}

/// 无界面宿主环境
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    state: Rc<RefCell<HostState>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(theme: Theme) -> Self {
        let host = Self::default();
        host.state.borrow_mut().theme = theme;
        host
    }

    /// 当前对某事件来源的有效订阅数
    pub fn active_subscriptions(&self, source: HostEventSource) -> usize {
        self.state
            .borrow()
            .subscriptions
            .values()
            .filter(|s| **s == source)
            .count()
    }

    /// 根视图工厂：创建的每个视图都会被记录下来
    pub fn root_view_factory(&self) -> impl FnMut() -> Box<dyn RootView> {
        let state = Rc::clone(&self.state);
        move || {
            let view = HeadlessRootView::new();
            state.borrow_mut().views.push(view.clone());
            Box::new(view) as Box<dyn RootView>
        }
    }

    /// 按创建顺序返回所有创建过的根视图
    pub fn views(&self) -> Vec<HeadlessRootView> {
        self.state.borrow().views.clone()
    }
}

impl HostEnvironment for HeadlessHost {
    fn background_theme(&self) -> Theme {
        self.state.borrow().theme.clone()
    }

    fn subscribe(&mut self, source: HostEventSource) -> SubscriptionId {
        let mut state = self.state.borrow_mut();
        state.next_subscription += 1;
        let id = SubscriptionId(state.next_subscription);
        state.subscriptions.insert(id, source);
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.state.borrow_mut().subscriptions.remove(&subscription);
    }
}
