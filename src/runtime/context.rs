//! 桥接运行时上下文
//!
//! 原生模块向脚本侧发送的事件先进入无界队列，由运行时管理器在宿主线程上统一投递。

use crate::bindings::{LifecycleState, RuntimeContext};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

/// 应用状态变化事件名
pub const APP_STATE_DID_CHANGE: &str = "appStateDidChange";

/// 待投递给脚本侧的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub name: String,
    pub payload: Value,
}

pub struct BridgeContext {
    events: Sender<ScriptEvent>,
    lifecycle: Mutex<LifecycleState>,
}

impl BridgeContext {
    pub fn new(initial: LifecycleState) -> (Arc<Self>, Receiver<ScriptEvent>) {
        let (tx, rx) = unbounded();
        let context = Arc::new(Self {
            events: tx,
            lifecycle: Mutex::new(initial),
        });
        (context, rx)
    }

    fn state(&self) -> MutexGuard<'_, LifecycleState> {
        self.lifecycle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 切换状态；已处于目标状态时不做任何事
    fn transition(&self, target: LifecycleState, app_state: &str) {
        {
            let mut state = self.state();
            if *state == target {
                return;
            }
            *state = target;
        }
        tracing::debug!(target: "runtime", state = %target, "Runtime context lifecycle changed");
        self.emit(APP_STATE_DID_CHANGE, json!({ "app_state": app_state }));
    }
}

impl RuntimeContext for BridgeContext {
    fn emit(&self, event_name: &str, payload: Value) {
        let event = ScriptEvent {
            name: event_name.to_string(),
            payload,
        };
        if self.events.send(event).is_err() {
            tracing::trace!(target: "runtime", event = event_name, "Event dropped, runtime already torn down");
        }
    }

    fn on_suspend(&self) {
        if self.lifecycle_state() == LifecycleState::Resumed {
            self.transition(LifecycleState::Suspended, "background");
        }
    }

    fn on_resume(&self) {
        self.transition(LifecycleState::Resumed, "active");
    }

    fn lifecycle_state(&self) -> LifecycleState {
        *self.state()
    }
}
