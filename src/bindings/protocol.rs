//! Native Module Protocol
//!
//! The contract between host-side native modules and the script runtime that
//! hosts them: module metadata, method invocation with a one-shot result sink,
//! lifecycle hooks, and the registrar that produces a generation's modules.

use crate::core::{BindingError, BindingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Constants exported by a module, visible to scripts as plain properties.
pub type Constants = BTreeMap<String, Value>;

/// Lifecycle state of a runtime context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    BeforeCreate,
    BeforeResume,
    Resumed,
    Suspended,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::BeforeCreate => "before-create",
            LifecycleState::BeforeResume => "before-resume",
            LifecycleState::Resumed => "resumed",
            LifecycleState::Suspended => "suspended",
        };
        f.write_str(name)
    }
}

/// The script-side runtime context a native module is bound to.
pub trait RuntimeContext: Send + Sync {
    /// Fire-and-forget event to script listeners.
    fn emit(&self, event_name: &str, payload: Value);

    fn on_suspend(&self);

    fn on_resume(&self);

    fn lifecycle_state(&self) -> LifecycleState;
}

/// Host lifecycle notifications a module may opt into.
pub trait LifecycleEventListener {
    fn on_suspend(&self);
    fn on_resume(&self);
    fn on_destroy(&self);
}

/// A host capability exposed to script code.
pub trait NativeModule: Send + Sync {
    /// Name in the script-side `NativeModules` namespace.
    fn name(&self) -> &str;

    fn constants(&self) -> Constants {
        Constants::new()
    }

    /// Methods callable from script code. Each call settles a promise.
    fn methods(&self) -> &[&'static str];

    fn invoke(&self, method: &str, args: &[Value], promise: Promise) -> BindingResult<()>;

    fn as_lifecycle_listener(&self) -> Option<&dyn LifecycleEventListener> {
        None
    }
}

/// Placeholder for view manager registrations; this host registers none.
pub trait ViewManager: Send + Sync {
    fn name(&self) -> &str;
}

/// Produces the native modules of one runtime generation.
pub trait ModuleRegistrar: Send + Sync {
    fn create_native_modules(&self, context: &Arc<dyn RuntimeContext>) -> Vec<Arc<dyn NativeModule>>;

    fn create_script_modules_config(&self) -> Vec<String> {
        Vec::new()
    }

    fn create_view_managers(&self, _context: &Arc<dyn RuntimeContext>) -> Vec<Arc<dyn ViewManager>> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromiseRejection {
    pub code: String,
    pub message: String,
}

pub type PromiseOutcome = Result<Value, PromiseRejection>;

/// One-shot result sink handed to a module method.
///
/// Settling consumes the sink, so a promise resolves or rejects exactly once.
#[derive(Debug)]
pub struct Promise {
    tx: oneshot::Sender<PromiseOutcome>,
}

impl Promise {
    pub fn channel() -> (Promise, PromiseReceiver) {
        let (tx, rx) = oneshot::channel();
        (Promise { tx }, PromiseReceiver { rx })
    }

    pub fn resolve(self, value: Value) {
        // The waiter may have gone away; nothing to deliver then.
        let _ = self.tx.send(Ok(value));
    }

    pub fn reject(self, code: impl Into<String>, message: impl Into<String>) {
        let _ = self.tx.send(Err(PromiseRejection {
            code: code.into(),
            message: message.into(),
        }));
    }
}

/// Waiting side of a [`Promise`].
#[derive(Debug)]
pub struct PromiseReceiver {
    rx: oneshot::Receiver<PromiseOutcome>,
}

impl PromiseReceiver {
    /// Non-blocking check. `None` while the promise is still pending.
    pub fn try_settle(&mut self) -> Option<BindingResult<PromiseOutcome>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(Ok(outcome)),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(BindingError::PromiseDropped)),
        }
    }

    pub async fn wait(self) -> BindingResult<PromiseOutcome> {
        self.rx.await.map_err(|_| BindingError::PromiseDropped)
    }
}
