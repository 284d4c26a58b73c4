//! Module Bridge
//!
//! Name-indexed table of one generation's native modules. Script executors
//! use it to describe the modules to script code and to dispatch calls coming
//! back across the boundary as JSON.

use super::protocol::{LifecycleEventListener, NativeModule, Promise, PromiseReceiver};
use crate::core::{BindingError, BindingResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Module metadata as seen by script code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub constants: BTreeMap<String, Value>,
    pub methods: Vec<String>,
}

/// Result of a script-side invocation, serialized back as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationEnvelope {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvocationEnvelope {
    fn resolved(value: Value) -> Self {
        Self {
            ok: true,
            value: Some(value),
            code: None,
            error: None,
        }
    }

    fn rejected(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            code: Some(code.into()),
            error: Some(error.into()),
        }
    }
}

#[derive(Default)]
pub struct ModuleBridge {
    modules: BTreeMap<String, Arc<dyn NativeModule>>,
}

impl ModuleBridge {
    pub fn new(modules: Vec<Arc<dyn NativeModule>>) -> Self {
        let mut table = BTreeMap::new();
        for module in modules {
            let name = module.name().to_string();
            if table.insert(name.clone(), module).is_some() {
                tracing::warn!(target: "bindings", module = %name, "Duplicate native module; last registration wins");
            }
        }
        Self { modules: table }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn NativeModule>> {
        self.modules.get(name)
    }

    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .values()
            .map(|module| ModuleDescriptor {
                name: module.name().to_string(),
                constants: module.constants(),
                methods: module.methods().iter().map(|m| m.to_string()).collect(),
            })
            .collect()
    }

    pub fn describe_json(&self) -> BindingResult<String> {
        Ok(serde_json::to_string(&self.descriptors())?)
    }

    pub fn invoke(&self, module: &str, method: &str, args: &[Value]) -> BindingResult<PromiseReceiver> {
        let target = self
            .modules
            .get(module)
            .ok_or_else(|| BindingError::UnknownModule(module.to_string()))?;

        if !target.methods().contains(&method) {
            return Err(BindingError::UnknownMethod {
                module: module.to_string(),
                method: method.to_string(),
            });
        }

        let (promise, receiver) = Promise::channel();
        target.invoke(method, args, promise)?;
        Ok(receiver)
    }

    /// Invoke with JSON-encoded arguments and return a JSON envelope.
    ///
    /// Methods must settle their promise before returning; a still pending
    /// promise is reported as `E_PENDING`.
    pub fn invoke_json(&self, module: &str, method: &str, args_json: &str) -> String {
        let envelope = self.invoke_envelope(module, method, args_json);
        serde_json::to_string(&envelope).unwrap_or_else(|e| {
            format!(r#"{{"ok":false,"code":"E_SERIALIZATION","error":{:?}}}"#, e.to_string())
        })
    }

    fn invoke_envelope(&self, module: &str, method: &str, args_json: &str) -> InvocationEnvelope {
        let args: Vec<Value> = match serde_json::from_str(args_json) {
            Ok(args) => args,
            Err(e) => {
                let err = BindingError::InvalidArguments {
                    method: format!("{}.{}", module, method),
                    reason: e.to_string(),
                };
                return InvocationEnvelope::rejected("E_ARGUMENTS", err.to_string());
            }
        };

        let mut receiver = match self.invoke(module, method, &args) {
            Ok(receiver) => receiver,
            Err(e) => {
                tracing::warn!(target: "bindings", module, method, error = %e, "Native call failed");
                return InvocationEnvelope::rejected("E_BINDING", e.to_string());
            }
        };

        match receiver.try_settle() {
            Some(Ok(Ok(value))) => InvocationEnvelope::resolved(value),
            Some(Ok(Err(rejection))) => InvocationEnvelope::rejected(rejection.code, rejection.message),
            Some(Err(e)) => InvocationEnvelope::rejected("E_BINDING", e.to_string()),
            None => InvocationEnvelope::rejected("E_PENDING", "native method did not settle its promise"),
        }
    }

    /// Visit every module that listens to lifecycle events.
    pub fn for_each_listener(&self, mut f: impl FnMut(&dyn LifecycleEventListener)) {
        for module in self.modules.values() {
            if let Some(listener) = module.as_lifecycle_listener() {
                f(listener);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::{LifecycleState, NativeObjectModel, RuntimeContext};
    use crate::runtime::BridgeContext;
    use serde_json::json;

    fn bridge_with_model() -> (ModuleBridge, Arc<NativeObjectModel<String>>) {
        let (context, _events) = BridgeContext::new(LifecycleState::Resumed);
        let ctx: Arc<dyn RuntimeContext> = context;
        let model = Arc::new(NativeObjectModel::<String>::new(ctx));
        let bridge = ModuleBridge::new(vec![model.clone() as Arc<dyn NativeModule>]);
        (bridge, model)
    }

    #[test]
    fn test_descriptors() {
        let (bridge, _model) = bridge_with_model();
        let descriptors = bridge.descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "NativeObjectModel");
        assert_eq!(descriptors[0].methods, vec!["getData".to_string()]);
        assert_eq!(
            descriptors[0].constants.get("OnDataChangedEvent"),
            Some(&json!("OnDataChangedEvent"))
        );
    }

    #[test]
    fn test_invoke_json_round_trip() {
        let (bridge, model) = bridge_with_model();
        model.set_data("payload".into());

        let envelope: InvocationEnvelope =
            serde_json::from_str(&bridge.invoke_json("NativeObjectModel", "getData", "[]")).unwrap();
        assert!(envelope.ok);
        assert_eq!(envelope.value, Some(json!("payload")));
    }

    #[test]
    fn test_unknown_targets_fail_fast() {
        let (bridge, _model) = bridge_with_model();
        assert!(matches!(
            bridge.invoke("Missing", "getData", &[]),
            Err(BindingError::UnknownModule(_))
        ));
        assert!(matches!(
            bridge.invoke("NativeObjectModel", "explode", &[]),
            Err(BindingError::UnknownMethod { .. })
        ));

        let envelope: InvocationEnvelope =
            serde_json::from_str(&bridge.invoke_json("NativeObjectModel", "getData", "{")).unwrap();
        assert!(!envelope.ok);
        assert_eq!(envelope.code.as_deref(), Some("E_ARGUMENTS"));
    }

    #[test]
    fn test_listeners_are_visited() {
        let (bridge, _model) = bridge_with_model();
        let mut visited = 0;
        bridge.for_each_listener(|_| visited += 1);
        assert_eq!(visited, 1);
    }
}
