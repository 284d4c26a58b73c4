//! QuickJS 脚本执行器
//!
//! 基于 rquickjs 的 [`ScriptExecutor`] 实现。原生调用通过 `__nativeInvoke` 以 JSON 往返，
//! 脚本侧的 `NativeModules`、`DeviceEventEmitter` 和 `console` 由预置脚本定义。

use super::executor::{is_valid_global_name, ScriptExecutor};
use crate::bindings::ModuleBridge;
use crate::config::ExecutorFactory;
use crate::core::{RuntimeError, RuntimeResult};
use rquickjs::{Context, Ctx, Function, Runtime};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// 控制台预置脚本，把 console.* 转发到 `__log`
const CONSOLE_PRELUDE: &str = r#"
(function (global) {
  function format(args) {
    return Array.prototype.map.call(args, function (a) {
      return typeof a === "string" ? a : JSON.stringify(a);
    }).join(" ");
  }
  function level(name) {
    return function () { global.__log(name, format(arguments)); };
  }
  global.console = {
    log: level("info"),
    info: level("info"),
    warn: level("warn"),
    error: level("error"),
    debug: level("debug")
  };
})(globalThis);
"#;

/// 原生模块预置脚本
const BRIDGE_PRELUDE: &str = r#"
(function (global) {
  var descriptors = JSON.parse(global.__nativeModuleConfig || "[]");
  var modules = {};
  descriptors.forEach(function (descriptor) {
    var module = {};
    Object.keys(descriptor.constants).forEach(function (key) {
      module[key] = descriptor.constants[key];
    });
    descriptor.methods.forEach(function (method) {
      module[method] = function () {
        var args = JSON.stringify(Array.prototype.slice.call(arguments));
        return new Promise(function (resolve, reject) {
          var envelope = JSON.parse(global.__nativeInvoke(descriptor.name, method, args));
          if (envelope.ok) {
            resolve(envelope.value === undefined ? null : envelope.value);
          } else {
            var error = new Error(envelope.error);
            error.code = envelope.code;
            reject(error);
          }
        });
      };
    });
    modules[descriptor.name] = module;
  });
  global.NativeModules = modules;

  var listeners = {};
  global.DeviceEventEmitter = {
    addListener: function (name, fn) {
      (listeners[name] = listeners[name] || []).push(fn);
      return {
        remove: function () {
          var list = listeners[name] || [];
          var index = list.indexOf(fn);
          if (index >= 0) list.splice(index, 1);
        }
      };
    },
    removeAllListeners: function (name) { delete listeners[name]; },
    listenerCount: function (name) { return (listeners[name] || []).length; }
  };
  global.__emitNativeEvent = function (name, payload) {
    (listeners[name] || []).slice().forEach(function (fn) { fn(payload); });
  };
})(globalThis);
"#;

#[derive(Deserialize)]
struct CallOutcome {
    found: bool,
    #[serde(default)]
    value: Option<Value>,
}

pub struct QuickJsExecutor {
    context: Context,
    runtime: Runtime,
    bridge: Option<Arc<ModuleBridge>>,
}

impl QuickJsExecutor {
    pub fn new() -> RuntimeResult<Self> {
        let runtime = Runtime::new().map_err(|e| RuntimeError::EngineInit(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| RuntimeError::EngineInit(e.to_string()))?;

        context.with(|ctx| -> RuntimeResult<()> {
            let log = Function::new(ctx.clone(), |level: String, message: String| {
                match level.as_str() {
                    "error" => tracing::error!(target: "script.console", "{}", message),
                    "warn" => tracing::warn!(target: "script.console", "{}", message),
                    "debug" => tracing::debug!(target: "script.console", "{}", message),
                    _ => tracing::info!(target: "script.console", "{}", message),
                }
            })
            .map_err(|e| RuntimeError::EngineInit(e.to_string()))?;
            ctx.globals()
                .set("__log", log)
                .map_err(|e| RuntimeError::EngineInit(e.to_string()))?;
            ctx.eval::<(), _>(CONSOLE_PRELUDE)
                .map_err(|e| script_error(&ctx, e))
        })?;

        tracing::debug!(target: "runtime", "QuickJS executor created");
        Ok(Self {
            context,
            runtime,
            bridge: None,
        })
    }

    pub fn bridge(&self) -> Option<&Arc<ModuleBridge>> {
        self.bridge.as_ref()
    }
}

/// 默认执行器工厂
pub fn quickjs_executor_factory() -> ExecutorFactory {
    Arc::new(|| Ok(Box::new(QuickJsExecutor::new()?) as Box<dyn ScriptExecutor>))
}

/// 取出挂起的异常，转换为运行时错误
fn script_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> RuntimeError {
    if let rquickjs::Error::Exception = err {
        let value = ctx.catch();
        if let Some(exception) = value.as_exception() {
            let message = exception.message().unwrap_or_default();
            return match exception.stack() {
                Some(stack) if !stack.is_empty() => RuntimeError::Script(format!("{}\n{}", message, stack)),
                _ => RuntimeError::Script(message),
            };
        }
        return RuntimeError::Script("uncaught exception".to_string());
    }
    RuntimeError::Script(err.to_string())
}

impl ScriptExecutor for QuickJsExecutor {
    fn install_bridge(&mut self, bridge: Arc<ModuleBridge>) -> RuntimeResult<()> {
        let config = bridge.describe_json()?;
        let invoker = Arc::clone(&bridge);

        self.context.with(|ctx| -> RuntimeResult<()> {
            let globals = ctx.globals();
            globals
                .set("__nativeModuleConfig", config)
                .map_err(|e| script_error(&ctx, e))?;
            let invoke = Function::new(ctx.clone(), move |module: String, method: String, args: String| {
                invoker.invoke_json(&module, &method, &args)
            })
            .map_err(|e| script_error(&ctx, e))?;
            globals
                .set("__nativeInvoke", invoke)
                .map_err(|e| script_error(&ctx, e))?;
            ctx.eval::<(), _>(BRIDGE_PRELUDE)
                .map_err(|e| script_error(&ctx, e))
        })?;

        tracing::debug!(target: "runtime", modules = bridge.len(), "Native modules installed");
        self.bridge = Some(bridge);
        Ok(())
    }

    fn run_script(&mut self, source: &str, source_url: &str) -> RuntimeResult<()> {
        tracing::debug!(target: "runtime", source_url, bytes = source.len(), "Evaluating script");
        self.context.with(|ctx| {
            ctx.eval::<(), _>(source).map_err(|e| match script_error(&ctx, e) {
                RuntimeError::Script(message) => RuntimeError::Script(format!("{}: {}", source_url, message)),
                other => other,
            })
        })?;
        self.run_pending_jobs()?;
        Ok(())
    }

    fn call_global(&mut self, function: &str, args: &[Value]) -> RuntimeResult<Option<Value>> {
        if !is_valid_global_name(function) {
            return Err(RuntimeError::Script(format!("invalid global function name '{}'", function)));
        }

        let args = serde_json::to_string(args).map_err(|e| RuntimeError::Script(e.to_string()))?;
        let script = format!(
            "(function () {{ var f = globalThis.{name}; \
             if (typeof f !== 'function') return JSON.stringify({{ found: false }}); \
             return JSON.stringify({{ found: true, value: f.apply(globalThis, {args}) }}); }})()",
            name = function,
            args = args,
        );

        let output = self
            .context
            .with(|ctx| ctx.eval::<String, _>(script).map_err(|e| script_error(&ctx, e)))?;
        self.run_pending_jobs()?;

        let outcome: CallOutcome =
            serde_json::from_str(&output).map_err(|e| RuntimeError::Script(e.to_string()))?;
        if !outcome.found {
            tracing::trace!(target: "runtime", function, "Global function not defined");
        }
        Ok(outcome.value)
    }

    fn run_pending_jobs(&mut self) -> RuntimeResult<usize> {
        let mut executed = 0;
        while self
            .runtime
            .execute_pending_job()
            .map_err(|_| RuntimeError::Script("pending job raised an exception".to_string()))?
        {
            executed += 1;
        }
        Ok(executed)
    }
}
