//! 原生对象模型
//!
//! 在宿主与脚本之间共享一个类型为 `T` 的值。宿主写入新值时（按相等性判断发生变化）
//! 向脚本侧发送 `OnDataChangedEvent`；脚本通过 `getData` 方法取回当前值。

use super::protocol::{Constants, LifecycleEventListener, NativeModule, Promise, RuntimeContext};
use crate::core::{BindingError, BindingResult};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

/// 数据变化事件名
pub const ON_DATA_CHANGED_EVENT: &str = "OnDataChangedEvent";

/// 脚本侧 `NativeModules` 中的模块名
pub const OBJECT_MODEL_MODULE_NAME: &str = "NativeObjectModel";

const GET_DATA: &str = "getData";

/// 对象模型可承载的值类型
///
/// 可序列化约束在注册时（编译期）检查，运行时不会因为类型无法跨桥传递而失败。
pub trait ModelValue: Clone + PartialEq + Default + Serialize + Send + 'static {}

impl<T> ModelValue for T where T: Clone + PartialEq + Default + Serialize + Send + 'static {}

/// 绑定到某一运行时上下文的原生对象模型
pub struct NativeObjectModel<T> {
    name: String,
    context: Arc<dyn RuntimeContext>,
    data: Mutex<T>,
}

impl<T: ModelValue> NativeObjectModel<T> {
    pub fn new(context: Arc<dyn RuntimeContext>) -> Self {
        Self::with_name(context, OBJECT_MODEL_MODULE_NAME)
    }

    pub fn with_name(context: Arc<dyn RuntimeContext>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            context,
            data: Mutex::new(T::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 当前值的副本
    pub fn data(&self) -> T {
        self.lock().clone()
    }

    /// 写入新值
    ///
    /// 仅当新值与旧值不相等时才保存并通知脚本侧；返回是否发生了变化。
    /// 通知只携带占位负载，脚本需要通过 `getData` 取回实际值。
    pub fn set_data(&self, value: T) -> bool {
        {
            let mut data = self.lock();
            if *data == value {
                return false;
            }
            *data = value;
        }

        tracing::trace!(target: "bindings", module = %self.name, "Object model data changed");
        self.context
            .emit(ON_DATA_CHANGED_EVENT, Value::String(String::new()));
        true
    }

    /// 用当前值决议结果槽，默认值同样是合法结果
    pub fn get_data(&self, promise: Promise) {
        match serde_json::to_value(self.data()) {
            Ok(value) => promise.resolve(value),
            Err(e) => promise.reject("E_SERIALIZATION", e.to_string()),
        }
    }

    pub fn context(&self) -> &Arc<dyn RuntimeContext> {
        &self.context
    }
}

impl<T: ModelValue> NativeModule for NativeObjectModel<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn constants(&self) -> Constants {
        let mut constants = Constants::new();
        constants.insert(
            ON_DATA_CHANGED_EVENT.to_string(),
            Value::String(ON_DATA_CHANGED_EVENT.to_string()),
        );
        constants
    }

    fn methods(&self) -> &[&'static str] {
        &[GET_DATA]
    }

    fn invoke(&self, method: &str, _args: &[Value], promise: Promise) -> BindingResult<()> {
        match method {
            GET_DATA => {
                self.get_data(promise);
                Ok(())
            }
            other => Err(BindingError::UnknownMethod {
                module: self.name.clone(),
                method: other.to_string(),
            }),
        }
    }

    fn as_lifecycle_listener(&self) -> Option<&dyn LifecycleEventListener> {
        Some(self)
    }
}

impl<T: ModelValue> LifecycleEventListener for NativeObjectModel<T> {
    fn on_suspend(&self) {
        self.context.on_suspend();
    }

    fn on_resume(&self) {
        self.context.on_resume();
    }

    /// 状态随代际一起丢弃，无需清理
    fn on_destroy(&self) {}
}
