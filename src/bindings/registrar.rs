//! 对象模型注册器
//!
//! 每构建一次运行时管理器就创建一个新的注册器；运行时构造上下文时调用它，
//! 生成恰好一个绑定到该上下文的 [`NativeObjectModel`]，并记录到所属代际的竞技场槽位。

use super::object_model::{ModelValue, NativeObjectModel};
use super::protocol::{ModuleRegistrar, NativeModule, RuntimeContext};
use crate::core::{GenerationArena, GenerationId};
use std::sync::{Arc, Mutex, MutexGuard};

/// 对象模型的显式构造函数
pub type ModelFactory<T> = Arc<dyn Fn(Arc<dyn RuntimeContext>) -> NativeObjectModel<T> + Send + Sync>;

/// 按代际存放的对象模型
pub type ModelArena<T> = Arc<Mutex<GenerationArena<Arc<NativeObjectModel<T>>>>>;

/// 默认工厂：使用标准模块名构造
pub fn default_model_factory<T: ModelValue>() -> ModelFactory<T> {
    Arc::new(NativeObjectModel::<T>::new)
}

pub(crate) fn lock_arena<T>(
    arena: &Mutex<GenerationArena<Arc<NativeObjectModel<T>>>>,
) -> MutexGuard<'_, GenerationArena<Arc<NativeObjectModel<T>>>> {
    arena.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ObjectModelRegistrar<T> {
    generation: GenerationId,
    arena: ModelArena<T>,
    factory: ModelFactory<T>,
}

impl<T: ModelValue> ObjectModelRegistrar<T> {
    pub fn new(generation: GenerationId, arena: ModelArena<T>, factory: ModelFactory<T>) -> Self {
        Self {
            generation,
            arena,
            factory,
        }
    }

    pub fn generation(&self) -> GenerationId {
        self.generation
    }

    /// 本代际当前的对象模型（上下文尚未构造时为 `None`）
    pub fn native_object_model(&self) -> Option<Arc<NativeObjectModel<T>>> {
        lock_arena(&self.arena).get(self.generation).cloned()
    }
}

impl<T: ModelValue> ModuleRegistrar for ObjectModelRegistrar<T> {
    fn create_native_modules(&self, context: &Arc<dyn RuntimeContext>) -> Vec<Arc<dyn NativeModule>> {
        let model = Arc::new((self.factory)(Arc::clone(context)));
        let replaced = lock_arena(&self.arena).insert(self.generation, Arc::clone(&model));
        if replaced.is_some() {
            // 同一代际内上下文被重建（开发者重载）
            tracing::debug!(target: "bindings", generation = %self.generation, "Replaced object model");
        }
        vec![model as Arc<dyn NativeModule>]
    }
}
