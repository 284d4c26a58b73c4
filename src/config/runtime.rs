use super::{ConfigError, ConfigResult};
use crate::bindings::LifecycleState;
use crate::core::RuntimeResult;
use crate::impl_default;
use crate::runtime::ScriptExecutor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// 脚本执行器工厂
///
/// 替代按类型反射构造执行器：调用方在配置时提供显式的构造函数。
pub type ExecutorFactory = Arc<dyn Fn() -> RuntimeResult<Box<dyn ScriptExecutor>> + Send + Sync>;

/// 运行时配置（可序列化部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// 是否启用开发者模式（远程调试、开发菜单、热重载）
    pub developer_mode_enabled: bool,

    /// 自定义脚本包路径
    pub bundle_file_path: Option<PathBuf>,

    /// 主模块名称，开发者模式下用于定位打包服务器上的入口
    pub main_module_name: String,

    /// 脚本侧注册的主组件名称
    pub main_component_name: String,
}

impl_default!(RuntimeSettings {
    developer_mode_enabled: false,
    bundle_file_path: None,
    main_module_name: "index.windows".to_string(),
    main_component_name: String::new(),
});

impl RuntimeSettings {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.main_component_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "main_component_name must not be empty".to_string(),
            ));
        }
        if self.main_module_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "main_module_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// 单个运行时管理器的不可变构建配置
///
/// 每次 `CreateNewInstance` 从当前设置重新生成一份，构建完成后交由管理器持有。
#[derive(Clone)]
pub struct RuntimeConfiguration {
    pub developer_mode_enabled: bool,
    pub bundle_file_path: Option<PathBuf>,
    pub main_module_name: String,
    pub executor_factory: Option<ExecutorFactory>,
    pub initial_lifecycle_state: LifecycleState,
}

impl RuntimeConfiguration {
    pub fn from_settings(settings: &RuntimeSettings, executor_factory: Option<ExecutorFactory>) -> Self {
        Self {
            developer_mode_enabled: settings.developer_mode_enabled,
            bundle_file_path: settings.bundle_file_path.clone(),
            main_module_name: settings.main_module_name.clone(),
            executor_factory,
            initial_lifecycle_state: LifecycleState::BeforeCreate,
        }
    }
}

impl fmt::Debug for RuntimeConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfiguration")
            .field("developer_mode_enabled", &self.developer_mode_enabled)
            .field("bundle_file_path", &self.bundle_file_path)
            .field("main_module_name", &self.main_module_name)
            .field("executor_factory", &self.executor_factory.is_some())
            .field("initial_lifecycle_state", &self.initial_lifecycle_state)
            .finish()
    }
}
