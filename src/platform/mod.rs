pub mod headless;
pub mod touch;

pub use headless::{HeadlessHost, HeadlessRootView};
pub use touch::TouchEventType;

use crate::core::{BindingError, BindingResult, RuntimeResult};
use crate::runtime::RuntimeManager;
use serde_json::Value;
use std::fmt;

// ============================================================================
// Root View Abstraction
// ============================================================================

/// 宿主UI树中承载脚本内容的原生视图
pub trait RootView {
    /// 作为宿主内容挂载
    fn attach(&mut self);

    /// 从宿主UI树卸载
    fn detach(&mut self);

    fn is_attached(&self) -> bool;

    fn set_background(&mut self, theme: &Theme);

    /// 把命名的主组件绑定到运行时管理器并启动
    fn start_application(
        &mut self,
        manager: &mut dyn RuntimeManager,
        component_name: &str,
        initial_props: Option<&Value>,
    ) -> RuntimeResult<()>;
}

/// 宿主主题背景
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub resource_key: String,
    pub background: [u8; 4],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            resource_key: "ApplicationPageBackgroundThemeBrush".to_string(),
            background: [255, 255, 255, 255],
        }
    }
}

// ============================================================================
// Host Environment Abstraction
// ============================================================================

/// 宿主事件来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostEventSource {
    /// 全局加速键（按下/抬起）事件
    KeyEvents,
    /// 系统返回导航请求
    BackRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// 控制器所依赖的宿主环境能力
pub trait HostEnvironment {
    fn background_theme(&self) -> Theme;

    /// 订阅宿主事件，宿主之后把该来源的事件投递给控制器
    fn subscribe(&mut self, source: HostEventSource) -> SubscriptionId;

    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// 返回导航请求参数，可被标记为已处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackRequestedArgs {
    pub handled: bool,
}

// ============================================================================
// Input Abstraction
// ============================================================================

/// 虚拟键码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    Shift,
    Control,
    /// Alt 键
    Menu,
    F10,
    R,
    Other(u32),
}

impl VirtualKey {
    pub const SHIFT: u32 = 0x10;
    pub const CONTROL: u32 = 0x11;
    pub const MENU: u32 = 0x12;
    pub const R_KEY: u32 = 0x52;
    pub const F10_KEY: u32 = 0x79;

    pub fn from_raw(code: u32) -> Self {
        match code {
            Self::SHIFT => Self::Shift,
            Self::CONTROL => Self::Control,
            Self::MENU => Self::Menu,
            Self::R_KEY => Self::R,
            Self::F10_KEY => Self::F10,
            other => Self::Other(other),
        }
    }
}

/// 加速键事件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Character,
    DeadCharacter,
    KeyDown,
    KeyUp,
    SystemCharacter,
    SystemDeadCharacter,
    SystemKeyDown,
    SystemKeyUp,
    UnicodeCharacter,
}

impl KeyEventKind {
    /// 从宿主的原始分类码解析，未知分类码直接失败
    pub fn from_raw(code: u32) -> BindingResult<Self> {
        match code {
            0 => Ok(Self::Character),
            1 => Ok(Self::DeadCharacter),
            2 => Ok(Self::KeyDown),
            3 => Ok(Self::KeyUp),
            4 => Ok(Self::SystemCharacter),
            5 => Ok(Self::SystemDeadCharacter),
            6 => Ok(Self::SystemKeyDown),
            7 => Ok(Self::SystemKeyUp),
            8 => Ok(Self::UnicodeCharacter),
            other => Err(BindingError::unsupported("key event kind", other)),
        }
    }

    /// 物理按键的按下/抬起方向；字符类事件没有方向
    pub fn transition(self) -> Option<KeyTransition> {
        match self {
            Self::KeyDown | Self::SystemKeyDown => Some(KeyTransition::Down),
            Self::KeyUp | Self::SystemKeyUp => Some(KeyTransition::Up),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTransition {
    Down,
    Up,
}

/// 宿主输入源投递的按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: VirtualKey,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn new(key: VirtualKey, kind: KeyEventKind) -> Self {
        Self { key, kind }
    }

    pub fn down(key: VirtualKey) -> Self {
        Self::new(key, KeyEventKind::KeyDown)
    }

    pub fn up(key: VirtualKey) -> Self {
        Self::new(key, KeyEventKind::KeyUp)
    }

    pub fn from_raw(key: u32, kind: u32) -> BindingResult<Self> {
        Ok(Self::new(VirtualKey::from_raw(key), KeyEventKind::from_raw(kind)?))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.key, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_key_codes() {
        assert_eq!(VirtualKey::from_raw(0x10), VirtualKey::Shift);
        assert_eq!(VirtualKey::from_raw(0x79), VirtualKey::F10);
        assert_eq!(VirtualKey::from_raw(0x41), VirtualKey::Other(0x41));
    }

    #[test]
    fn test_unknown_event_kind_fails_fast() {
        let err = KeyEventKind::from_raw(42).unwrap_err();
        assert_eq!(err, BindingError::unsupported("key event kind", 42));
        assert!(KeyEvent::from_raw(0x52, 3).is_ok());
    }

    #[test]
    fn test_raw_event_matches_constructed_event() {
        // 修饰键状态由状态机跟踪，事件本身只携带键和分类
        assert_eq!(KeyEvent::from_raw(0x52, 3).unwrap(), KeyEvent::up(VirtualKey::R));
        assert_eq!(KeyEvent::from_raw(0x79, 6).unwrap(), KeyEvent::new(VirtualKey::F10, KeyEventKind::SystemKeyDown));
    }

    #[test]
    fn test_transitions() {
        assert_eq!(KeyEventKind::SystemKeyDown.transition(), Some(KeyTransition::Down));
        assert_eq!(KeyEventKind::KeyUp.transition(), Some(KeyTransition::Up));
        assert_eq!(KeyEventKind::Character.transition(), None);
    }
}
