//! 开发者按键状态机
//!
//! 跟踪 Shift/Control 的按下状态并识别两组组合键：
//! - Shift+F10 或 Alt 按下时显示开发菜单（按下即触发）
//! - 按住 Control 时 R 键抬起触发重载（需要完整的按下-抬起）
//!
//! 开发者模式关闭时状态机不做任何事。

use crate::platform::{KeyEvent, KeyTransition, VirtualKey};

/// 组合键触发的开发者动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevAction {
    ShowDevMenu,
    ForceReload,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevInputStateMachine {
    shift_down: bool,
    control_down: bool,
}

impl DevInputStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift_down(&self) -> bool {
        self.shift_down
    }

    pub fn control_down(&self) -> bool {
        self.control_down
    }

    /// 处理一个按键事件，返回应当触发的动作
    pub fn process(&mut self, developer_mode: bool, event: &KeyEvent) -> Option<DevAction> {
        if !developer_mode {
            return None;
        }

        // 字符类事件不代表物理按键方向
        let transition = event.kind.transition()?;
        let down = transition == KeyTransition::Down;

        match event.key {
            VirtualKey::Shift => {
                self.shift_down = down;
                None
            }
            VirtualKey::Control => {
                self.control_down = down;
                None
            }
            VirtualKey::F10 if down && self.shift_down => Some(DevAction::ShowDevMenu),
            VirtualKey::Menu if down => Some(DevAction::ShowDevMenu),
            VirtualKey::R if !down && self.control_down => Some(DevAction::ForceReload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::KeyEventKind;
    use proptest::prelude::*;

    #[test]
    fn test_shift_f10_opens_menu_on_key_down() {
        let mut machine = DevInputStateMachine::new();
        assert_eq!(machine.process(true, &KeyEvent::down(VirtualKey::Shift)), None);
        assert_eq!(
            machine.process(true, &KeyEvent::down(VirtualKey::F10)),
            Some(DevAction::ShowDevMenu)
        );
        assert_eq!(machine.process(true, &KeyEvent::up(VirtualKey::F10)), None);
    }

    #[test]
    fn test_f10_without_shift_is_ignored() {
        let mut machine = DevInputStateMachine::new();
        assert_eq!(machine.process(true, &KeyEvent::down(VirtualKey::F10)), None);
    }

    #[test]
    fn test_alt_repeats_retrigger() {
        let mut machine = DevInputStateMachine::new();
        for _ in 0..3 {
            assert_eq!(
                machine.process(true, &KeyEvent::down(VirtualKey::Menu)),
                Some(DevAction::ShowDevMenu)
            );
        }
        let system_down = KeyEvent::new(VirtualKey::Menu, KeyEventKind::SystemKeyDown);
        assert_eq!(machine.process(true, &system_down), Some(DevAction::ShowDevMenu));
    }

    #[test]
    fn test_ctrl_r_fires_on_key_up_only() {
        let mut machine = DevInputStateMachine::new();
        machine.process(true, &KeyEvent::down(VirtualKey::Control));
        assert_eq!(machine.process(true, &KeyEvent::down(VirtualKey::R)), None);
        assert_eq!(
            machine.process(true, &KeyEvent::up(VirtualKey::R)),
            Some(DevAction::ForceReload)
        );

        machine.process(true, &KeyEvent::up(VirtualKey::Control));
        assert_eq!(machine.process(true, &KeyEvent::up(VirtualKey::R)), None);
    }

    #[test]
    fn test_inert_when_developer_mode_disabled() {
        let mut machine = DevInputStateMachine::new();
        assert_eq!(machine.process(false, &KeyEvent::down(VirtualKey::Shift)), None);
        assert!(!machine.shift_down());
        assert_eq!(machine.process(false, &KeyEvent::down(VirtualKey::Menu)), None);
    }

    #[test]
    fn test_character_events_do_not_touch_flags() {
        let mut machine = DevInputStateMachine::new();
        let event = KeyEvent::new(VirtualKey::Shift, KeyEventKind::Character);
        assert_eq!(machine.process(true, &event), None);
        assert!(!machine.shift_down());
    }

    fn key_strategy() -> impl Strategy<Value = VirtualKey> {
        prop_oneof![
            Just(VirtualKey::Shift),
            Just(VirtualKey::Control),
            Just(VirtualKey::Menu),
            Just(VirtualKey::F10),
            Just(VirtualKey::R),
            (0x41u32..0x5a).prop_map(VirtualKey::Other),
        ]
    }

    fn event_strategy() -> impl Strategy<Value = KeyEvent> {
        (key_strategy(), any::<bool>()).prop_map(|(key, down)| {
            if down {
                KeyEvent::down(key)
            } else {
                KeyEvent::up(key)
            }
        })
    }

    proptest! {
        #[test]
        fn flags_track_last_transition(events in proptest::collection::vec(event_strategy(), 0..64)) {
            let mut machine = DevInputStateMachine::new();
            let mut shift = false;
            let mut control = false;
            for event in &events {
                let down = event.kind == KeyEventKind::KeyDown;
                match event.key {
                    VirtualKey::Shift => shift = down,
                    VirtualKey::Control => control = down,
                    _ => {}
                }
                machine.process(true, event);
            }
            prop_assert_eq!(machine.shift_down(), shift);
            prop_assert_eq!(machine.control_down(), control);
        }

        #[test]
        fn triggers_match_chords(events in proptest::collection::vec(event_strategy(), 0..64)) {
            let mut machine = DevInputStateMachine::new();
            for event in &events {
                let shift = machine.shift_down();
                let control = machine.control_down();
                let down = event.kind == KeyEventKind::KeyDown;
                let expected = match event.key {
                    VirtualKey::F10 if down && shift => Some(DevAction::ShowDevMenu),
                    VirtualKey::Menu if down => Some(DevAction::ShowDevMenu),
                    VirtualKey::R if !down && control => Some(DevAction::ForceReload),
                    _ => None,
                };
                prop_assert_eq!(machine.process(true, event), expected);
            }
        }

        #[test]
        fn disabled_never_fires(events in proptest::collection::vec(event_strategy(), 0..64)) {
            let mut machine = DevInputStateMachine::new();
            for event in &events {
                prop_assert_eq!(machine.process(false, event), None);
            }
        }
    }
}
