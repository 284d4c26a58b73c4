use crate::core::{BindingError, BindingResult};
use std::convert::TryFrom;

/// 指针/触摸事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchEventType {
    Start,
    End,
    Move,
    Cancel,
    Entered,
    Exited,
    Wheel,
}

impl TouchEventType {
    /// 脚本侧注册的事件名
    pub fn js_event_name(self) -> &'static str {
        match self {
            TouchEventType::Start => "topTouchStart",
            TouchEventType::End => "topTouchEnd",
            TouchEventType::Move => "topTouchMove",
            TouchEventType::Cancel => "topTouchCancel",
            TouchEventType::Entered => "topMouseOver",
            TouchEventType::Exited => "topMouseOut",
            TouchEventType::Wheel => "topWheelChanged",
        }
    }
}

impl TryFrom<u32> for TouchEventType {
    type Error = BindingError;

    fn try_from(code: u32) -> BindingResult<Self> {
        match code {
            0 => Ok(TouchEventType::Start),
            1 => Ok(TouchEventType::End),
            2 => Ok(TouchEventType::Move),
            3 => Ok(TouchEventType::Cancel),
            4 => Ok(TouchEventType::Entered),
            5 => Ok(TouchEventType::Exited),
            6 => Ok(TouchEventType::Wheel),
            other => Err(BindingError::unsupported("touch event type", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(TouchEventType::Start.js_event_name(), "topTouchStart");
        assert_eq!(TouchEventType::Entered.js_event_name(), "topMouseOver");
        assert_eq!(TouchEventType::Wheel.js_event_name(), "topWheelChanged");
    }

    #[test]
    fn test_raw_codes() {
        assert_eq!(TouchEventType::try_from(3), Ok(TouchEventType::Cancel));
        assert_eq!(
            TouchEventType::try_from(7),
            Err(BindingError::unsupported("touch event type", 7))
        );
    }
}
