//! Device categories and the classifier.
//!
//! Classification is a pure function of a [`CapabilitySet`]. The same bit
//! pattern can plausibly mean a mouse, a touchpad or a tablet, so the pointer
//! checks run in a fixed priority order and the first match wins.
//!
//! ## Rules, in order
//! 1. `EV_KEY` with any digit-row key (`KEY_1`..`KEY_0`) → [`DeviceCategory::KEYBOARD`].
//! 2. `EV_ABS` with `ABS_X` and `ABS_Y`, unioned in, first match wins:
//!    stylus or pen tool → `TOUCHPAD`; finger tool without pen tool → `TOUCHPAD`;
//!    `BTN_MOUSE` → `MOUSE`; `BTN_TOUCH` → `TOUCHPAD`.
//!    Otherwise `EV_REL` with `REL_X`, `REL_Y` and `BTN_MOUSE` → `MOUSE`.
//! 3. `BTN_JOYSTICK` → `GAMEPAD`.
//! 4. `BTN_GAMEPAD` → `GAMEPAD`.
//!
//! Rules 3 and 4 replace whatever rules 1 and 2 produced under
//! [`GamepadPrecedence::Override`] (the default), so a keyboard that also
//! carries gamepad buttons is classified as a gamepad only.

use crate::capabilities::CapabilitySet;
use crate::codes::*;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Semantic device category. A device may hold several.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DeviceCategory: u8 {
        const KEYBOARD = 1 << 0;
        const MOUSE = 1 << 1;
        /// Touchpad, tablet or touchscreen.
        const TOUCHPAD = 1 << 2;
        const GAMEPAD = 1 << 3;
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("unclassified");
        }
        let names: Vec<&str> = self.iter_names().map(|(n, _)| n).collect();
        f.write_str(&names.join("|").to_lowercase())
    }
}

/// How joystick/gamepad buttons combine with keyboard/pointer results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamepadPrecedence {
    /// Gamepad replaces any earlier category.
    #[default]
    Override,
    /// Gamepad is added alongside earlier categories.
    Union,
}

/// Classify with the default [`GamepadPrecedence::Override`] policy.
pub fn classify(caps: &CapabilitySet) -> DeviceCategory {
    classify_with(caps, GamepadPrecedence::Override)
}

/// Classify a probed device.
pub fn classify_with(caps: &CapabilitySet, precedence: GamepadPrecedence) -> DeviceCategory {
    let ev = &caps.event_types;
    let keys = &caps.keys;
    let mut category = DeviceCategory::empty();

    if ev.contains(EV_KEY) && keys.contains_any(DIGIT_ROW) {
        category = DeviceCategory::KEYBOARD;
    }

    if ev.contains(EV_ABS) && caps.absolute_axes.contains(ABS_X) && caps.absolute_axes.contains(ABS_Y)
    {
        if let Some(pointer) = absolute_pointer_kind(caps) {
            category |= pointer;
        }
    } else if ev.contains(EV_REL)
        && caps.relative_axes.contains(REL_X)
        && caps.relative_axes.contains(REL_Y)
        && keys.contains(BTN_MOUSE)
    {
        category |= DeviceCategory::MOUSE;
    }

    if keys.contains(BTN_JOYSTICK) || keys.contains(BTN_GAMEPAD) {
        category = match precedence {
            GamepadPrecedence::Override => DeviceCategory::GAMEPAD,
            GamepadPrecedence::Union => category | DeviceCategory::GAMEPAD,
        };
    }

    category
}

fn absolute_pointer_kind(caps: &CapabilitySet) -> Option<DeviceCategory> {
    let keys = &caps.keys;
    let pen = keys.contains(BTN_TOOL_PEN);

    if keys.contains(BTN_STYLUS) || pen {
        Some(DeviceCategory::TOUCHPAD)
    } else if keys.contains(BTN_TOOL_FINGER) {
        Some(DeviceCategory::TOUCHPAD)
    } else if keys.contains(BTN_MOUSE) {
        Some(DeviceCategory::MOUSE)
    } else if keys.contains(BTN_TOUCH) {
        Some(DeviceCategory::TOUCHPAD)
    } else {
        None
    }
}
