//! Linux input code spaces.
//!
//! Numeric values mirror `<linux/input-event-codes.h>`. Only the codes this crate
//! classifies or dispatches on are named here; everything else is handled as a
//! raw `u16` index into the relevant capability bit-set.

/// Event type constants.
pub const EV_SYN: u16 = 0x00;
pub const EV_KEY: u16 = 0x01;
pub const EV_REL: u16 = 0x02;
pub const EV_ABS: u16 = 0x03;
pub const EV_MSC: u16 = 0x04;
pub const EV_SW: u16 = 0x05;
pub const EV_LED: u16 = 0x11;
pub const EV_SND: u16 = 0x12;
pub const EV_REP: u16 = 0x14;
pub const EV_FF: u16 = 0x15;

/// Highest code of each class. Bit-set lengths are `MAX + 1` bits.
pub const EV_MAX: u16 = 0x1f;
pub const ABS_MAX: u16 = 0x3f;
pub const REL_MAX: u16 = 0x0f;
pub const KEY_MAX: u16 = 0x2ff;

/// Synchronization codes.
pub const SYN_REPORT: u16 = 0x00;

/// Absolute axes.
pub const ABS_X: u16 = 0x00;
pub const ABS_Y: u16 = 0x01;

/// Relative axes.
pub const REL_X: u16 = 0x00;
pub const REL_Y: u16 = 0x01;

/// Keys.
pub const KEY_ESC: u16 = 1;
pub const KEY_1: u16 = 2;
pub const KEY_0: u16 = 11;

/// Buttons.
pub const BTN_MOUSE: u16 = 0x110;
pub const BTN_LEFT: u16 = 0x110;
pub const BTN_JOYSTICK: u16 = 0x120;
pub const BTN_TRIGGER: u16 = 0x120;
pub const BTN_GAMEPAD: u16 = 0x130;
pub const BTN_SOUTH: u16 = 0x130;
pub const BTN_TOOL_PEN: u16 = 0x140;
pub const BTN_TOOL_FINGER: u16 = 0x145;
pub const BTN_TOUCH: u16 = 0x14a;
pub const BTN_STYLUS: u16 = 0x14b;

/// `EV_KEY` values.
pub const KEY_RELEASED: i32 = 0;
pub const KEY_PRESSED: i32 = 1;
pub const KEY_REPEATED: i32 = 2;

/// Digit-row keys, `KEY_1` through `KEY_0` (contiguous in the kernel table).
pub const DIGIT_ROW: std::ops::RangeInclusive<u16> = KEY_1..=KEY_0;

/// Short symbolic name for an event type, when it is one we know.
pub fn event_type_name(ty: u16) -> Option<&'static str> {
    Some(match ty {
        EV_SYN => "EV_SYN",
        EV_KEY => "EV_KEY",
        EV_REL => "EV_REL",
        EV_ABS => "EV_ABS",
        EV_MSC => "EV_MSC",
        EV_SW => "EV_SW",
        EV_LED => "EV_LED",
        EV_SND => "EV_SND",
        EV_REP => "EV_REP",
        EV_FF => "EV_FF",
        _ => return None,
    })
}
