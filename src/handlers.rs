//! Built-in record handlers.
//!
//! - [`EscapeWatcher`] is the keyboard handler: an `EV_KEY` press (or
//!   autorepeat) of `KEY_ESC` ends the loop.
//! - [`RecordLogger`] writes every record it sees to the `debug` log, one
//!   line per record, prefixed with the category it was routed as.
//!
//! [`standard_bus`] wires them up the way the binary uses them.

use crate::category::DeviceCategory;
use crate::codes::{EV_SYN, KEY_ESC};
use crate::eventbus::{Flow, RecordBus, RecordListener};
use crate::filtered_listener::FilteredListener;
use crate::metadata::DeviceMeta;
use crate::record::RawEvent;
use log::{debug, info};

/// Keyboard handler watching for the escape key.
#[derive(Debug, Default)]
pub struct EscapeWatcher;

impl EscapeWatcher {
    pub fn new() -> Self {
        EscapeWatcher
    }
}

impl RecordListener for EscapeWatcher {
    fn on_record(&mut self, device: &DeviceMeta, record: &RawEvent) -> Flow {
        if record.is_key_down(KEY_ESC) {
            info!("{}: escape pressed", device.label());
            Flow::Terminate
        } else {
            Flow::Continue
        }
    }
}

/// Logs records routed as one category.
#[derive(Debug)]
pub struct RecordLogger {
    kind: &'static str,
}

impl RecordLogger {
    pub fn new(category: DeviceCategory) -> Self {
        let kind = match category {
            c if c == DeviceCategory::KEYBOARD => "keyboard",
            c if c == DeviceCategory::MOUSE => "mouse",
            c if c == DeviceCategory::TOUCHPAD => "touchpad",
            c if c == DeviceCategory::GAMEPAD => "gamepad",
            _ => "input",
        };
        Self { kind }
    }
}

impl RecordListener for RecordLogger {
    fn on_record(&mut self, device: &DeviceMeta, record: &RawEvent) -> Flow {
        debug!("[{}] {}: {record}", self.kind, device.label());
        Flow::Continue
    }
}

/// Escape watcher on keyboards plus a logger per category.
///
/// `EV_SYN` records are kept out of the logs unless `trace_sync` is set.
pub fn standard_bus(trace_sync: bool) -> RecordBus {
    let mut bus = RecordBus::new();
    bus.add_listener(EscapeWatcher::new(), DeviceCategory::KEYBOARD, None);

    for category in [
        DeviceCategory::KEYBOARD,
        DeviceCategory::MOUSE,
        DeviceCategory::TOUCHPAD,
        DeviceCategory::GAMEPAD,
    ] {
        let logger = RecordLogger::new(category);
        if trace_sync {
            bus.add_listener(logger, category, None);
        } else {
            bus.add_listener(
                FilteredListener::new(|r: &RawEvent| r.ty != EV_SYN, logger),
                category,
                None,
            );
        }
    }

    bus
}
