//! Per-category record routing.
//!
//! Handlers register with a [`DeviceCategory`] filter. Each record read from a
//! device is offered to every enabled handler whose filter intersects the
//! device's category, in registration order, so a device that is both a
//! keyboard and a mouse reaches keyboard and mouse handlers alike. Devices with
//! an empty category reach nobody.

use crate::category::DeviceCategory;
use crate::metadata::DeviceMeta;
use crate::record::RawEvent;
use std::collections::BTreeMap;

/// What the loop should do after a handler has seen a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Terminate,
}

/// Trait for reacting to decoded records from a device.
pub trait RecordListener {
    fn on_record(&mut self, device: &DeviceMeta, record: &RawEvent) -> Flow;
}

/// Listener plus its routing flags.
struct ListenerEntry {
    listener: Box<dyn RecordListener>,
    enabled: bool,
    filter: DeviceCategory,
    tag: Option<String>, // Optional device path
}

/// Registry of handlers keyed by registration id.
#[derive(Default)]
pub struct RecordBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl RecordBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for devices in `filter`, optionally pinned to one device path.
    pub fn add_listener(
        &mut self,
        listener: impl RecordListener + 'static,
        filter: DeviceCategory,
        tag: Option<String>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                tag,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Offers one record to all matching listeners.
    ///
    /// Every matching listener sees the record even if an earlier one asked to
    /// terminate; the strongest request wins.
    pub fn emit(&mut self, device: &DeviceMeta, category: DeviceCategory, record: &RawEvent) -> Flow {
        let mut flow = Flow::Continue;

        for entry in self.listeners.values_mut() {
            if !entry.enabled || !entry.filter.intersects(category) {
                continue;
            }

            if let Some(ref wanted) = entry.tag {
                if device.path != *wanted {
                    continue;
                }
            }

            if entry.listener.on_record(device, record) == Flow::Terminate {
                flow = Flow::Terminate;
            }
        }

        flow
    }
}
