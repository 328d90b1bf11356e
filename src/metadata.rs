//! Identity of an opened input node.
//!
//! [`DeviceMeta`] carries what the kernel tells us about a node beyond its
//! capabilities: the driver name and the `input_id` quadruple. It is what log
//! lines print and what `--list` reports per device.
//!
//! # Conventions
//! - `path` is the device node the handle was opened from (e.g. `/dev/input/event3`).
//! - `name` is the driver-reported name; an empty name is stored as `None`.
//! - `bus`/`vendor`/`product`/`version` are the node's `input_id`. Virtual
//!   devices leave them `None`.
//!
//! `path` is assigned by the kernel in probe order and can change across boots
//! and replugs; treat it as diagnostic first, identity second.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of metadata describing a single device node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Node path the device was opened from.
    pub path: String,

    /// Human-readable name from the driver.
    pub name: Option<String>,

    /// Bus type (`BUS_USB` = 0x03, `BUS_BLUETOOTH` = 0x05, ...), if known.
    pub bus: Option<u16>,

    /// Vendor ID, if known.
    pub vendor: Option<u16>,

    /// Product ID, if known.
    pub product: Option<u16>,

    /// Version reported by the driver, if known.
    pub version: Option<u16>,
}

impl DeviceMeta {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Name for log lines: driver name when known, otherwise the path.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

impl fmt::Display for DeviceMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.path)?,
            None => f.write_str(&self.path)?,
        }
        if let (Some(v), Some(p)) = (self.vendor, self.product) {
            write!(f, " [{v:04x}:{p:04x}]")?;
        }
        Ok(())
    }
}
