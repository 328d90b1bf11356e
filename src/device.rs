//! Device sources and the owned handles built from them.
//!
//! An [`EventSource`] is an open device node: a pollable file descriptor, a
//! byte stream of raw records, a capability control channel and a grab switch.
//! Backends implement it (`backends::linux` for real evdev nodes,
//! `backends::virtual_input` for socket-backed test devices).
//!
//! A [`DeviceHandle`] pairs a source with its probed capabilities and assigned
//! [`DeviceCategory`]. Handles are owned by the registry; [`DeviceHandle::release`]
//! drops the grab and closes the source exactly once, and `Drop` does the same
//! for handles that never got an explicit release.

use crate::capabilities::{CapabilityQuery, CapabilitySet};
use crate::category::DeviceCategory;
use crate::metadata::DeviceMeta;
use log::{debug, warn};
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

/// An open input device node.
pub trait EventSource: CapabilityQuery + AsRawFd {
    /// Non-blocking read of raw record bytes.
    ///
    /// `Err(WouldBlock)` means no data right now.
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Claim (`true`) or release (`false`) exclusive delivery of this device's events.
    fn set_grab(&mut self, grab: bool) -> io::Result<()>;

    /// Best-effort metadata for this node.
    fn meta(&self) -> DeviceMeta;
}

/// Owned, classified device held by the registry.
pub struct DeviceHandle {
    meta: DeviceMeta,
    capabilities: CapabilitySet,
    category: DeviceCategory,
    grabbed: bool,
    source: Option<Box<dyn EventSource>>,
}

impl DeviceHandle {
    pub fn new(
        source: Box<dyn EventSource>,
        meta: DeviceMeta,
        capabilities: CapabilitySet,
        category: DeviceCategory,
        grabbed: bool,
    ) -> Self {
        Self {
            meta,
            capabilities,
            category,
            grabbed,
            source: Some(source),
        }
    }

    pub fn meta(&self) -> &DeviceMeta {
        &self.meta
    }

    pub fn label(&self) -> &str {
        self.meta.label()
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn category(&self) -> DeviceCategory {
        self.category
    }

    /// Whether this process currently holds the exclusive grab.
    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Whether [`release`](Self::release) has already run.
    pub fn is_released(&self) -> bool {
        self.source.is_none()
    }

    /// File descriptor for polling, or `None` once released.
    pub fn raw_fd(&self) -> Option<RawFd> {
        self.source.as_ref().map(|s| s.as_raw_fd())
    }

    /// Read into `buf`. Fails with `NotConnected` after release.
    pub fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.source.as_mut() {
            Some(source) => source.read_raw(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "device handle already released",
            )),
        }
    }

    /// Drop the grab (if held) and close the node. Later calls are no-ops.
    pub fn release(&mut self) {
        let Some(mut source) = self.source.take() else {
            return;
        };

        if self.grabbed {
            if let Err(e) = source.set_grab(false) {
                warn!("{}: releasing grab failed: {e}", self.meta.label());
            }
            self.grabbed = false;
        }

        drop(source);
        debug!("{}: closed", self.meta.label());
    }
}

impl Drop for DeviceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("meta", &self.meta)
            .field("category", &self.category)
            .field("grabbed", &self.grabbed)
            .field("released", &self.is_released())
            .finish()
    }
}
