//! Socket-backed virtual devices.
//!
//! A [`VirtualDevice`] stands in for an evdev node without touching `/dev/input`.
//! Its readable end is one half of a Unix stream socket pair, so it has a real
//! file descriptor that the dispatch loop polls and reads exactly like a kernel
//! node. The other half is a [`VirtualFeeder`] used to inject encoded records.
//!
//! Capabilities are fixed at construction; individual classes can be made to
//! fail their query to exercise degraded probing. [`VirtualOpener`] plays the
//! role of the node opener for the enumerator.

use crate::capabilities::{CapabilityClass, CapabilityQuery, CapabilitySet};
use crate::device::EventSource;
use crate::enumerate::NodeOpener;
use crate::metadata::DeviceMeta;
use crate::record::RawEvent;
use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Readable end of a virtual device.
pub struct VirtualDevice {
    meta: DeviceMeta,
    caps: CapabilitySet,
    failing: Vec<CapabilityClass>,
    reject_grab: bool,
    grabbed: Arc<AtomicBool>,
    stream: UnixStream,
}

/// Writable end of a virtual device.
pub struct VirtualFeeder {
    stream: UnixStream,
    grabbed: Arc<AtomicBool>,
}

impl VirtualDevice {
    /// Create a connected device/feeder pair.
    pub fn pair(path: &str, caps: CapabilitySet) -> io::Result<(VirtualDevice, VirtualFeeder)> {
        let (reader, writer) = UnixStream::pair()?;
        reader.set_nonblocking(true)?;
        writer.set_nonblocking(true)?;
        let grabbed = Arc::new(AtomicBool::new(false));

        let mut meta = DeviceMeta::new(path);
        meta.name = Some(format!("Virtual {path}"));

        Ok((
            VirtualDevice {
                meta,
                caps,
                failing: Vec::new(),
                reject_grab: false,
                grabbed: grabbed.clone(),
                stream: reader,
            },
            VirtualFeeder {
                stream: writer,
                grabbed,
            },
        ))
    }

    /// Make the capability query for `class` fail.
    pub fn fail_probe(mut self, class: CapabilityClass) -> Self {
        self.failing.push(class);
        self
    }

    /// Make grab requests fail (device busy).
    pub fn reject_grab(mut self) -> Self {
        self.reject_grab = true;
        self
    }
}

impl AsRawFd for VirtualDevice {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

impl CapabilityQuery for VirtualDevice {
    fn query_bits(&self, class: CapabilityClass, bits: &mut [u8]) -> io::Result<()> {
        if self.failing.contains(&class) {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }
        let src = self.caps.get(class).as_bytes();
        let n = src.len().min(bits.len());
        bits[..n].copy_from_slice(&src[..n]);
        Ok(())
    }
}

impl EventSource for VirtualDevice {
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }

    fn set_grab(&mut self, grab: bool) -> io::Result<()> {
        if grab && self.reject_grab {
            return Err(io::Error::from_raw_os_error(libc::EBUSY));
        }
        self.grabbed.store(grab, Ordering::SeqCst);
        Ok(())
    }

    fn meta(&self) -> DeviceMeta {
        self.meta.clone()
    }
}

impl VirtualFeeder {
    /// Write one encoded record.
    pub fn send(&mut self, event: RawEvent) -> io::Result<()> {
        self.stream.write_all(&event.encode())
    }

    /// Write arbitrary bytes (for partial-record cases).
    pub fn send_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stream.write_all(bytes)
    }

    /// Whether the device side currently holds a grab.
    pub fn is_grabbed(&self) -> bool {
        self.grabbed.load(Ordering::SeqCst)
    }

    /// Whether the device side has been closed.
    pub fn is_closed(&mut self) -> bool {
        let mut probe = [0u8; 1];
        matches!(self.stream.read(&mut probe), Ok(0))
    }
}

/// Node opener over a fixed set of virtual devices, keyed by path.
///
/// Paths with no device fail to open with `NotFound`.
#[derive(Default)]
pub struct VirtualOpener {
    devices: HashMap<PathBuf, VirtualDevice>,
}

impl VirtualOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `device` under its own path.
    pub fn insert(&mut self, device: VirtualDevice) {
        self.devices.insert(PathBuf::from(&device.meta.path), device);
    }
}

impl NodeOpener for VirtualOpener {
    fn open(&mut self, path: &Path) -> io::Result<Box<dyn EventSource>> {
        match self.devices.remove(path) {
            Some(dev) => Ok(Box::new(dev)),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no virtual device at {}", path.display()),
            )),
        }
    }
}
