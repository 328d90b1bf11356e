//! Linux evdev node wrapper.
//!
//! [`EvdevNode`] owns one `/dev/input/event*` node opened through the `evdev`
//! crate. It is responsible for:
//! - answering capability queries from the bitmaps `evdev` read at open
//! - claiming and releasing the exclusive grab
//! - raw non-blocking reads of the record stream
//!
//! It does **not** decode records or classify; that is the dispatch loop's and
//! the classifier's job. Closing happens when the node is dropped.
//!
//! Raw reads go through a duplicate of the device descriptor rather than
//! `fetch_events`, so the loop sees the kernel's byte stream (and any short
//! read) unmodified. Both descriptors share one open file description, so the
//! grab and the non-blocking flag apply to both.

use crate::capabilities::{BitSet, CapabilityClass, CapabilityQuery};
use crate::device::EventSource;
use crate::enumerate::NodeOpener;
use crate::metadata::DeviceMeta;
use evdev::Device;
use std::fs::File;
use std::io::{self, Read};
use std::os::unix::io::{AsFd, AsRawFd, RawFd};
use std::path::Path;

/// An open evdev device node.
pub struct EvdevNode {
    path: String,
    device: Device,
    reader: File,
}

impl EvdevNode {
    /// Open `path` and switch it to non-blocking reads.
    pub fn open(path: &Path) -> io::Result<Self> {
        let device = Device::open(path)?;
        let reader = File::from(device.as_fd().try_clone_to_owned()?);
        set_nonblocking(&reader)?;

        #[cfg(feature = "debug-log")]
        log::trace!(
            "[EVDEV/OPEN] path={} fd={} name={:?}",
            path.display(),
            reader.as_raw_fd(),
            device.name()
        );

        Ok(Self {
            path: path.display().to_string(),
            device,
            reader,
        })
    }
}

fn set_nonblocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: `fd` is owned by `file` and stays open for both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: as above; only O_NONBLOCK is added to the existing flags.
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags | libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl AsRawFd for EvdevNode {
    fn as_raw_fd(&self) -> RawFd {
        self.reader.as_raw_fd()
    }
}

impl CapabilityQuery for EvdevNode {
    /// A class the device does not advertise (`evdev` returns `None`) is an
    /// empty set, not a failure. A bitmap the kernel refuses fails
    /// `Device::open`, so such nodes never get this far.
    fn query_bits(&self, class: CapabilityClass, bits: &mut [u8]) -> io::Result<()> {
        let dev = &self.device;
        let codes: Vec<u16> = match class {
            CapabilityClass::EventTypes => dev.supported_events().iter().map(|t| t.0).collect(),
            CapabilityClass::AbsoluteAxes => dev
                .supported_absolute_axes()
                .map(|axes| axes.iter().map(|a| a.0).collect())
                .unwrap_or_default(),
            CapabilityClass::RelativeAxes => dev
                .supported_relative_axes()
                .map(|axes| axes.iter().map(|a| a.0).collect())
                .unwrap_or_default(),
            CapabilityClass::Keys => dev
                .supported_keys()
                .map(|keys| keys.iter().map(|k| k.code()).collect())
                .unwrap_or_default(),
        };

        let set = BitSet::from_codes(class, codes);
        let n = bits.len().min(set.as_bytes().len());
        bits[..n].copy_from_slice(&set.as_bytes()[..n]);
        Ok(())
    }
}

impl EventSource for EvdevNode {
    fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }

    fn set_grab(&mut self, grab: bool) -> io::Result<()> {
        if grab {
            self.device.grab()
        } else {
            self.device.ungrab()
        }
    }

    fn meta(&self) -> DeviceMeta {
        let mut meta = DeviceMeta::new(self.path.clone());
        meta.name = self
            .device
            .name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned);

        let id = self.device.input_id();
        meta.bus = Some(id.bus_type().0);
        meta.vendor = Some(id.vendor());
        meta.product = Some(id.product());
        meta.version = Some(id.version());
        meta
    }
}

/// Opens real evdev nodes for the enumerator.
#[derive(Clone, Copy, Debug, Default)]
pub struct EvdevOpener;

impl NodeOpener for EvdevOpener {
    fn open(&mut self, path: &Path) -> io::Result<Box<dyn EventSource>> {
        Ok(Box::new(EvdevNode::open(path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_file_is_not_an_evdev_node() {
        let path = std::env::temp_dir().join(format!("evloop-not-evdev-{}", std::process::id()));
        std::fs::write(&path, b"").unwrap();

        assert!(EvdevNode::open(&path).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_node_fails_to_open() {
        let err = EvdevOpener
            .open(Path::new("/nonexistent/evloop/event0"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
