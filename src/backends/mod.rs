//! Input backends for `evloop`.
//!
//! Implementations of [`EventSource`](crate::device::EventSource) and
//! [`NodeOpener`](crate::enumerate::NodeOpener):
//! - **`linux`** — real evdev nodes under `/dev/input`
//! - **`virtual_input`** — socket-backed devices for tests and dry runs
//!
//! evloop reads input devices; it does not create kernel-visible virtual
//! devices (uinput).

#[cfg(target_os = "linux")]
#[cfg_attr(docsrs, doc(cfg(target_os = "linux")))]
pub mod linux;

pub mod virtual_input;
