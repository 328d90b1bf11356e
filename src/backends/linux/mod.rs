//! Linux evdev backend.
//!
//! - [`discovery`] lists candidate device nodes
//! - [`evdev_device`] wraps one node opened through the `evdev` crate as an
//!   [`EventSource`](crate::device::EventSource)

pub mod discovery;
pub mod evdev_device;

pub use discovery::find_nodes;
pub use evdev_device::{EvdevNode, EvdevOpener};
