//! evloop — Linux evdev input discovery, classification and dispatch.
//!
//! Discovers `/dev/input/event*` nodes, probes each node's capability bitmasks,
//! classifies it as keyboard / mouse / touchpad / gamepad, and runs a
//! single-threaded loop that polls every device, decodes raw `input_event`
//! records, routes them to per-category handlers and presents one frame per
//! iteration until escape is pressed.

pub mod backends;
pub mod capabilities;
pub mod category;
pub mod codes;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod enumerate;
pub mod error;
pub mod eventbus;
pub mod filtered_listener;
pub mod handlers;
pub mod manager;
pub mod metadata;
pub mod present;
pub mod record;

pub use capabilities::*;
pub use category::*;
pub use config::Config;
pub use device::*;
pub use dispatch::*;
pub use enumerate::*;
pub use error::{Error, Result};
pub use eventbus::*;
pub use manager::*;
pub use metadata::DeviceMeta;
pub use present::*;
pub use record::*;
