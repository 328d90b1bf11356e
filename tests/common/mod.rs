#![allow(dead_code)]

use evloop::backends::virtual_input::{VirtualDevice, VirtualFeeder, VirtualOpener};
use evloop::codes::*;
use evloop::config::{DiscoveryConfig, RenderConfig};
use evloop::{CapabilitySet, DeviceRegistry, EnumerateOptions, RenderContext};
use std::path::PathBuf;

pub fn keyboard() -> CapabilitySet {
    CapabilitySet::builder()
        .with_event_types(&[EV_SYN, EV_KEY, EV_MSC, EV_REP])
        .with_keys(&[KEY_ESC, KEY_1, 3, 4, 5, KEY_0, 30])
}

pub fn mouse() -> CapabilitySet {
    CapabilitySet::builder()
        .with_event_types(&[EV_SYN, EV_KEY, EV_REL])
        .with_relative_axes(&[REL_X, REL_Y])
        .with_keys(&[BTN_LEFT, BTN_LEFT + 1])
}

pub fn joystick() -> CapabilitySet {
    CapabilitySet::builder()
        .with_event_types(&[EV_SYN, EV_KEY, EV_ABS])
        .with_absolute_axes(&[ABS_X, ABS_Y])
        .with_keys(&[BTN_JOYSTICK, BTN_JOYSTICK + 1])
}

pub fn node(n: usize) -> String {
    format!("/virtual/event{n}")
}

pub fn discovery() -> DiscoveryConfig {
    DiscoveryConfig {
        directory: PathBuf::from("/virtual"),
        prefix: "event".into(),
        grab: true,
    }
}

/// Register `devices` under `/virtual/event{i}` and enumerate them in order.
pub fn registry_of(devices: Vec<VirtualDevice>) -> DeviceRegistry {
    let paths: Vec<PathBuf> = (0..devices.len()).map(|i| PathBuf::from(node(i))).collect();
    let mut opener = VirtualOpener::new();
    for dev in devices {
        opener.insert(dev);
    }
    let (registry, _) =
        DeviceRegistry::from_paths(&discovery(), &paths, &mut opener, EnumerateOptions::default())
            .expect("enumerate virtual devices");
    registry
}

pub fn pair(n: usize, caps: CapabilitySet) -> (VirtualDevice, VirtualFeeder) {
    VirtualDevice::pair(&node(n), caps).expect("socket pair")
}

pub fn tiny_context() -> RenderContext {
    RenderContext::headless(&RenderConfig {
        width: 4,
        height: 4,
        clear_color: [0.0, 0.0, 0.0, 1.0],
    })
    .expect("headless surface")
}
