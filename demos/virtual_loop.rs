use evloop::backends::virtual_input::{VirtualDevice, VirtualOpener};
use evloop::codes::*;
use evloop::config::{DiscoveryConfig, RenderConfig};
use evloop::handlers::standard_bus;
use evloop::{CapabilitySet, DeviceRegistry, EnumerateOptions, EventLoop, RawEvent, RenderContext};
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    // A keyboard and a mouse backed by socket pairs instead of /dev/input
    let keyboard = CapabilitySet::builder()
        .with_event_types(&[EV_SYN, EV_KEY])
        .with_keys(&[KEY_ESC, KEY_1, KEY_0]);
    let mouse = CapabilitySet::builder()
        .with_event_types(&[EV_SYN, EV_KEY, EV_REL])
        .with_relative_axes(&[REL_X, REL_Y])
        .with_keys(&[BTN_LEFT]);

    let (kbd, mut kbd_feed) = VirtualDevice::pair("/virtual/event0", keyboard).expect("keyboard");
    let (ptr, mut ptr_feed) = VirtualDevice::pair("/virtual/event1", mouse).expect("mouse");

    let mut opener = VirtualOpener::new();
    opener.insert(kbd);
    opener.insert(ptr);

    let discovery = DiscoveryConfig {
        directory: PathBuf::from("/virtual"),
        ..Default::default()
    };
    let paths = [PathBuf::from("/virtual/event0"), PathBuf::from("/virtual/event1")];
    let (registry, _) =
        DeviceRegistry::from_paths(&discovery, &paths, &mut opener, EnumerateOptions::default())
            .expect("enumerate virtual devices");

    println!("Devices:");
    for d in registry.devices() {
        println!("- {} ({})", d.meta(), d.category());
    }

    // Queue some input, ending with escape
    let syn = RawEvent::new(EV_SYN, 0, 0);
    ptr_feed.send(RawEvent::new(EV_REL, REL_X, 5)).expect("send");
    ptr_feed.send(syn).expect("send");
    kbd_feed.send(RawEvent::new(EV_KEY, KEY_1, 1)).expect("send");
    kbd_feed.send(RawEvent::new(EV_KEY, KEY_1, 0)).expect("send");
    kbd_feed.send(RawEvent::new(EV_KEY, KEY_ESC, 1)).expect("send");
    kbd_feed.send(syn).expect("send");

    let mut ctx = RenderContext::headless(&RenderConfig::default()).expect("surface");
    let (report, _released) = EventLoop::new(registry, standard_bus(false))
        .run(&mut ctx)
        .expect("dispatch loop");

    println!("{report:?}");
    println!("keyboard released: {}", !kbd_feed.is_grabbed());
}
