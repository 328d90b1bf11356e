mod common;

use common::*;
use evloop::codes::*;
use evloop::handlers::standard_bus;
use evloop::{
    DeviceCategory, DeviceMeta, EventLoop, Flow, LoopState, RawEvent, RecordBus, RecordListener,
    RECORD_SIZE,
};
use std::cell::RefCell;
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(&'static str, String, RawEvent)>>>;

struct Capture {
    name: &'static str,
    log: Log,
}

impl RecordListener for Capture {
    fn on_record(&mut self, device: &DeviceMeta, record: &RawEvent) -> Flow {
        self.log
            .borrow_mut()
            .push((self.name, device.path.clone(), *record));
        Flow::Continue
    }
}

/// Standard handlers plus one capture listener per category.
fn capturing_bus(log: &Log) -> RecordBus {
    let mut bus = standard_bus(true);
    for (name, cat) in [
        ("keyboard", DeviceCategory::KEYBOARD),
        ("mouse", DeviceCategory::MOUSE),
        ("touchpad", DeviceCategory::TOUCHPAD),
        ("gamepad", DeviceCategory::GAMEPAD),
    ] {
        bus.add_listener(
            Capture {
                name,
                log: log.clone(),
            },
            cat,
            None,
        );
    }
    bus
}

fn key(code: u16, value: i32) -> RawEvent {
    RawEvent::new(EV_KEY, code, value).at(100, 5)
}

#[test]
fn escape_terminates_and_releases_every_device() {
    let (kbd, mut kbd_feed) = pair(0, keyboard());
    let (mouse_dev, mut mouse_feed) = pair(1, mouse());
    let (blank, mut blank_feed) = pair(2, Default::default());
    let registry = registry_of(vec![kbd, mouse_dev, blank]);
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry, standard_bus(false));

    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);

    kbd_feed.send(key(KEY_ESC, KEY_PRESSED)).unwrap();
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Terminated);

    assert!(lp.registry().devices().iter().all(|d| d.is_released()));
    assert!(kbd_feed.is_closed() && mouse_feed.is_closed() && blank_feed.is_closed());
    assert!(!kbd_feed.is_grabbed() && !mouse_feed.is_grabbed());
    assert_eq!(ctx.frames(), 2);
}

#[test]
fn terminated_loop_does_not_run_again() {
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd]), standard_bus(false));

    feed.send(key(KEY_ESC, KEY_PRESSED)).unwrap();
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Terminated);
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Terminated);

    assert_eq!(lp.report().iterations, 1);
    assert_eq!(ctx.frames(), 1);
}

#[test]
fn escape_release_does_not_terminate() {
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd]), standard_bus(false));

    feed.send(key(KEY_ESC, KEY_RELEASED)).unwrap();
    feed.send(key(30, KEY_PRESSED)).unwrap();
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);
    assert_eq!(lp.report().records, 2);
}

#[test]
fn escape_from_gamepad_is_ignored() {
    let (pad, mut feed) = pair(0, joystick());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![pad]), standard_bus(false));

    feed.send(key(KEY_ESC, KEY_PRESSED)).unwrap();
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);
}

#[test]
fn frames_are_presented_without_input() {
    let (kbd, _feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd]), standard_bus(false));

    for _ in 0..5 {
        assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);
    }
    assert_eq!(ctx.frames(), 5);
    assert_eq!(lp.report().records, 0);
}

#[test]
fn records_are_routed_by_category_in_registry_order() {
    let log: Log = Default::default();
    let combo = keyboard()
        .with_event_types(&[EV_REL])
        .with_relative_axes(&[REL_X, REL_Y])
        .with_keys(&[BTN_LEFT]);
    let (combo_dev, mut combo_feed) = pair(0, combo);
    let (pad, mut pad_feed) = pair(1, joystick());
    let (blank, mut blank_feed) = pair(2, Default::default());
    let registry = registry_of(vec![combo_dev, pad, blank]);
    assert_eq!(
        registry.devices()[0].category(),
        DeviceCategory::KEYBOARD | DeviceCategory::MOUSE
    );

    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry, capturing_bus(&log));

    // Written in reverse order; dispatch still follows the registry.
    blank_feed.send(key(30, 1)).unwrap();
    pad_feed.send(key(BTN_TRIGGER, 1)).unwrap();
    combo_feed.send(RawEvent::new(EV_REL, REL_X, 3)).unwrap();
    lp.tick(&mut ctx).unwrap();

    let seen: Vec<_> = log.borrow().iter().map(|(n, p, _)| (*n, p.clone())).collect();
    assert_eq!(
        seen,
        vec![
            ("keyboard", node(0)),
            ("mouse", node(0)),
            ("gamepad", node(1)),
        ]
    );
    // The unclassified device's record was still read and counted.
    assert_eq!(lp.report().records, 3);
}

#[test]
fn decoded_records_match_what_was_written() {
    let log: Log = Default::default();
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd]), capturing_bus(&log));

    let sent = vec![
        key(30, KEY_PRESSED),
        RawEvent::new(EV_SYN, SYN_REPORT, 0).at(100, 5),
        key(30, KEY_RELEASED),
    ];
    for ev in &sent {
        feed.send(*ev).unwrap();
    }
    lp.tick(&mut ctx).unwrap();

    let got: Vec<_> = log.borrow().iter().map(|(_, _, r)| *r).collect();
    assert_eq!(got, sent);
}

#[test]
fn trailing_fragment_is_dropped_by_default() {
    let log: Log = Default::default();
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd]), capturing_bus(&log));

    let second = key(31, KEY_PRESSED).encode();
    feed.send(key(30, KEY_PRESSED)).unwrap();
    feed.send_bytes(&second[..5]).unwrap();
    lp.tick(&mut ctx).unwrap();
    assert_eq!(lp.report().records, 1);
    assert_eq!(lp.report().dropped_bytes, 5);

    // The rest of the split record is not a whole record on its own either.
    feed.send_bytes(&second[5..]).unwrap();
    lp.tick(&mut ctx).unwrap();
    assert_eq!(lp.report().records, 1);
    assert_eq!(lp.report().dropped_bytes, RECORD_SIZE as u64);
}

#[test]
fn carry_mode_reassembles_split_records() {
    let log: Log = Default::default();
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let mut lp =
        EventLoop::new(registry_of(vec![kbd]), capturing_bus(&log)).with_carry_partial(true);

    let second = key(31, KEY_PRESSED);
    let bytes = second.encode();
    feed.send(key(30, KEY_PRESSED)).unwrap();
    feed.send_bytes(&bytes[..5]).unwrap();
    lp.tick(&mut ctx).unwrap();
    assert_eq!(lp.report().records, 1);

    feed.send_bytes(&bytes[5..]).unwrap();
    lp.tick(&mut ctx).unwrap();
    assert_eq!(lp.report().records, 2);
    assert_eq!(log.borrow().last().map(|(_, _, r)| *r), Some(second));
    assert_eq!(lp.report().dropped_bytes, 0);
}

#[test]
fn vanished_device_is_dropped_from_polling_but_released() {
    let (kbd, mut kbd_feed) = pair(0, keyboard());
    let (mouse_dev, mouse_feed) = pair(1, mouse());
    let mut ctx = tiny_context();
    let mut lp = EventLoop::new(registry_of(vec![kbd, mouse_dev]), standard_bus(false));

    drop(mouse_feed);
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);
    assert_eq!(lp.tick(&mut ctx).unwrap(), LoopState::Running);
    assert_eq!(lp.report().lost_devices, 1);
    assert_eq!(lp.registry().len(), 2);

    kbd_feed.send(key(KEY_ESC, KEY_PRESSED)).unwrap();
    let (report, registry) = lp.run(&mut ctx).unwrap();
    assert_eq!(report.lost_devices, 1);
    assert!(registry.devices().iter().all(|d| d.is_released()));
}

#[test]
fn run_returns_report_after_escape() {
    let (kbd, mut feed) = pair(0, keyboard());
    let mut ctx = tiny_context();
    let lp = EventLoop::new(registry_of(vec![kbd]), standard_bus(false));

    feed.send(key(30, KEY_PRESSED)).unwrap();
    feed.send(key(30, KEY_RELEASED)).unwrap();
    feed.send(key(KEY_ESC, KEY_PRESSED)).unwrap();

    let (report, registry) = lp.run(&mut ctx).unwrap();
    assert_eq!(report.records, 3);
    assert_eq!(report.frames, report.iterations);
    assert!(registry.devices().iter().all(|d| d.is_released()));
    assert!(feed.is_closed());
}
