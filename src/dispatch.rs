//! The event multiplexer / dispatch loop.
//!
//! [`EventLoop`] owns the [`DeviceRegistry`] for as long as it runs. Each
//! [`tick`](EventLoop::tick) while `Running`:
//!
//! 1. polls every live device fd with the configured timeout (zero by default,
//!    so the loop spins)
//! 2. for each ready device, in registry order, reads one bounded buffer and
//!    decodes the whole records in it
//! 3. offers each record to the [`RecordBus`] under the device's category
//! 4. presents one frame, whether or not anything was read
//!
//! A handler returning [`Flow::Terminate`] moves the loop to `Terminated`; the
//! rest of that tick still runs, then every handle is released in registry
//! order. A terminated loop never runs again.
//!
//! ## Device failures
//! Read errors are logged and the device is skipped for that tick. A device
//! whose fd reports hang-up/error, or reads end-of-file, is marked lost: it is
//! logged once and left out of later polls, but stays in the registry and is
//! still released at shutdown.

use crate::config::{Config, PollConfig};
use crate::error::{Error, Result};
use crate::eventbus::{Flow, RecordBus};
use crate::manager::DeviceRegistry;
use crate::present::RenderContext;
use crate::record::{RawEvent, ReadBuffer, RecordAssembler};
use log::{info, trace, warn};
use std::io;

/// Loop lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Counters collected over a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub iterations: u64,
    pub frames: u64,
    pub records: u64,
    pub read_errors: u64,
    /// Bytes discarded as trailing partial records.
    pub dropped_bytes: u64,
    pub lost_devices: usize,
}

/// Single-threaded poll/read/dispatch/present loop.
pub struct EventLoop {
    registry: DeviceRegistry,
    bus: RecordBus,
    poll: PollConfig,
    carry_partial: bool,
    state: LoopState,
    pollfds: Vec<libc::pollfd>,
    assemblers: Vec<RecordAssembler>,
    buf: ReadBuffer,
    scratch: Vec<RawEvent>,
    report: LoopReport,
}

impl EventLoop {
    /// Take ownership of `registry` and route its records through `bus`.
    pub fn new(registry: DeviceRegistry, bus: RecordBus) -> Self {
        let pollfds = registry
            .devices()
            .iter()
            .map(|d| libc::pollfd {
                fd: d.raw_fd().unwrap_or(-1),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();
        let assemblers = registry.devices().iter().map(|_| RecordAssembler::new()).collect();

        Self {
            registry,
            bus,
            poll: PollConfig::default(),
            carry_partial: false,
            state: LoopState::Running,
            pollfds,
            assemblers,
            buf: ReadBuffer::new(),
            scratch: Vec::new(),
            report: LoopReport::default(),
        }
    }

    /// Build with poll and decode settings from `config`.
    pub fn from_config(registry: DeviceRegistry, bus: RecordBus, config: &Config) -> Self {
        Self::new(registry, bus)
            .with_poll(config.poll.clone())
            .with_carry_partial(config.decode.carry_partial_records)
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Keep trailing partial records for the next read instead of dropping them.
    pub fn with_carry_partial(mut self, carry: bool) -> Self {
        self.carry_partial = carry;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn report(&self) -> &LoopReport {
        &self.report
    }

    /// Tick until terminated, then hand back the counters and the released registry.
    pub fn run(mut self, ctx: &mut RenderContext) -> Result<(LoopReport, DeviceRegistry)> {
        info!(
            "Entering dispatch loop with {} device(s), poll timeout {:?}",
            self.registry.len(),
            self.poll.timeout()
        );

        while self.tick(ctx)? == LoopState::Running {}

        info!(
            "Dispatch loop finished after {} iteration(s), {} record(s)",
            self.report.iterations, self.report.records
        );
        let report = self.report.clone();
        Ok((report, std::mem::take(&mut self.registry)))
    }

    /// One iteration: poll, read, dispatch, present.
    pub fn tick(&mut self, ctx: &mut RenderContext) -> Result<LoopState> {
        if self.state == LoopState::Terminated {
            return Ok(self.state);
        }
        self.report.iterations += 1;

        let ready = self.wait_ready()?;
        for idx in ready {
            if self.service(idx) == Flow::Terminate {
                self.state = LoopState::Terminated;
            }
        }

        ctx.present();
        self.report.frames += 1;

        if self.state == LoopState::Terminated {
            self.shutdown();
        }
        Ok(self.state)
    }

    fn wait_ready(&mut self) -> Result<Vec<usize>> {
        let timeout_ms = self.poll.timeout().as_millis().min(i32::MAX as u128) as libc::c_int;
        for pfd in &mut self.pollfds {
            pfd.revents = 0;
        }

        // SAFETY: `pollfds` is a live, correctly sized array of `pollfd`.
        let rc = unsafe {
            libc::poll(
                self.pollfds.as_mut_ptr(),
                self.pollfds.len() as libc::nfds_t,
                timeout_ms,
            )
        };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(Error::Poll(err));
        }

        let mut ready = Vec::new();
        if rc == 0 {
            return Ok(ready);
        }

        for idx in 0..self.pollfds.len() {
            let revents = self.pollfds[idx].revents;
            if revents & libc::POLLIN != 0 {
                ready.push(idx);
            } else if revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
                self.mark_lost(idx, "device hung up");
            }
        }
        Ok(ready)
    }

    /// Read, decode and dispatch one device's pending bytes.
    fn service(&mut self, idx: usize) -> Flow {
        let device = &mut self.registry.devices_mut()[idx];

        let n = match device.read(self.buf.spare()) {
            Ok(0) => {
                self.mark_lost(idx, "end of stream");
                return Flow::Continue;
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Flow::Continue,
            Err(e) => {
                warn!("{}: read failed: {e}", device.label());
                self.report.read_errors += 1;
                if e.raw_os_error() == Some(libc::ENODEV) {
                    self.mark_lost(idx, "device removed");
                }
                return Flow::Continue;
            }
        };
        self.buf.set_filled(n);
        trace!("Got input from {}, read {n} bytes", device.label());

        #[cfg(feature = "debug-log")]
        trace!("[EVDEV/READ] {} {:02x?}", device.label(), self.buf.filled());

        self.scratch.clear();
        if self.carry_partial {
            self.assemblers[idx].push(self.buf.filled(), &mut self.scratch);
        } else {
            self.scratch.extend(self.buf.records());
            self.report.dropped_bytes += self.buf.remainder() as u64;
        }

        let mut flow = Flow::Continue;
        for record in &self.scratch {
            self.report.records += 1;
            if self.bus.emit(device.meta(), device.category(), record) == Flow::Terminate {
                flow = Flow::Terminate;
            }
        }
        flow
    }

    fn mark_lost(&mut self, idx: usize, why: &str) {
        let pfd = &mut self.pollfds[idx];
        if pfd.fd < 0 {
            return;
        }
        pfd.fd = -1;
        self.report.lost_devices += 1;
        warn!(
            "{}: {why}; no longer polled",
            self.registry.devices()[idx].label()
        );
    }

    /// Release every handle in registry order.
    fn shutdown(&mut self) {
        info!("Releasing {} device(s)", self.registry.len());
        for pfd in &mut self.pollfds {
            pfd.fd = -1;
        }
        self.registry.release_all();
    }
}
