//! Raw event records and the buffers they are decoded from.
//!
//! A device's byte stream is a sequence of native-endian kernel `input_event`
//! structures with no framing. Records are recovered purely by cutting the
//! stream at [`RECORD_SIZE`] boundaries:
//!
//! ```text
//! | sec (long) | usec (long) | type u16 | code u16 | value i32 |
//! ```
//!
//! ## Trailing fragments
//! [`decode_records`] yields only whole records; a trailing fragment is
//! dropped. [`RecordAssembler`] is the opt-in alternative that keeps the
//! fragment and prepends it to the next read.

use crate::codes::{event_type_name, EV_KEY, KEY_PRESSED, KEY_REPEATED};
use std::fmt;
use std::mem::size_of;

/// Width of each timestamp field (`time_t` / `suseconds_t` are `long` on Linux).
const TIME_FIELD: usize = size_of::<libc::c_long>();

/// Size of one encoded record, in bytes.
pub const RECORD_SIZE: usize = 2 * TIME_FIELD + 8;

/// Capacity of the per-read buffer.
pub const READ_BUFFER_CAPACITY: usize = 256;

/// One decoded input record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub sec: i64,
    pub usec: i64,
    pub ty: u16,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    pub fn new(ty: u16, code: u16, value: i32) -> Self {
        Self {
            ty,
            code,
            value,
            ..Default::default()
        }
    }

    pub fn at(mut self, sec: i64, usec: i64) -> Self {
        self.sec = sec;
        self.usec = usec;
        self
    }

    /// Decode one record from exactly [`RECORD_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < RECORD_SIZE {
            return None;
        }
        let (sec, rest) = bytes.split_at(TIME_FIELD);
        let (usec, rest) = rest.split_at(TIME_FIELD);
        Some(Self {
            sec: read_long(sec),
            usec: read_long(usec),
            ty: u16::from_ne_bytes([rest[0], rest[1]]),
            code: u16::from_ne_bytes([rest[2], rest[3]]),
            value: i32::from_ne_bytes([rest[4], rest[5], rest[6], rest[7]]),
        })
    }

    /// Encode to the kernel layout.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        write_long(&mut out[..TIME_FIELD], self.sec);
        write_long(&mut out[TIME_FIELD..2 * TIME_FIELD], self.usec);
        let tail = &mut out[2 * TIME_FIELD..];
        tail[0..2].copy_from_slice(&self.ty.to_ne_bytes());
        tail[2..4].copy_from_slice(&self.code.to_ne_bytes());
        tail[4..8].copy_from_slice(&self.value.to_ne_bytes());
        out
    }

    /// `EV_KEY` press or autorepeat of `code`.
    pub fn is_key_down(&self, code: u16) -> bool {
        self.ty == EV_KEY && self.code == code && matches!(self.value, KEY_PRESSED | KEY_REPEATED)
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time {}.{:06}, type {}", self.sec, self.usec, self.ty)?;
        if let Some(name) = event_type_name(self.ty) {
            write!(f, " ({name})")?;
        }
        write!(f, ", code {}, value {}", self.code, self.value)
    }
}

fn read_long(bytes: &[u8]) -> i64 {
    match bytes.len() {
        8 => i64::from_ne_bytes(bytes.try_into().unwrap_or([0; 8])),
        4 => i32::from_ne_bytes(bytes.try_into().unwrap_or([0; 4])) as i64,
        _ => 0,
    }
}

fn write_long(out: &mut [u8], v: i64) {
    match out.len() {
        8 => out.copy_from_slice(&v.to_ne_bytes()),
        4 => out.copy_from_slice(&(v as i32).to_ne_bytes()),
        _ => {}
    }
}

/// Iterate the whole records in `bytes`, dropping any trailing fragment.
pub fn decode_records(bytes: &[u8]) -> impl Iterator<Item = RawEvent> + '_ {
    bytes.chunks_exact(RECORD_SIZE).filter_map(RawEvent::decode)
}

/// Bounded buffer for one device read.
pub struct ReadBuffer {
    bytes: [u8; READ_BUFFER_CAPACITY],
    len: usize,
}

impl Default for ReadBuffer {
    fn default() -> Self {
        Self {
            bytes: [0; READ_BUFFER_CAPACITY],
            len: 0,
        }
    }
}

impl ReadBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity(&self) -> usize {
        READ_BUFFER_CAPACITY
    }

    /// Whole buffer, for handing to `read`.
    pub fn spare(&mut self) -> &mut [u8] {
        self.len = 0;
        &mut self.bytes
    }

    /// Record how many bytes the last read produced, clamped to capacity.
    pub fn set_filled(&mut self, n: usize) {
        self.len = n.min(READ_BUFFER_CAPACITY);
    }

    pub fn filled(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Whole records in the filled region.
    pub fn records(&self) -> impl Iterator<Item = RawEvent> + '_ {
        decode_records(self.filled())
    }

    /// Bytes past the last whole record; these are discarded.
    pub fn remainder(&self) -> usize {
        self.len % RECORD_SIZE
    }
}

/// Carries a partial record across reads so it is not lost.
#[derive(Default)]
pub struct RecordAssembler {
    pending: Vec<u8>,
}

impl RecordAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently held from an incomplete record.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Append `bytes` and drain every now-complete record into `out`.
    pub fn push(&mut self, bytes: &[u8], out: &mut Vec<RawEvent>) {
        self.pending.extend_from_slice(bytes);
        let whole = self.pending.len() - self.pending.len() % RECORD_SIZE;
        out.extend(decode_records(&self.pending[..whole]));
        self.pending.drain(..whole);
    }
}
