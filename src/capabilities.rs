//! Device capability bit-sets and the prober that fills them.
//!
//! A [`CapabilitySet`] holds the four bit-vectors a device reports: supported
//! event types, absolute axes, relative axes and keys/buttons. Each vector is
//! sized to its class's maximum code, in the kernel's capability bitmap layout
//! (bit `i` lives in byte `i / 8`, bit `i % 8`).
//!
//! # Probe failures
//! [`probe`] asks the device for each class independently. A class the device
//! rejects is logged and left all-zero; the other classes are still filled in,
//! and the device proceeds to classification with what was obtained.

use crate::codes::{ABS_MAX, EV_MAX, KEY_MAX, REL_MAX};
use log::warn;
use serde::Serialize;
use std::fmt;
use std::io;

/// One class of capability query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityClass {
    EventTypes,
    AbsoluteAxes,
    RelativeAxes,
    Keys,
}

impl CapabilityClass {
    /// All classes in probe order.
    pub const ALL: [CapabilityClass; 4] = [
        CapabilityClass::EventTypes,
        CapabilityClass::AbsoluteAxes,
        CapabilityClass::RelativeAxes,
        CapabilityClass::Keys,
    ];

    /// Highest code in this class's code space.
    pub fn max_code(self) -> u16 {
        match self {
            CapabilityClass::EventTypes => EV_MAX,
            CapabilityClass::AbsoluteAxes => ABS_MAX,
            CapabilityClass::RelativeAxes => REL_MAX,
            CapabilityClass::Keys => KEY_MAX,
        }
    }

    /// Byte length of a bit-vector covering `0..=max_code()`.
    pub fn byte_len(self) -> usize {
        (self.max_code() as usize) / 8 + 1
    }
}

impl fmt::Display for CapabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapabilityClass::EventTypes => "event types",
            CapabilityClass::AbsoluteAxes => "absolute axes",
            CapabilityClass::RelativeAxes => "relative axes",
            CapabilityClass::Keys => "keys",
        })
    }
}

/// Fixed-size bit-vector over one capability class.
#[derive(Clone, PartialEq, Eq)]
pub struct BitSet {
    class: CapabilityClass,
    bytes: Vec<u8>,
}

impl BitSet {
    /// All-zero set for `class`.
    pub fn empty(class: CapabilityClass) -> Self {
        Self {
            class,
            bytes: vec![0; class.byte_len()],
        }
    }

    /// Build from raw kernel bytes. Extra bytes are ignored, missing bytes are zero.
    pub fn from_bytes(class: CapabilityClass, raw: &[u8]) -> Self {
        let mut set = Self::empty(class);
        let n = raw.len().min(set.bytes.len());
        set.bytes[..n].copy_from_slice(&raw[..n]);
        set
    }

    /// Build from a list of codes. Codes beyond the class maximum are ignored.
    pub fn from_codes(class: CapabilityClass, codes: impl IntoIterator<Item = u16>) -> Self {
        let mut set = Self::empty(class);
        for code in codes {
            set.insert(code);
        }
        set
    }

    pub fn class(&self) -> CapabilityClass {
        self.class
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Mark `code` as supported. Out-of-range codes are ignored.
    pub fn insert(&mut self, code: u16) {
        if code <= self.class.max_code() {
            self.bytes[code as usize / 8] |= 1 << (code % 8);
        }
    }

    #[inline]
    pub fn contains(&self, code: u16) -> bool {
        code <= self.class.max_code() && self.bytes[code as usize / 8] & (1 << (code % 8)) != 0
    }

    /// True if any code in `codes` is set.
    pub fn contains_any(&self, codes: impl IntoIterator<Item = u16>) -> bool {
        codes.into_iter().any(|c| self.contains(c))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// Number of set bits.
    pub fn len(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterate set codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..=self.class.max_code()).filter(move |&c| self.contains(c))
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|c| format!("0x{c:x}")))
            .finish()
    }
}

/// The four bit-sets probed from one device. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilitySet {
    pub event_types: BitSet,
    pub absolute_axes: BitSet,
    pub relative_axes: BitSet,
    pub keys: BitSet,
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self {
            event_types: BitSet::empty(CapabilityClass::EventTypes),
            absolute_axes: BitSet::empty(CapabilityClass::AbsoluteAxes),
            relative_axes: BitSet::empty(CapabilityClass::RelativeAxes),
            keys: BitSet::empty(CapabilityClass::Keys),
        }
    }
}

impl CapabilitySet {
    /// Start an empty set for fluent construction (tests and virtual devices).
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn with_event_types(mut self, codes: &[u16]) -> Self {
        codes.iter().for_each(|&c| self.event_types.insert(c));
        self
    }

    pub fn with_absolute_axes(mut self, codes: &[u16]) -> Self {
        codes.iter().for_each(|&c| self.absolute_axes.insert(c));
        self
    }

    pub fn with_relative_axes(mut self, codes: &[u16]) -> Self {
        codes.iter().for_each(|&c| self.relative_axes.insert(c));
        self
    }

    pub fn with_keys(mut self, codes: &[u16]) -> Self {
        codes.iter().for_each(|&c| self.keys.insert(c));
        self
    }

    /// Borrow the set for `class`.
    pub fn get(&self, class: CapabilityClass) -> &BitSet {
        match class {
            CapabilityClass::EventTypes => &self.event_types,
            CapabilityClass::AbsoluteAxes => &self.absolute_axes,
            CapabilityClass::RelativeAxes => &self.relative_axes,
            CapabilityClass::Keys => &self.keys,
        }
    }

    fn slot(&mut self, class: CapabilityClass) -> &mut BitSet {
        match class {
            CapabilityClass::EventTypes => &mut self.event_types,
            CapabilityClass::AbsoluteAxes => &mut self.absolute_axes,
            CapabilityClass::RelativeAxes => &mut self.relative_axes,
            CapabilityClass::Keys => &mut self.keys,
        }
    }

    /// Set-bit counts per class, for reports.
    pub fn summary(&self) -> CapabilitySummary {
        CapabilitySummary {
            event_types: self.event_types.len(),
            absolute_axes: self.absolute_axes.len(),
            relative_axes: self.relative_axes.len(),
            keys: self.keys.len(),
        }
    }
}

/// Coarse per-class counts, serialized into `--list` output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySummary {
    pub event_types: usize,
    pub absolute_axes: usize,
    pub relative_axes: usize,
    pub keys: usize,
}

/// Read-only control channel a device exposes for capability queries.
pub trait CapabilityQuery {
    /// Fill `bits` with the device's bit-vector for `class`.
    ///
    /// `bits` is exactly [`CapabilityClass::byte_len`] long.
    fn query_bits(&self, class: CapabilityClass, bits: &mut [u8]) -> io::Result<()>;
}

/// Result of probing one device: the sets plus the classes that failed.
#[derive(Clone, Debug, Default)]
pub struct ProbeOutcome {
    pub capabilities: CapabilitySet,
    pub failed: Vec<CapabilityClass>,
}

/// Query every capability class of `device`.
///
/// `label` is only used for log lines.
pub fn probe<Q: CapabilityQuery + ?Sized>(device: &Q, label: &str) -> ProbeOutcome {
    let mut outcome = ProbeOutcome::default();

    for class in CapabilityClass::ALL {
        let mut raw = vec![0u8; class.byte_len()];
        match device.query_bits(class, &mut raw) {
            Ok(()) => *outcome.capabilities.slot(class) = BitSet::from_bytes(class, &raw),
            Err(e) => {
                warn!("{label}: probing {class} failed: {e}");
                outcome.failed.push(class);
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::*;

    struct Scripted {
        caps: CapabilitySet,
        reject: Vec<CapabilityClass>,
    }

    impl CapabilityQuery for Scripted {
        fn query_bits(&self, class: CapabilityClass, bits: &mut [u8]) -> io::Result<()> {
            if self.reject.contains(&class) {
                return Err(io::Error::from_raw_os_error(libc::EINVAL));
            }
            bits.copy_from_slice(self.caps.get(class).as_bytes());
            Ok(())
        }
    }

    #[test]
    fn byte_lengths_cover_max_code() {
        assert_eq!(CapabilityClass::EventTypes.byte_len(), 4);
        assert_eq!(CapabilityClass::AbsoluteAxes.byte_len(), 8);
        assert_eq!(CapabilityClass::RelativeAxes.byte_len(), 2);
        assert_eq!(CapabilityClass::Keys.byte_len(), 96);
    }

    #[test]
    fn bit_layout_matches_kernel() {
        let set = BitSet::from_bytes(CapabilityClass::Keys, &[0b0000_0010, 0, 0x01]);
        assert!(set.contains(1));
        assert!(set.contains(16));
        assert!(!set.contains(0));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 16]);
    }

    #[test]
    fn out_of_range_codes_are_ignored() {
        let mut set = BitSet::from_codes(CapabilityClass::RelativeAxes, [REL_X, REL_MAX + 1]);
        assert_eq!(set.len(), 1);
        set.insert(REL_MAX + 1);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![REL_X]);
        assert!(!set.contains(KEY_MAX));
    }

    #[test]
    fn probe_collects_every_class() {
        let caps = CapabilitySet::builder()
            .with_event_types(&[EV_KEY, EV_REL])
            .with_relative_axes(&[REL_X, REL_Y])
            .with_keys(&[BTN_LEFT]);
        let dev = Scripted {
            caps: caps.clone(),
            reject: vec![],
        };

        let out = probe(&dev, "test");
        assert!(out.failed.is_empty());
        assert_eq!(out.capabilities, caps);
    }

    #[test]
    fn rejected_class_is_zeroed_and_others_survive() {
        let caps = CapabilitySet::builder()
            .with_event_types(&[EV_KEY, EV_ABS])
            .with_absolute_axes(&[ABS_X, ABS_Y])
            .with_keys(&[KEY_ESC]);
        let dev = Scripted {
            caps,
            reject: vec![CapabilityClass::AbsoluteAxes],
        };

        let out = probe(&dev, "test");
        assert_eq!(out.failed, vec![CapabilityClass::AbsoluteAxes]);
        assert!(out.capabilities.absolute_axes.is_empty());
        assert!(out.capabilities.keys.contains(KEY_ESC));
        assert!(out.capabilities.event_types.contains(EV_ABS));
    }
}
