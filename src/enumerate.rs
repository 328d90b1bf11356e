//! Device enumeration pipeline.
//!
//! For every discovered node path, in order:
//!
//! 1. open it (failure → warning, node skipped)
//! 2. try the exclusive grab (failure → warning, device kept ungrabbed)
//! 3. probe its capabilities (a failed class → warning, class treated as empty)
//! 4. classify it
//! 5. append a [`DeviceHandle`] to the registry
//!
//! [`enumerate_with_report`] additionally returns one [`NodeReport`] per path
//! describing how the node fared, for `--list` style tooling.

use crate::capabilities::{probe, CapabilityClass};
use crate::category::{classify_with, GamepadPrecedence};
use crate::device::{DeviceHandle, EventSource};
use crate::manager::DeviceRegistry;
use log::{info, warn};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Opens a node path into an [`EventSource`].
pub trait NodeOpener {
    fn open(&mut self, path: &Path) -> io::Result<Box<dyn EventSource>>;
}

/// Enumeration knobs.
#[derive(Clone, Copy, Debug)]
pub struct EnumerateOptions {
    /// Attempt the exclusive grab on each opened node.
    pub grab: bool,
    pub precedence: GamepadPrecedence,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            grab: true,
            precedence: GamepadPrecedence::Override,
        }
    }
}

/// Where a node ended up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum NodeOutcome {
    /// Added to the registry.
    Registered {
        grabbed: bool,
        failed_probes: Vec<CapabilityClass>,
    },
    /// Could not be opened.
    OpenFailed { reason: String },
}

/// Per-node debug record.
#[derive(Clone, Debug, Serialize)]
pub struct NodeReport {
    pub path: PathBuf,
    pub outcome: NodeOutcome,
}

/// Open, grab, probe and classify every path.
pub fn enumerate(
    paths: &[PathBuf],
    opener: &mut dyn NodeOpener,
    opts: EnumerateOptions,
) -> DeviceRegistry {
    enumerate_with_report(paths, opener, opts).0
}

/// Like [`enumerate`], also returning one [`NodeReport`] per path.
pub fn enumerate_with_report(
    paths: &[PathBuf],
    opener: &mut dyn NodeOpener,
    opts: EnumerateOptions,
) -> (DeviceRegistry, Vec<NodeReport>) {
    let mut registry = DeviceRegistry::new();
    let mut reports = Vec::with_capacity(paths.len());

    for path in paths {
        let mut source = match opener.open(path) {
            Ok(source) => source,
            Err(e) => {
                warn!("{}: open failed: {e}", path.display());
                reports.push(NodeReport {
                    path: path.clone(),
                    outcome: NodeOutcome::OpenFailed {
                        reason: e.to_string(),
                    },
                });
                continue;
            }
        };

        let meta = source.meta();
        let label = meta.label().to_string();

        let grabbed = opts.grab
            && match source.set_grab(true) {
                Ok(()) => true,
                Err(e) => {
                    warn!("{label}: exclusive grab failed: {e}");
                    false
                }
            };

        let probed = probe(source.as_ref(), &label);
        let category = classify_with(&probed.capabilities, opts.precedence);
        info!("{meta}: {category}{}", if grabbed { ", grabbed" } else { "" });

        reports.push(NodeReport {
            path: path.clone(),
            outcome: NodeOutcome::Registered {
                grabbed,
                failed_probes: probed.failed,
            },
        });
        registry.push(DeviceHandle::new(
            source,
            meta,
            probed.capabilities,
            category,
            grabbed,
        ));
    }

    (registry, reports)
}
