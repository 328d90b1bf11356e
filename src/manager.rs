//! Device registry.
//!
//! [`DeviceRegistry`] is the ordered list of classified [`DeviceHandle`]s built
//! once at startup. Insertion order is discovery order and is the order devices
//! are serviced within a tick; it carries no priority.
//!
//! The registry is only extended during enumeration. The dispatch loop takes
//! it by value, so nothing can add devices once the loop is running.

use crate::category::DeviceCategory;
use crate::capabilities::CapabilitySummary;
use crate::config::DiscoveryConfig;
use crate::device::DeviceHandle;
use crate::enumerate::{enumerate_with_report, EnumerateOptions, NodeOpener, NodeReport};
use crate::error::{Error, Result};
use crate::metadata::DeviceMeta;
use log::info;
use serde::Serialize;

/// Ordered, owned collection of classified devices.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceHandle>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover, open and classify every node described by `config`.
    ///
    /// Fails with [`Error::NoInputDevices`] when nothing matches or nothing opens.
    #[cfg(target_os = "linux")]
    pub fn discover(
        config: &DiscoveryConfig,
        opts: EnumerateOptions,
    ) -> Result<(Self, Vec<NodeReport>)> {
        use crate::backends::linux::{find_nodes, EvdevOpener};

        let paths = find_nodes(&config.directory, &config.prefix)?;
        Self::from_paths(config, &paths, &mut EvdevOpener, opts)
    }

    /// Enumerate `paths` through `opener`, enforcing that at least one device results.
    pub fn from_paths(
        config: &DiscoveryConfig,
        paths: &[std::path::PathBuf],
        opener: &mut dyn NodeOpener,
        opts: EnumerateOptions,
    ) -> Result<(Self, Vec<NodeReport>)> {
        info!(
            "Discovered {} node(s) matching {}* in {}",
            paths.len(),
            config.prefix,
            config.directory.display()
        );

        let (registry, reports) = enumerate_with_report(paths, opener, opts);
        if registry.is_empty() {
            return Err(Error::NoInputDevices {
                directory: config.directory.clone(),
                prefix: config.prefix.clone(),
            });
        }

        info!("Registered {} device(s)", registry.len());
        Ok((registry, reports))
    }

    pub(crate) fn push(&mut self, handle: DeviceHandle) {
        self.devices.push(handle);
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> &[DeviceHandle] {
        &self.devices
    }

    pub(crate) fn devices_mut(&mut self) -> &mut [DeviceHandle] {
        &mut self.devices
    }

    /// Categories in registry order.
    pub fn categories(&self) -> Vec<DeviceCategory> {
        self.devices.iter().map(|d| d.category()).collect()
    }

    /// Release and close every handle in registry order.
    pub fn release_all(&mut self) {
        for device in &mut self.devices {
            device.release();
        }
    }

    /// Serializable view of the registry.
    pub fn report(&self) -> Vec<DeviceReport> {
        self.devices
            .iter()
            .map(|d| DeviceReport {
                meta: d.meta().clone(),
                category: d.category(),
                grabbed: d.is_grabbed(),
                capabilities: d.capabilities().summary(),
            })
            .collect()
    }
}

/// One registry entry as printed by `--list`.
#[derive(Clone, Debug, Serialize)]
pub struct DeviceReport {
    #[serde(flatten)]
    pub meta: DeviceMeta,
    pub category: DeviceCategory,
    pub grabbed: bool,
    pub capabilities: CapabilitySummary,
}
