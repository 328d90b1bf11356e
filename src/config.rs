//! Runtime configuration.
//!
//! Loaded from an optional TOML file. Every section and field has a default, so
//! an empty or missing file yields the stock behavior: grab every
//! `/dev/input/event*` node, busy-poll, drop partial records, let gamepad
//! buttons override other categories.
//!
//! ```toml
//! [discovery]
//! directory = "/dev/input"
//! prefix = "event"
//! grab = true
//!
//! [poll]
//! mode = "frame_rate"   # "busy" | "interval" | "frame_rate"
//! interval_ms = 4
//! fps = 60
//!
//! [decode]
//! carry_partial_records = false
//!
//! [classify]
//! gamepad_precedence = "override"   # or "union"
//!
//! [render]
//! width = 640
//! height = 480
//! clear_color = [1.0, 0.0, 0.0, 1.0]
//!
//! [log]
//! level = "info"
//! trace_sync = false
//! ```

use crate::category::GamepadPrecedence;
use crate::enumerate::EnumerateOptions;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file when no CLI path is given.
pub const CONFIG_ENV: &str = "EVLOOP_CONFIG";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub poll: PollConfig,
    pub decode: DecodeConfig,
    pub classify: ClassifyConfig,
    pub render: RenderConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    pub directory: PathBuf,
    /// File-name prefix of candidate nodes.
    pub prefix: String,
    pub grab: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/dev/input"),
            prefix: "event".into(),
            grab: true,
        }
    }
}

/// How the loop waits for device readiness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollMode {
    /// Zero timeout; the loop spins.
    #[default]
    Busy,
    /// Wait at most `interval_ms`.
    Interval,
    /// Wait at most one frame period at `fps`.
    FrameRate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    pub mode: PollMode,
    pub interval_ms: u64,
    pub fps: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            mode: PollMode::Busy,
            interval_ms: 4,
            fps: 60,
        }
    }
}

impl PollConfig {
    /// Upper bound on each readiness wait.
    pub fn timeout(&self) -> Duration {
        match self.mode {
            PollMode::Busy => Duration::ZERO,
            PollMode::Interval => Duration::from_millis(self.interval_ms),
            PollMode::FrameRate => Duration::from_secs(1) / self.fps.max(1),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecodeConfig {
    /// Keep a trailing partial record and complete it with the next read.
    pub carry_partial_records: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    pub gamepad_precedence: GamepadPrecedence,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            clear_color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Include `EV_SYN` records in record logs.
    pub trace_sync: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            trace_sync: false,
        }
    }
}

impl Config {
    /// Parse TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load from an explicit path, else `$EVLOOP_CONFIG`, else defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        match cli_path {
            Some(p) => Self::load(p),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => Self::load(Path::new(&p)),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn enumerate_options(&self) -> EnumerateOptions {
        EnumerateOptions {
            grab: self.discovery.grab,
            precedence: self.classify.gamepad_precedence,
        }
    }
}
