//! Configuration schema definitions.
//!
//! This module defines the structure of the configuration file using serde.
//! Every section has defaults matching bench hardware, so an empty file (or
//! no file at all) is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial transport timing
    pub serial: SerialConfig,
    /// Per-board command budgets and firmware quirks
    pub boards: BoardsConfig,
    /// Device inventory location
    pub inventory: InventoryConfig,
    /// Test bench setup policy
    pub bench: BenchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serial transport configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Per-read timeout of the background reader in milliseconds
    pub read_timeout_ms: u64,
    /// Interval between buffer scans while waiting for a pattern
    pub poll_interval_ms: u64,
    /// Delay after opening the port before the first command
    pub open_settle_ms: u64,
    /// Delay after changing baud rate or flow control
    pub reconfigure_settle_ms: u64,
    /// Largest chunk read from the port in one call
    pub read_chunk_size: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 100,
            poll_interval_ms: 100,
            open_settle_ms: 500,
            reconfigure_settle_ms: 500,
            read_chunk_size: 1024,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn open_settle(&self) -> Duration {
        Duration::from_millis(self.open_settle_ms)
    }

    pub fn reconfigure_settle(&self) -> Duration {
        Duration::from_millis(self.reconfigure_settle_ms)
    }
}

/// Board family sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsConfig {
    pub eddington: EddingtonConfig,
    pub euler: EulerConfig,
    pub melody: MelodyConfig,
}

/// BC310X (Eddington) board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EddingtonConfig {
    /// Budget for a command's status line
    pub command_timeout_ms: u64,
}

impl Default for EddingtonConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 10_000,
        }
    }
}

impl EddingtonConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

/// BX310X (Euler) board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EulerConfig {
    /// Budget for a command's status line
    pub command_timeout_ms: u64,
    /// The firmware prints `READY` before it accepts commands after a
    /// factory restore; wait this long before the next command.
    pub ready_settle_ms: u64,
    /// Wait after a connection event for MTU exchange and BC Smart
    /// service registration to finish
    pub connection_settle_ms: u64,
    /// How long to look for the read request carrying a transfer id
    pub transfer_id_timeout_ms: u64,
}

impl Default for EulerConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2_000,
            ready_settle_ms: 3_000,
            connection_settle_ms: 500,
            transfer_id_timeout_ms: 5_000,
        }
    }
}

impl EulerConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn ready_settle(&self) -> Duration {
        Duration::from_millis(self.ready_settle_ms)
    }

    pub fn connection_settle(&self) -> Duration {
        Duration::from_millis(self.connection_settle_ms)
    }

    pub fn transfer_id_timeout(&self) -> Duration {
        Duration::from_millis(self.transfer_id_timeout_ms)
    }
}

/// BC127 (Melody) board settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyConfig {
    /// Budget for a command's status line
    pub command_timeout_ms: u64,
    /// Budget for free-form commands sent by a test
    pub custom_command_timeout_ms: u64,
    /// Budget for the `OK` following a raw data block
    pub raw_data_timeout_ms: u64,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2_000,
            custom_command_timeout_ms: 5_000,
            raw_data_timeout_ms: 1_000,
        }
    }
}

impl MelodyConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn custom_command_timeout(&self) -> Duration {
        Duration::from_millis(self.custom_command_timeout_ms)
    }

    pub fn raw_data_timeout(&self) -> Duration {
        Duration::from_millis(self.raw_data_timeout_ms)
    }
}

/// Device inventory section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Path to the JSON device list
    pub path: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("devices.json"),
        }
    }
}

/// Test bench section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Reset attempts during setup (first try plus retries)
    pub reset_attempts: u32,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self { reset_attempts: 2 }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Log file path (optional, appended to)
    pub file: Option<PathBuf>,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: LogFormat::Compact,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    Pretty,
    /// Compact format
    #[default]
    Compact,
}
