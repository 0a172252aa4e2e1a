//! Device inventory and exclusive leases.
//!
//! The inventory is a JSON file listing every board wired to the bench:
//!
//! ```json
//! {"devices": [
//!   {"manufacturer": "Acme", "model": "BC310X", "revision": "1.0",
//!    "port": "/dev/ttyUSB0", "baud": 115200}
//! ]}
//! ```
//!
//! A test acquires a [`DeviceLease`] for a model and revision; the device
//! stays locked until the lease is dropped.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Inventory errors.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Failed to read inventory {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Device already added: {0}")]
    Duplicate(DeviceRecord),
}

/// One physical board on the bench.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub manufacturer: String,
    pub model: String,
    pub revision: String,
    pub port: String,
    #[serde(deserialize_with = "baud_from_number_or_string")]
    pub baud: u32,
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} rev {} on {} @ {}",
            self.manufacturer, self.model, self.revision, self.port, self.baud
        )
    }
}

fn baud_from_number_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Baud {
        Number(u32),
        Text(String),
    }

    match Baud::deserialize(deserializer)? {
        Baud::Number(n) => Ok(n),
        Baud::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct InventoryFile {
    devices: Vec<DeviceRecord>,
}

#[derive(Debug)]
struct Slot {
    record: DeviceRecord,
    acquired: Arc<AtomicBool>,
}

/// Registry of bench devices with acquire/release semantics.
#[derive(Debug, Default)]
pub struct DeviceInventory {
    slots: Vec<Slot>,
}

impl DeviceInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an inventory file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InventoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: InventoryFile =
            serde_json::from_str(&text).map_err(|source| InventoryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let inventory = Self::from_records(file.devices)?;
        info!(path = %path.display(), devices = inventory.slots.len(), "inventory loaded");
        Ok(inventory)
    }

    pub fn from_records(
        records: impl IntoIterator<Item = DeviceRecord>,
    ) -> Result<Self, InventoryError> {
        let mut inventory = Self::new();
        for record in records {
            inventory.add(record)?;
        }
        Ok(inventory)
    }

    /// Register a device. Identical records are rejected.
    pub fn add(&mut self, record: DeviceRecord) -> Result<(), InventoryError> {
        if self.slots.iter().any(|slot| slot.record == record) {
            return Err(InventoryError::Duplicate(record));
        }
        self.slots.push(Slot {
            record,
            acquired: Arc::new(AtomicBool::new(false)),
        });
        Ok(())
    }

    /// Lock the first free device of `model` and `revision`.
    pub fn acquire(&self, model: &str, revision: &str) -> Option<DeviceLease> {
        self.slots
            .iter()
            .filter(|slot| slot.record.model == model && slot.record.revision == revision)
            .find(|slot| {
                slot.acquired
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            })
            .map(|slot| {
                debug!(device = %slot.record, "device acquired");
                DeviceLease {
                    record: slot.record.clone(),
                    acquired: slot.acquired.clone(),
                }
            })
    }

    pub fn records(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.slots.iter().map(|slot| &slot.record)
    }

    pub fn is_acquired(&self, record: &DeviceRecord) -> bool {
        self.slots
            .iter()
            .any(|slot| &slot.record == record && slot.acquired.load(Ordering::Acquire))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Exclusive use of one inventory device. Dropping it releases the device.
#[derive(Debug)]
pub struct DeviceLease {
    record: DeviceRecord,
    acquired: Arc<AtomicBool>,
}

impl DeviceLease {
    /// A lease over a device that is not tracked by any inventory.
    pub fn detached(record: DeviceRecord) -> Self {
        Self {
            record,
            acquired: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }
}

impl Drop for DeviceLease {
    fn drop(&mut self) {
        self.acquired.store(false, Ordering::Release);
        debug!(device = %self.record, "device released");
    }
}
