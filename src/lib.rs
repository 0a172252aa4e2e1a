//! BLE Hardware-in-the-Loop Test Library
//!
//! This library drives Bluetooth Low Energy modules over a UART so that
//! system tests can be written once against a vendor-neutral capability
//! surface and run against any supported board.
//!
//! # Modules
//!
//! - `port`: Port abstraction layer (hardware and scripted mock ports)
//! - `transport`: Background reader, receive buffer and pattern matching
//! - `protocol`: Command round-trip, status classification, wire encodings
//! - `capability`: Capability traits and value types shared by all boards
//! - `board`: Board drivers (BC310X, BX310X, BC127)
//! - `inventory`: Device inventory and leasing
//! - `fixture`: Per-test bench setup and teardown
//! - `config`: Configuration management with TOML support
//! - `logging`: Tracing subscriber setup
//! - `error`: Unified error handling
//!
//! # Example
//!
//! ```rust,no_run
//! use blehil::{ConfigLoader, DeviceInventory, TestBench};
//! use blehil::capability::ScanResultFormat;
//!
//! let config = ConfigLoader::load()?.into_config();
//! let inventory = DeviceInventory::load(&config.inventory.path)?;
//! let mut bench = TestBench::acquire(&inventory, "BC310X", "1.0", &config)?;
//!
//! let board = bench.board_mut();
//! assert!(board.set_advertising_enable(true, Some(&[0x02, 0x01, 0x06]), None));
//! let found = board.scan(2, ScanResultFormat::Default);
//! println!("{:?}", found);
//! # Ok::<(), blehil::HarnessError>(())
//! ```

pub mod board;
pub mod capability;
pub mod config;
pub mod error;
pub mod fixture;
pub mod inventory;
pub mod logging;
pub mod port;
pub mod protocol;
pub mod transport;

// Re-export commonly used types for convenience
pub use board::{build_board, open_board, BoardCore, BoardModel, Eddington, Euler, Melody};
pub use capability::{
    BcSmartApi, Bdaddr, BleApi, BleSession, Board, BoardHandle, CommonApi, GapApi, GattApi, HwApi,
};
pub use error::{HarnessError, HarnessResult};
pub use fixture::{reset_with_retry, TestBench};
pub use inventory::{DeviceInventory, DeviceLease, DeviceRecord, InventoryError};
pub use port::{FlowControl, MockSerialPort, PortError, SerialPortAdapter};
pub use protocol::CommandResult;
pub use transport::{SerialTransport, TransportOptions};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
