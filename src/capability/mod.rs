//! Vendor-neutral capability surface.
//!
//! Each board family implements the same traits with its own wire encoding.
//! Every method has a default that logs "not supported" and returns the
//! negative value, so a board only overrides what its firmware can do.
//! Device conditions never surface as errors: operations answer `false`,
//! `None` or an empty list.

pub mod ble;
pub mod common;
pub mod hw;
pub mod types;

pub use ble::{BcSmartApi, BleApi, GapApi, GattApi};
pub use common::CommonApi;
pub use hw::HwApi;
pub use types::*;

use crate::board::{BoardCore, BoardModel};
use std::time::Duration;
use tracing::warn;

/// Default budget for `wait_for_connection`.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
/// Default budget for `wait_for_disconnection` and GATT waits.
pub const GATT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default budget for BC Smart data and command waits.
pub const BC_SMART_TIMEOUT: Duration = Duration::from_secs(2);
/// Default budget for GPIO event collection.
pub const GPIO_EVENT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of connection attempts.
pub const CONNECT_ATTEMPTS: u32 = 2;

/// Access to the board's serial line and identity.
pub trait BoardHandle {
    fn core(&self) -> &BoardCore;

    fn core_mut(&mut self) -> &mut BoardCore;

    fn model(&self) -> BoardModel;
}

/// Log an operation the board's firmware does not offer.
pub(crate) fn unsupported(model: BoardModel, operation: &str) {
    warn!(board = %model, operation, "not supported on {}", model.model_id());
}

/// Log a parameter the board's firmware does not take.
pub(crate) fn ignored(model: BoardModel, parameter: &str) {
    warn!(board = %model, parameter, "parameter ignored on {}", model.model_id());
}

/// Everything a test can ask of a board.
pub trait Board: CommonApi + HwApi + BleApi + GapApi + GattApi + BcSmartApi + Send {}

impl<T> Board for T where T: CommonApi + HwApi + BleApi + GapApi + GattApi + BcSmartApi + Send {}
