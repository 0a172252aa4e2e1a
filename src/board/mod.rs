//! Board drivers.
//!
//! One module per board family. Each driver owns a [`BoardCore`] and
//! implements the capability traits with its own command grammar.

mod at;
mod base;
pub mod eddington;
pub mod euler;
pub mod melody;

pub use base::BoardCore;
pub use eddington::Eddington;
pub use euler::Euler;
pub use melody::Melody;

use crate::capability::{Board, BoardHandle};
use crate::config::Config;
use crate::error::{HarnessError, HarnessResult};
use crate::inventory::DeviceLease;
use crate::transport::TransportOptions;
use std::fmt;
use std::str::FromStr;

/// Supported board families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardModel {
    /// BC310X, AT command set with native BLE sessions.
    Eddington,
    /// BX310X, AT command set with server-assigned GATT handles.
    Euler,
    /// BC127, plain-text command set without sessions.
    Melody,
}

impl BoardModel {
    pub const ALL: [BoardModel; 3] = [Self::Eddington, Self::Euler, Self::Melody];

    /// Model identifier as listed in the inventory.
    pub fn model_id(self) -> &'static str {
        match self {
            Self::Eddington => "BC310X",
            Self::Euler => "BX310X",
            Self::Melody => "BC127",
        }
    }

    pub fn from_model_id(model_id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|model| model.model_id().eq_ignore_ascii_case(model_id))
    }
}

impl fmt::Display for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Eddington => "Eddington",
            Self::Euler => "Euler",
            Self::Melody => "Melody",
        };
        f.write_str(name)
    }
}

impl FromStr for BoardModel {
    type Err = HarnessError;

    /// Accepts a model id (`BC310X`) or a family name (`eddington`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_model_id(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|model| model.to_string().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| HarnessError::invalid_argument(format!("unknown board model {s:?}")))
    }
}

/// Build the driver for a leased device without opening its port.
pub fn build_board(lease: DeviceLease, config: &Config) -> HarnessResult<Box<dyn Board>> {
    let model: BoardModel = lease.record().model.parse()?;
    let core = BoardCore::new(lease, TransportOptions::from(&config.serial));
    Ok(match model {
        BoardModel::Eddington => Box::new(Eddington::new(core, &config.boards.eddington)),
        BoardModel::Euler => Box::new(Euler::new(core, &config.boards.euler)),
        BoardModel::Melody => Box::new(Melody::new(core, &config.boards.melody)),
    })
}

/// Build the driver for a leased device and open its port at the
/// inventory baud rate.
pub fn open_board(lease: DeviceLease, config: &Config) -> HarnessResult<Box<dyn Board>> {
    let mut board = build_board(lease, config)?;
    if !board.core_mut().open_serial_port(None) {
        return Err(HarnessError::setup(format!(
            "cannot open serial port {}",
            board.core().port_name()
        )));
    }
    Ok(board)
}
