//! Serial line failures.
//!
//! Transport failures stay separate from protocol outcomes: a board that
//! answers `ERROR` is not a `PortError`, an unplugged adapter is.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortError {
    /// No device behind the port name, e.g. the USB adapter is unplugged.
    #[error("No serial device at {0}")]
    NoDevice(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The driver refused a line setting (baud rate, flow control).
    #[error("Line settings rejected: {0}")]
    LineSettings(String),

    /// A write did not complete within the port timeout.
    #[error("Write stalled for {0:?}")]
    Stalled(Duration),

    #[error("Port is already open")]
    AlreadyOpen,

    #[error("Port is not open")]
    NotOpen,

    #[error("Serial driver error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    pub fn no_device(port_name: impl Into<String>) -> Self {
        Self::NoDevice(port_name.into())
    }

    pub fn line_settings(message: impl Into<String>) -> Self {
        Self::LineSettings(message.into())
    }
}
