//! The adapter seam between the transport and a serial device.
//!
//! The transport drives real UART links and scripted mock boards through
//! [`SerialPortAdapter`]. Every supported module talks 8N1, so only the
//! settings a board can change at runtime are configurable.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings a port is opened with. Framing is always 8N1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub flow_control: FlowControl,
    /// Kept short so the background reader can notice a stop request
    /// between reads.
    pub read_timeout: Duration,
}

impl LineSettings {
    pub fn new(baud_rate: u32, read_timeout: Duration) -> Self {
        Self {
            baud_rate,
            flow_control: FlowControl::None,
            read_timeout,
        }
    }
}

/// UART flow control. Boards switched to flow control use XON/XOFF; none
/// of the supported modules is wired for RTS/CTS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowControl {
    None,
    Software,
}

impl FlowControl {
    /// The mode a board's "flow control on" command selects.
    pub fn enabled(enable: bool) -> Self {
        if enable {
            Self::Software
        } else {
            Self::None
        }
    }
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
        }
    }
}

/// Byte-level access to one serial device.
///
/// The transport holds two handles to the same device: one owned by the
/// background reader (obtained with [`SerialPortAdapter::try_clone_adapter`])
/// and one used by the calling context for writes and reconfiguration.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write all of `data`, returning its length.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read whatever is available into `buffer`.
    ///
    /// A read that times out with no data is reported as an `Io` error of
    /// kind `TimedOut` or `WouldBlock`; see [`is_idle_read`].
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    fn flush(&mut self) -> Result<(), PortError>;

    /// Port name as listed in the inventory, e.g. `/dev/ttyUSB0` or `COM3`.
    fn name(&self) -> &str;

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    fn set_baud_rate(&mut self, baud_rate: u32) -> Result<(), PortError>;

    fn set_flow_control(&mut self, flow_control: FlowControl) -> Result<(), PortError>;

    /// Drive the RTS line. The BC127 resets when RTS drops.
    fn write_request_to_send(&mut self, level: bool) -> Result<(), PortError>;

    /// Discard unread input and unsent output.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Open a second handle to the same device.
    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

/// Whether a read error only means "nothing arrived before the timeout".
pub fn is_idle_read(err: &PortError) -> bool {
    match err {
        PortError::Io(e) => matches!(
            e.kind(),
            std::io::ErrorKind::TimedOut
                | std::io::ErrorKind::WouldBlock
                | std::io::ErrorKind::Interrupted
        ),
        _ => false,
    }
}
