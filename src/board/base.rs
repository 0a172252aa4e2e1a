//! State shared by every board driver: the inventory lease and the serial line.

use crate::inventory::{DeviceLease, DeviceRecord};
use crate::port::SerialPortAdapter;
use crate::transport::{SerialTransport, TransportOptions};
use tracing::warn;

/// Inventory lease plus the transport to the leased device.
///
/// Serial-level failures are logged and reported as `false`.
#[derive(Debug)]
pub struct BoardCore {
    // dropped before the lease so the port is closed while still locked
    transport: SerialTransport,
    lease: DeviceLease,
}

impl BoardCore {
    pub fn new(lease: DeviceLease, options: TransportOptions) -> Self {
        let transport = SerialTransport::new(lease.record().port.clone(), options);
        Self { transport, lease }
    }

    pub fn record(&self) -> &DeviceRecord {
        self.lease.record()
    }

    pub fn manufacturer(&self) -> &str {
        &self.record().manufacturer
    }

    pub fn model(&self) -> &str {
        &self.record().model
    }

    pub fn revision(&self) -> &str {
        &self.record().revision
    }

    pub fn default_baud_rate(&self) -> u32 {
        self.record().baud
    }

    pub fn port_name(&self) -> &str {
        &self.record().port
    }

    /// Open the leased port, at the inventory baud rate unless overridden.
    pub fn open_serial_port(&mut self, baud_rate: Option<u32>) -> bool {
        let baud_rate = baud_rate.unwrap_or_else(|| self.default_baud_rate());
        match self.transport.open(baud_rate) {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %self.port_name(), baud_rate, error = %e, "failed to open serial port");
                false
            }
        }
    }

    /// Run the board over an already opened adapter.
    pub fn open_serial_port_with(&mut self, port: Box<dyn SerialPortAdapter>) -> bool {
        match self.transport.attach(port) {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %self.port_name(), error = %e, "failed to attach serial port");
                false
            }
        }
    }

    pub fn close_serial_port(&mut self) -> bool {
        match self.transport.close() {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %self.port_name(), error = %e, "failed to close serial port");
                false
            }
        }
    }

    /// Follow a board-side baud rate change on the host.
    pub fn set_serial_baudrate(&mut self, baud_rate: u32) -> bool {
        match self.transport.set_baud_rate(baud_rate) {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %self.port_name(), baud_rate, error = %e, "failed to change baud rate");
                false
            }
        }
    }

    pub fn serial_flow_control(&mut self, enable: bool) -> bool {
        match self.transport.set_flow_control(enable) {
            Ok(()) => true,
            Err(e) => {
                warn!(port = %self.port_name(), enable, error = %e, "failed to change flow control");
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    pub fn transport(&self) -> &SerialTransport {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut SerialTransport {
        &mut self.transport
    }
}
