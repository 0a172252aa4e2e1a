//! UART and GPIO control.

use super::types::{GpioDirection, GpioEvent, GpioLevel, GpioPull};
use super::{unsupported, BoardHandle};
use std::time::Duration;

pub trait HwApi: BoardHandle {
    /// Change the board's UART speed and follow it on the host side.
    fn set_uart_baudrate(&mut self, _baud_rate: u32) -> bool {
        unsupported(self.model(), "set_uart_baudrate");
        false
    }

    fn set_uart_flow_control(&mut self, _enable: bool) -> bool {
        unsupported(self.model(), "set_uart_flow_control");
        false
    }

    fn uart_baudrate(&mut self) -> Option<u32> {
        unsupported(self.model(), "uart_baudrate");
        None
    }

    /// Persist settings to non-volatile storage.
    fn save_settings(&mut self) -> bool {
        unsupported(self.model(), "save_settings");
        false
    }

    fn gpio_configure(&mut self, _gpio: u8, _direction: GpioDirection, _pull: GpioPull) -> bool {
        unsupported(self.model(), "gpio_configure");
        false
    }

    fn gpio_read(&mut self, _gpio: u8) -> Option<GpioLevel> {
        unsupported(self.model(), "gpio_read");
        None
    }

    fn gpio_write(&mut self, _gpio: u8, _level: GpioLevel) -> bool {
        unsupported(self.model(), "gpio_write");
        false
    }

    /// Collect every edge reported for `gpio` during `timeout`.
    fn gpio_wait_for_event(&mut self, _gpio: u8, _timeout: Duration) -> Vec<GpioEvent> {
        unsupported(self.model(), "gpio_wait_for_event");
        Vec::new()
    }
}
