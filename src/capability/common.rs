//! Identity and lifecycle operations.

use super::{unsupported, BoardHandle};

pub trait CommonApi: BoardHandle {
    /// Send a raw command line without any prefix.
    fn send_custom_command(&mut self, _command: &str) -> bool {
        unsupported(self.model(), "send_custom_command");
        false
    }

    fn reset(&mut self) -> bool;

    fn supported_commands(&mut self) -> Option<Vec<String>>;

    /// Restore the factory configuration.
    fn restore_defaults(&mut self) -> bool;

    fn manufacturer_id(&mut self) -> Option<String>;

    fn model_id(&mut self) -> Option<String>;

    fn revision_id(&mut self) -> Option<String>;

    fn bt_mac(&mut self) -> Option<String> {
        unsupported(self.model(), "bt_mac");
        None
    }

    /// Factory serial number.
    fn factory_serial_number(&mut self) -> Option<String> {
        unsupported(self.model(), "factory_serial_number");
        None
    }

    /// Session id of the remote controller, 0 when there is none.
    fn remote_controller(&mut self) -> Option<u32> {
        unsupported(self.model(), "remote_controller");
        None
    }

    fn set_remote_controller(&mut self, _session_id: u32) -> bool {
        unsupported(self.model(), "set_remote_controller");
        false
    }
}
