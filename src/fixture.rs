//! Per-test board setup and teardown.
//!
//! A [`TestBench`] owns one leased board from acquisition to drop: the
//! serial port is opened and the board reset before the test body runs,
//! and the port is closed and the lease released when the bench goes out
//! of scope, whether the test passed or not.

use crate::board::open_board;
use crate::capability::{Board, BoardHandle, CommonApi};
use crate::config::Config;
use crate::error::{HarnessError, HarnessResult};
use crate::inventory::DeviceInventory;
use tracing::{info, warn};

/// Reset `board`, retrying up to `attempts` times in total.
pub fn reset_with_retry(board: &mut dyn Board, attempts: u32) -> bool {
    for attempt in 1..=attempts {
        if board.reset() {
            return true;
        }
        warn!(board = %board.model(), attempt, attempts, "reset failed");
    }
    false
}

pub struct TestBench {
    board: Box<dyn Board>,
}

impl TestBench {
    /// Lease a matching device, open its port and reset it.
    ///
    /// # Errors
    ///
    /// - `HarnessError::NoDevice` when every matching device is leased or
    ///   none is listed.
    /// - `HarnessError::Setup` when the port does not open or the board
    ///   does not come back from reset.
    pub fn acquire(
        inventory: &DeviceInventory,
        model: &str,
        revision: &str,
        config: &Config,
    ) -> HarnessResult<Self> {
        let lease = inventory
            .acquire(model, revision)
            .ok_or_else(|| HarnessError::NoDevice {
                model: model.to_owned(),
                revision: revision.to_owned(),
            })?;
        info!(device = %lease.record(), "device acquired");
        let board = open_board(lease, config)?;
        Self::with_board(board, config.bench.reset_attempts)
    }

    /// Take over a board whose port is already open and reset it.
    ///
    /// # Errors
    ///
    /// `HarnessError::Setup` when every reset attempt fails; the port is
    /// closed before returning.
    pub fn with_board(board: Box<dyn Board>, reset_attempts: u32) -> HarnessResult<Self> {
        let mut bench = Self { board };
        if !reset_with_retry(bench.board.as_mut(), reset_attempts) {
            return Err(HarnessError::setup(format!(
                "{} on {} did not reset after {reset_attempts} attempts",
                bench.board.model(),
                bench.board.core().port_name()
            )));
        }
        Ok(bench)
    }

    pub fn board(&self) -> &dyn Board {
        self.board.as_ref()
    }

    pub fn board_mut(&mut self) -> &mut dyn Board {
        self.board.as_mut()
    }
}

impl Drop for TestBench {
    fn drop(&mut self) {
        let core = self.board.core_mut();
        if core.is_open() {
            core.close_serial_port();
        }
        info!(port = %self.board.core().port_name(), "test bench released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::build_board;
    use crate::inventory::DeviceRecord;
    use crate::port::MockSerialPort;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.serial.read_timeout_ms = 5;
        config.serial.poll_interval_ms = 2;
        config.serial.open_settle_ms = 0;
        config.serial.reconfigure_settle_ms = 0;
        config.boards.melody.command_timeout_ms = 200;
        config
    }

    fn melody_record() -> DeviceRecord {
        DeviceRecord {
            manufacturer: "Sierra Wireless".into(),
            model: "BC127".into(),
            revision: "7.2".into(),
            port: "MOCK0".into(),
            baud: 9600,
        }
    }

    fn mock_board(inventory: &DeviceInventory, mock: &MockSerialPort) -> Box<dyn Board> {
        let lease = inventory.acquire("BC127", "7.2").unwrap();
        let mut board = build_board(lease, &fast_config()).unwrap();
        assert!(board.core_mut().open_serial_port_with(Box::new(mock.clone())));
        board
    }

    #[test]
    fn test_reset_retried_once() {
        let inventory = DeviceInventory::from_records([melody_record()]).unwrap();
        let mock = MockSerialPort::new("MOCK0");
        mock.reply_to("RESET\r", "ERROR\r");
        mock.reply_to("RESET\r", "Ready\r");

        let bench = TestBench::with_board(mock_board(&inventory, &mock), 2).unwrap();
        assert_eq!(mock.written_text(), vec!["RESET\r", "RESET\r"]);
        assert!(bench.board().core().is_open());
    }

    #[test]
    fn test_reset_failure_is_setup_error() {
        let inventory = DeviceInventory::from_records([melody_record()]).unwrap();
        let mock = MockSerialPort::new("MOCK0");
        mock.reply_to("RESET\r", "ERROR\r");
        mock.reply_to("RESET\r", "ERROR\r");

        let err = TestBench::with_board(mock_board(&inventory, &mock), 2)
            .err()
            .unwrap();
        assert!(matches!(err, HarnessError::Setup(_)));
        // the failed bench released its lease
        assert!(inventory.acquire("BC127", "7.2").is_some());
    }

    #[test]
    fn test_drop_closes_port_and_releases_lease() {
        let inventory = DeviceInventory::from_records([melody_record()]).unwrap();
        let mock = MockSerialPort::new("MOCK0");
        mock.reply_to("RESET\r", "Ready\r");

        let mut bench = TestBench::with_board(mock_board(&inventory, &mock), 1).unwrap();
        assert_eq!(bench.board_mut().model_id().as_deref(), Some("BC127"));
        assert!(inventory.acquire("BC127", "7.2").is_none());

        drop(bench);
        assert_eq!(mock.rts(), Some(false));
        assert!(inventory.acquire("BC127", "7.2").is_some());
    }

    #[test]
    fn test_no_device() {
        let inventory = DeviceInventory::new();
        let err = TestBench::acquire(&inventory, "BX310X", "1.0", &fast_config())
            .err()
            .unwrap();
        assert!(matches!(err, HarnessError::NoDevice { .. }));
    }
}
