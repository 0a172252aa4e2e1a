//! Shared test utilities for board integration tests.
//!
//! This module provides common test infrastructure including:
//! - Configuration tuned for scripted ports (no settle delays, short budgets)
//! - Boards attached to a `MockSerialPort`
//! - Inventory files written to temporary storage

#![allow(dead_code)]

use blehil::port::MockSerialPort;
use blehil::{build_board, Board, BoardHandle, BoardModel, Config, DeviceLease, DeviceRecord};
use std::io::Write;
use tempfile::NamedTempFile;

/// Configuration for scripted ports: no settle delays, short command budgets.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.serial.read_timeout_ms = 5;
    config.serial.poll_interval_ms = 2;
    config.serial.open_settle_ms = 0;
    config.serial.reconfigure_settle_ms = 0;
    config.boards.eddington.command_timeout_ms = 300;
    config.boards.euler.command_timeout_ms = 300;
    config.boards.euler.ready_settle_ms = 0;
    config.boards.euler.connection_settle_ms = 0;
    config.boards.euler.transfer_id_timeout_ms = 100;
    config.boards.melody.command_timeout_ms = 300;
    config.boards.melody.custom_command_timeout_ms = 300;
    config.boards.melody.raw_data_timeout_ms = 100;
    config
}

/// An inventory record for `model` on `port`.
pub fn record(model: BoardModel, port: &str) -> DeviceRecord {
    DeviceRecord {
        manufacturer: "Acme".to_string(),
        model: model.model_id().to_string(),
        revision: "1.0".to_string(),
        port: port.to_string(),
        baud: 115_200,
    }
}

/// A board of `model` whose port is a fresh mock.
///
/// # Example
/// ```ignore
/// let (mut board, mock) = mock_board(BoardModel::Eddington);
/// mock.reply_to("AT+FMI\r", "+FMI: Acme Corp\r\nOK\r\n");
/// assert_eq!(board.manufacturer_id().as_deref(), Some("Acme Corp"));
/// ```
pub fn mock_board(model: BoardModel) -> (Box<dyn Board>, MockSerialPort) {
    let lease = DeviceLease::detached(record(model, "MOCK0"));
    let mut board = build_board(lease, &fast_config()).expect("known model");
    let mock = MockSerialPort::new("MOCK0");
    assert!(board.core_mut().open_serial_port_with(Box::new(mock.clone())));
    (board, mock)
}

/// Write an inventory file holding `records`.
pub fn inventory_file(records: &[DeviceRecord]) -> NamedTempFile {
    let devices: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "manufacturer": r.manufacturer,
                "model": r.model,
                "revision": r.revision,
                "port": r.port,
                "baud": r.baud,
            })
        })
        .collect();
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "{}", serde_json::json!({ "devices": devices })).expect("write inventory");
    file
}
