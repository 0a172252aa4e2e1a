//! Inventory loading, leasing and bench setup through the public API.

mod common;

use blehil::{BoardModel, CommonApi, ConfigLoader, DeviceInventory, HarnessError, TestBench};
use common::{fast_config, inventory_file, mock_board, record};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_inventory_from_file() {
    let file = inventory_file(&[
        record(BoardModel::Eddington, "/dev/ttyUSB0"),
        record(BoardModel::Melody, "/dev/ttyUSB1"),
    ]);

    let inventory = DeviceInventory::load(file.path()).unwrap();
    assert_eq!(inventory.len(), 2);

    let lease = inventory.acquire("BC127", "1.0").unwrap();
    assert_eq!(lease.record().port, "/dev/ttyUSB1");
    assert!(inventory.acquire("BC127", "1.0").is_none());
    assert!(inventory.acquire("BC310X", "1.0").is_some());

    drop(lease);
    assert!(inventory.acquire("BC127", "1.0").is_some());
}

#[test]
fn test_baud_rate_may_be_a_string() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"devices": [{{"manufacturer": "Acme", "model": "BX310X", "revision": "2.1",
            "port": "COM3", "baud": "115200"}}]}}"#
    )
    .unwrap();

    let inventory = DeviceInventory::load(file.path()).unwrap();
    let record = inventory.records().next().unwrap();
    assert_eq!(record.baud, 115_200);
}

#[test]
fn test_malformed_inventory_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"devices\": 3}}").unwrap();
    assert!(DeviceInventory::load(file.path()).is_err());
    assert!(DeviceInventory::load("/nonexistent/devices.json").is_err());
}

#[test]
fn test_unavailable_port_fails_setup_and_frees_device() {
    let inventory = DeviceInventory::from_records([record(
        BoardModel::Eddington,
        "/dev/blehil-no-such-port",
    )])
    .unwrap();

    let err = TestBench::acquire(&inventory, "BC310X", "1.0", &fast_config())
        .err()
        .unwrap();
    assert!(matches!(err, HarnessError::Setup(_)));
    assert!(!inventory.is_acquired(inventory.records().next().unwrap()));
}

#[test]
fn test_no_matching_device() {
    let inventory =
        DeviceInventory::from_records([record(BoardModel::Euler, "/dev/ttyUSB0")]).unwrap();

    let err = TestBench::acquire(&inventory, "BX310X", "9.9", &fast_config())
        .err()
        .unwrap();
    assert!(matches!(err, HarnessError::NoDevice { .. }));
}

#[test]
fn test_bench_resets_board_on_setup() {
    let (board, mock) = mock_board(BoardModel::Eddington);
    mock.reply_to("AT+RST\r", "Ready\r\n");
    mock.reply_to("AT+FMM\r", "+FMM: BC310X\r\nOK\r\n");

    let mut bench = TestBench::with_board(board, 1).unwrap();
    assert_eq!(bench.board_mut().model_id().as_deref(), Some("BC310X"));
    assert_eq!(mock.written_text(), vec!["AT+RST\r", "AT+FMM\r"]);

    drop(bench);
    assert_eq!(mock.rts(), Some(false));
}

#[test]
fn test_config_file_overrides_bench_policy() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[inventory]\npath = \"bench/devices.json\"\n\n[bench]\nreset_attempts = 4\n\n[boards.melody]\ncommand_timeout_ms = 750"
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).unwrap().into_config();
    assert_eq!(config.bench.reset_attempts, 4);
    assert_eq!(config.inventory.path.to_str(), Some("bench/devices.json"));
    assert_eq!(config.boards.melody.command_timeout_ms, 750);
    // untouched sections keep their defaults
    assert_eq!(config.boards.euler.command_timeout_ms, 2_000);
}
