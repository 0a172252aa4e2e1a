//! Smoke tests against boards wired to the bench.
//!
//! Skipped unless built with the `hardware-tests` feature, and ignored by
//! default even then.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export BLEHIL_INVENTORY_PATH=/etc/bench/devices.json
//! export TEST_MODEL=BC310X               # model id as listed in the inventory
//! export TEST_REVISION=1.0
//!
//! cargo test --features hardware-tests --test hardware_smoke -- --ignored
//! ```

#![cfg(feature = "hardware-tests")]

use blehil::capability::ScanResultFormat;
use blehil::{BleApi, CommonApi, ConfigLoader, DeviceInventory, GapApi, TestBench};
use std::env;

/// Model and revision under test, if the environment names one.
fn target() -> Option<(String, String)> {
    let model = env::var("TEST_MODEL").ok();
    if model.is_none() {
        println!("Skipping hardware test: TEST_MODEL not set");
    }
    let revision = env::var("TEST_REVISION").unwrap_or_else(|_| "1.0".to_string());
    Some((model?, revision))
}

fn bench(model: &str, revision: &str) -> TestBench {
    let config = ConfigLoader::load().expect("config").into_config();
    let inventory = DeviceInventory::load(&config.inventory.path).expect("inventory");
    TestBench::acquire(&inventory, model, revision, &config).expect("bench setup")
}

#[test]
#[ignore] // Run with --ignored flag
fn test_identity() {
    let Some((model, revision)) = target() else {
        return;
    };
    let mut bench = bench(&model, &revision);
    let board = bench.board_mut();

    assert!(board.manufacturer_id().is_some());
    assert_eq!(board.model_id().as_deref(), Some(model.as_str()));
    assert!(board.revision_id().is_some());
    assert!(board.local_address().is_some());
}

#[test]
#[ignore]
fn test_advertise_then_scan() {
    let Some((model, revision)) = target() else {
        return;
    };
    let mut bench = bench(&model, &revision);
    let board = bench.board_mut();

    assert!(board.set_advertising_enable(true, Some(&[0x02, 0x01, 0x06]), None));
    assert!(board.set_advertising_enable(false, None, None));
    let results = board.scan(2, ScanResultFormat::Default);
    assert!(results.is_some());
}

#[test]
#[ignore]
fn test_restore_defaults() {
    let Some((model, revision)) = target() else {
        return;
    };
    let mut bench = bench(&model, &revision);
    assert!(bench.board_mut().restore_defaults());
    assert!(bench.board_mut().reset());
}
