#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn quote(state_path: &Path, quantity: Option<&str>) -> Value {
    let mut cmd = Command::new(cargo_bin!("plot-checkout"));
    cmd.env("PLOT_CHECKOUT_COUPON_DELAY_MS", "0")
        .arg("quote")
        .arg("--state-path")
        .arg(state_path);
    if let Some(quantity) = quantity {
        cmd.args(["--quantity", quantity]);
    }

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_rocksdb_quantity_recovery() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("test_db");

    // 1. First run: choose 8 plots
    let first = quote(&state_path, Some("8"));
    assert_eq!(first["pricing"]["quantity"], 8);

    // 2. Second run without a quantity: restored from the database
    let second = quote(&state_path, None);
    assert_eq!(second["pricing"]["quantity"], 8);
    assert_eq!(second["pricing"]["discount_label"], "VOLUME DISCOUNT");

    // 3. An explicit quantity still wins over the stored one
    let third = quote(&state_path, Some("2"));
    assert_eq!(third["pricing"]["quantity"], 2);
}

#[test]
fn test_quantity_kept_when_order_inputs_are_unreadable() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("test_db");
    let plots = dir.path().join("plots.csv");
    fs::write(&plots, "plot,certificate_name\nfirst,Aoife\n").unwrap();
    let missing = dir.path().join("missing.json");

    for (plots, delivery) in [
        (plots.as_path(), Path::new("tests/fixtures/delivery.json")),
        (Path::new("tests/fixtures/plots.csv"), missing.as_path()),
    ] {
        let output = Command::new(cargo_bin!("plot-checkout"))
            .env("PLOT_CHECKOUT_COUPON_DELAY_MS", "0")
            .env("PLOT_CHECKOUT_APP_ID", "sandbox-app")
            .env("PLOT_CHECKOUT_LOCATION_ID", "LOC1")
            .env("PLOT_CHECKOUT_BACKEND_URL", "http://127.0.0.1:9")
            .args(["order", "--quantity", "7", "--card-nonce", "cnon:card-nonce-ok"])
            .arg("--plots")
            .arg(plots)
            .arg("--delivery")
            .arg(delivery)
            .arg("--state-path")
            .arg(&state_path)
            .output()
            .expect("Failed to execute command");
        assert!(!output.status.success());

        let restored = quote(&state_path, None);
        assert_eq!(restored["pricing"]["quantity"], 7);
        fs::remove_dir_all(&state_path).unwrap();
    }
}
