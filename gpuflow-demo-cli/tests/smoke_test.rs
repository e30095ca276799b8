//! Smoke tests for gpuflow-demo-cli
//!
//! These tests run the built binary against temporary storage directories.
//! Every command uses `--demo`, so no network access is needed.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn cli(storage: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gpuflow-demo"));
    command
        .env("GPUFLOW_DEMO_DIR", storage.path())
        .env_remove("GPUFLOW_RPC_URL")
        .env_remove("GPUFLOW_MARKETPLACE_ADDRESS")
        .env_remove("GPUFLOW_CREDENTIALS_URL");
    command
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        eprintln!("stdout: {}", stdout(output));
        eprintln!("stderr: {}", String::from_utf8_lossy(&output.stderr));
    }
    assert!(output.status.success(), "command failed");
}

/// Test that the CLI can show help
#[test]
fn test_cli_help() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage).arg("--help").output().expect("Failed to run CLI");
    assert_success(&output);

    let help = stdout(&output);
    for command in ["listings", "rent", "stop", "shell"] {
        assert!(help.contains(command), "Help should mention '{}'", command);
    }
}

/// Test that version is shown
#[test]
fn test_cli_version() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage).arg("--version").output().expect("Failed to run CLI");
    assert_success(&output);
    assert!(stdout(&output).contains("gpuflow-demo"));
}

/// Demo listings are available without any configuration
#[test]
fn test_listings_json_in_demo_mode() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["--demo", "listings", "--json"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);

    let listings: serde_json::Value =
        serde_json::from_str(stdout(&output).trim()).expect("listings output is JSON");
    let listings = listings.as_array().expect("listings is an array");
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0]["title"], "RTX 4090 Gaming Rig");
    assert_eq!(listings[1]["specsCID"], "QmDemo456");
}

/// The rate converter matches the first demo listing
#[test]
fn test_rate_conversion() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["rate", "1", "--json"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);

    let rate: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(rate["flowRateWeiPerSecond"], "277777777777777");
}

/// Renting a demo listing prints the demo credentials
#[test]
fn test_rent_in_demo_mode() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["--demo", "rent", "0", "--yes"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Rental started"));
    assert!(out.contains("123456789"));
}

/// Demo status reports both clients and the simulated balance
#[test]
fn test_status_in_demo_mode() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["--demo", "status"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Marketplace Status"));
    assert!(out.contains("1000.00 fDAIx"));
}

/// Oversized token decimals are rejected instead of crashing
#[test]
fn test_rate_rejects_huge_decimals() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["rate", "1", "--decimals", "18446744073709551615"])
        .output()
        .expect("Failed to run CLI");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("decimals"));
}

/// Unknown listings are reported as errors
#[test]
fn test_show_missing_listing_fails() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let output = cli(&storage)
        .args(["--demo", "show", "42"])
        .output()
        .expect("Failed to run CLI");
    assert!(!output.status.success());
}

/// Configuration is written to and removed from the storage directory
#[test]
fn test_config_set_show_clear() {
    let storage = TempDir::new().expect("Failed to create temp dir");

    let output = cli(&storage)
        .args([
            "config",
            "set",
            "--rpc-url",
            "http://localhost:8545",
            "--marketplace",
            "0x00000000000000000000000000000000000000c0",
            "--token",
            "fDAIx=0x00000000000000000000000000000000000000d1",
        ])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);
    assert!(storage.path().join("market.json").exists());

    let output = cli(&storage)
        .args(["config", "show", "--json"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);
    let config: serde_json::Value = serde_json::from_str(stdout(&output).trim()).unwrap();
    assert_eq!(config["chain"]["chain_id"], 80002);
    assert_eq!(
        config["chain"]["super_tokens"]["fDAIx"],
        "0x00000000000000000000000000000000000000d1"
    );

    let output = cli(&storage)
        .args(["config", "clear"])
        .output()
        .expect("Failed to run CLI");
    assert_success(&output);
    assert!(!storage.path().join("market.json").exists());
}

/// A scripted shell session keeps demo state between commands
#[test]
fn test_shell_session() {
    let storage = TempDir::new().expect("Failed to create temp dir");
    let mut child = cli(&storage)
        .args(["--demo", "shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to run CLI");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(b"create 1.5 QmShell Shell Rig\nshow 2\nrent 2\nstop 2\nhistory\nquit\n")
        .expect("Failed to write script");

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    assert_success(&output);

    let out = stdout(&output);
    assert!(out.contains("Listing created"));
    assert!(out.contains("Shell Rig"));
    assert!(out.contains("Rental started"));
    assert!(out.contains("Rental stopped"));
    assert!(out.contains("Payment History"));
}
