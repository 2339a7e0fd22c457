// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual mdcap binary against synthesized captures.

mod common;

use std::process::{Command, Output};

use common::*;

/// Run mdcap with arguments
fn run(args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_mdcap");
    Command::new(bin)
        .args(args)
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run mdcap and assert success
fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {:?}\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run mdcap and assert exit code 1
fn run_fail(args: &[&str]) -> Output {
    let output = run(args);
    assert_eq!(
        output.status.code(),
        Some(1),
        "Command should have failed: {:?}\nstdout: {}",
        args,
        String::from_utf8_lossy(&output.stdout)
    );
    output
}

fn sample_capture(name: &str) -> TempCapture {
    let packets: Vec<Vec<u8>> = (0..10)
        .map(|_| {
            udp_packet(&[
                trade("AAPL", 1_500_000, 100, b'B'),
                quote("MSFT", 2_500_000, 500, 2_505_000, 300),
            ])
        })
        .collect();
    TempCapture::new(name, &pcapng_capture(&packets))
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_ok(&["--help"]);
    assert!(output.contains("pcap"));
    assert!(output.contains("scan"));
    assert!(output.contains("info"));
    assert!(output.contains("caps"));
}

#[test]
fn test_cli_version() {
    let output = run_ok(&["--version"]);
    assert!(output.contains("mdcap"));
}

#[test]
fn test_cli_unknown_command() {
    let output = run(&["frobnicate"]);
    assert!(!output.status.success());
}

// ============================================================================
// Scan
// ============================================================================

#[test]
fn test_scan_summary() {
    let capture = sample_capture("scan_summary");
    let output = run_ok(&["scan", capture.path_str()]);
    assert!(output.contains("Format: pcapng"));
    assert!(output.contains("Trade Report"));
    assert!(output.contains("Messages decoded: 20"));
    assert!(output.contains("Status: completed"));
}

#[test]
fn test_scan_json() {
    let capture = sample_capture("scan_json");
    let output = run_ok(&["scan", capture.path_str(), "--json", "--matcher", "scalar"]);
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["stats"]["messages_decoded"], 20);
    assert_eq!(report["stats"]["packets"], 10);
    assert_eq!(report["matcher"], "scalar");
    assert_eq!(report["outcome"]["status"], "completed");
}

#[test]
fn test_scan_parallel_json() {
    let capture = sample_capture("scan_parallel");
    let output = run_ok(&[
        "scan",
        capture.path_str(),
        "--json",
        "--parallel",
        "--threads",
        "2",
    ]);
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["total_processed"], 20);
}

#[test]
fn test_scan_show_records() {
    let capture = sample_capture("scan_show");
    let output = run_ok(&["scan", capture.path_str(), "--show", "3", "--max-packets", "1"]);
    assert!(output.contains("First 2 records:"));
    assert!(output.contains("AAPL"));
    assert!(output.contains("MSFT"));
}

#[test]
fn test_scan_show_prints_only_limit() {
    let capture = sample_capture("scan_show_limit");
    let output = run_ok(&["scan", capture.path_str(), "--show", "2"]);
    assert!(output.contains("First 2 records:"));
    assert_eq!(output.matches(" pkt ").count(), 2);
    assert!(output.contains("Messages decoded: 20"));
}

#[test]
fn test_scan_show_with_json_is_plain_report() {
    let capture = sample_capture("scan_show_json");
    let output = run_ok(&["scan", capture.path_str(), "--show", "5", "--json"]);
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["total_processed"], 20);
}

#[test]
fn test_scan_fallback_equal_to_scale_rejected() {
    let capture = sample_capture("scan_same_scale");
    let config = TempCapture::new("same_scale.toml", b"[price]\nscale = \"two_decimal\"\n");
    let output = run_fail(&[
        "scan",
        capture.path_str(),
        "--config",
        config.path_str(),
        "--fallback-scale",
    ]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("price.fallback_scale"));
}

#[test]
fn test_scan_with_config_file() {
    let capture = sample_capture("scan_config");
    let config = TempCapture::new("config.toml", b"per_type_cap = 1\nbatch_capacity = 4\n");
    let output = run_ok(&["scan", capture.path_str(), "--config", config.path_str(), "--json"]);
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(report["batches_flushed"], 5);
}

#[test]
fn test_scan_bad_config_field() {
    let capture = sample_capture("scan_bad_config");
    let config = TempCapture::new("bad.toml", b"no_such_field = 1\n");
    let output = run_fail(&["scan", capture.path_str(), "--config", config.path_str()]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error"));
}

#[test]
fn test_scan_missing_file() {
    let output = run_fail(&["scan", "/nonexistent/mdcap/feed.pcapng"]);
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to open"));
}

#[test]
fn test_scan_malformed_block_exits_one() {
    let mut bytes = pcapng_capture(&[udp_packet(&[trade("AAPL", 1_500_000, 100, b'B')])]);
    bytes.extend(overrunning_block());
    let capture = TempCapture::new("scan_malformed", &bytes);

    let output = run_fail(&["scan", capture.path_str()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Partial statistics are still printed.
    assert!(stdout.contains("Messages decoded: 1"));
    assert!(stdout.contains("Status: halted"));
}

#[test]
fn test_scan_bad_magic_exits_one() {
    let capture = TempCapture::new("scan_bad_magic", &[0u8; 64]);
    let output = run_fail(&["scan", capture.path_str(), "--json"]);
    let report: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(report["outcome"]["status"], "halted");
}

// ============================================================================
// Info and caps
// ============================================================================

#[test]
fn test_info() {
    let capture = sample_capture("info");
    let output = run_ok(&["info", capture.path_str()]);
    assert!(output.contains("Format: pcapng"));
    assert!(output.contains("Packets: 10"));
    assert!(output.contains("Interface 0"));
}

#[test]
fn test_info_classic() {
    let packets = vec![udp_packet(&[trade("AAPL", 1_500_000, 100, b'B')]); 3];
    let capture = TempCapture::new("info_classic", &classic_capture(&packets));
    let output = run_ok(&["info", capture.path_str()]);
    assert!(output.contains("Format: pcap"));
    assert!(output.contains("Packets: 3"));
    assert!(output.contains("Duration: 2.000s"));
}

#[test]
fn test_caps() {
    let output = run_ok(&["caps"]);
    assert!(output.contains("Best level"));
    assert!(output.contains("scalar"));

    let json: serde_json::Value = serde_json::from_str(&run_ok(&["caps", "--json"])).unwrap();
    assert!(json["tuning"]["batch_size"].as_u64().unwrap() > 0);
}
