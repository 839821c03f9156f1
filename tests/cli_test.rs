#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use odbcprobe::report::{DiagnosticReport, Outcome};
use std::{net::TcpListener, process::Command};

fn odbcprobe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_odbcprobe"));
    for (key, _) in std::env::vars() {
        if key.starts_with("ODBCPROBE_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_json_report_is_the_only_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("diagnostic.log");
    let port = closed_port();

    let output = odbcprobe()
        .args(["--host", "127.0.0.1", "--port", &port.to_string()])
        .args(["--timeouts", "1", "--json", "--log-file"])
        .arg(&log_file)
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let report: DiagnosticReport = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report.target.host, "127.0.0.1");
    assert_eq!(report.target.port, port);
    assert_eq!(report.results[0].outcome, Outcome::Pass);
    assert!(!report.results[1].outcome.is_pass());
    assert!(!report.recommendations.is_empty());

    // the transcript still goes to the console and the log file
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("DIAGNOSIS SUMMARY"));
    let content = std::fs::read_to_string(&log_file).unwrap();
    assert!(content.contains("DIAGNOSIS SUMMARY"));
}

#[test]
fn test_unwritable_log_file_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let log_file = dir.path().join("missing").join("diagnostic.log");

    let output = odbcprobe()
        .args(["--host", "127.0.0.1", "--log-file"])
        .arg(&log_file)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open log file"));
    assert!(output.stdout.is_empty());
}
