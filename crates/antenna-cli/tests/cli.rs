//! Runs the `antenna` binary end to end.

use std::process::Command;

fn antenna(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_antenna"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn json_stdout_stays_clean_while_logging() {
    // A 5 Ω line is far outside the W/h validity range and logs a warning.
    let out = antenna(&["-v", "--json", "microstrip", "-z", "5", "-e", "4.3", "--height", "1.6"]);
    assert!(out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(report["width_m"].as_f64().unwrap() > 0.0);
    assert_eq!(report["warnings"].as_array().unwrap().len(), 1);

    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("validity range"), "stderr: {stderr}");
}

#[test]
fn calculator_errors_fail_the_process() {
    let out = antenna(&["vswr", "vswr", "0.5"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}
