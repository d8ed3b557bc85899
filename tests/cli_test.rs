//! End-to-end runs of the echocheckr binary

mod test_utils;

use std::ffi::OsStr;

use tempfile::TempDir;
use test_utils::*;

#[test]
fn synth_json_reports_echo() {
    let output = run_echocheckr(["synth", "--echo", "0.2:0.5", "--json"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json = parse_json_output(&output);
    assert_eq!(json["tool"], "echocheckr");
    assert!(json["generated_at"].is_string());
    assert_eq!(json["config"]["window_size"], 1000);

    let classical = &json["sources"][0]["report"]["classical"];
    assert_eq!(classical["pipeline"], "classical");
    assert_eq!(classical["echoes"][0]["bin"], 200);
    assert_delay_near(classical["echoes"][0]["delay"].as_f64().unwrap(), 0.2, 1.0);
    assert!(json["sources"][0]["report"]["quantum"].is_null());
}

#[test]
fn synth_both_pipelines() {
    let output = run_echocheckr([
        "synth",
        "--echo",
        "0.2:0.5",
        "--pipeline",
        "both",
        "--transform-size",
        "1024",
        "--json",
    ]);
    assert!(output.status.success());

    let json = parse_json_output(&output);
    let report = &json["sources"][0]["report"];
    assert_eq!(report["quantum"]["pipeline"], "quantum-simulated");
    assert_eq!(report["quantum"]["transform_size"], 1024);
    assert_eq!(report["quantum"]["echoes"][0]["bin"], 200);
}

#[test]
fn synth_text_output() {
    let output = run_echocheckr(["synth", "--echo", "0.2:0.5", "-v"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("synthetic"));
    assert!(stdout.contains("0.2000"));
    assert!(stdout.contains("Bin: 200"));
}

#[test]
fn analyze_wav_directory() {
    let dir = TempDir::new().unwrap();
    write_fixture_wav(dir.path(), "echo.wav", &received(&[(0.2, 0.5)]));
    write_fixture_wav(dir.path(), "clean.wav", &received(&[]));

    let output = run_echocheckr([
        OsStr::new("analyze"),
        dir.path().as_os_str(),
        OsStr::new("--json"),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json = parse_json_output(&output);
    let sources = json["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);

    // Files are reported in path order
    assert!(sources[0]["source"].as_str().unwrap().ends_with("clean.wav"));
    assert_eq!(
        sources[0]["report"]["classical"]["echoes"].as_array().unwrap().len(),
        0
    );
    assert!(sources[1]["source"].as_str().unwrap().ends_with("echo.wav"));
    assert_eq!(sources[1]["report"]["classical"]["echoes"][0]["bin"], 200);
}

#[test]
fn analyze_with_hop_reports_windows() {
    let dir = TempDir::new().unwrap();
    let train = echocheckr::testgen::SyntheticScenario::default()
        .with_pulses(2)
        .with_echo(0.2, 0.5)
        .unwrap()
        .build()
        .unwrap()
        .received;
    let path = write_fixture_wav(dir.path(), "train.wav", &train);

    let output = run_echocheckr([
        OsStr::new("analyze"),
        path.as_os_str(),
        OsStr::new("--hop"),
        OsStr::new("1000"),
        OsStr::new("--json"),
    ]);
    assert!(output.status.success());

    let json = parse_json_output(&output);
    let windows = json["sources"][0]["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[1]["offset"], 1000);
    assert_eq!(windows[1]["report"]["classical"]["echoes"][0]["bin"], 200);
}

#[test]
fn window_too_large_exits_with_kind() {
    let output = run_echocheckr(["synth", "--window-size", "2000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("window_too_large"), "stderr: {}", stderr);
    assert!(stderr.contains("2000"));
}

#[test]
fn quantum_non_power_of_two_exits_with_kind() {
    let output = run_echocheckr(["synth", "--pipeline", "quantum", "--transform-size", "1000"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid_transform_size"), "stderr: {}", stderr);
    assert!(stderr.contains("1000"));
}

#[test]
fn config_file_is_applied() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{ "peak_strength_threshold": 100.0 }"#).unwrap();

    let output = run_echocheckr([
        OsStr::new("synth"),
        OsStr::new("--echo"),
        OsStr::new("0.2:0.5"),
        OsStr::new("--config"),
        config.as_os_str(),
        OsStr::new("--json"),
    ]);
    assert!(output.status.success());
    let json = parse_json_output(&output);
    assert_eq!(json["config"]["peak_strength_threshold"], 100.0);
    assert_eq!(
        json["sources"][0]["report"]["classical"]["echoes"].as_array().unwrap().len(),
        0
    );
}

#[test]
fn profiles_are_listed() {
    let output = run_echocheckr(["profiles"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ArterialPulse"));
    assert!(stdout.contains("Strict"));
}
