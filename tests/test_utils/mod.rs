#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use echocheckr::core::signal::{CompositeSignal, Signal};
use echocheckr::testgen::{write_wav, SyntheticScenario};
use echocheckr::{EchoAnalyzer, EchoConfig, PipelineSelection};

/// One sample period of the reference fixture
pub const SAMPLE_PERIOD: f64 = 0.001;

pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_echocheckr"))
}

pub fn run_echocheckr<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    Command::new(get_binary_path())
        .args(args)
        .env_remove("ECHOCHECKR_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute echocheckr")
}

pub fn parse_json_output(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}

/// 5 Hz sinusoid damped at 5/s, 1 s at 1 kHz, with the given echoes
pub fn fixture(echoes: &[(f64, f64)]) -> CompositeSignal {
    let mut scenario = SyntheticScenario::default();
    for &(delay, attenuation) in echoes {
        scenario = if attenuation < 0.0 {
            scenario.with_inverted_echo(delay, -attenuation).unwrap()
        } else {
            scenario.with_echo(delay, attenuation).unwrap()
        };
    }
    scenario.build().unwrap()
}

pub fn received(echoes: &[(f64, f64)]) -> Signal {
    fixture(echoes).received
}

pub fn analyzer_with(config: EchoConfig) -> EchoAnalyzer {
    EchoAnalyzer::new(config).expect("valid configuration")
}

pub fn quantum_config(transform_size: usize) -> EchoConfig {
    EchoConfig {
        pipeline: PipelineSelection::QuantumSimulated,
        transform_size: Some(transform_size),
        ..EchoConfig::default()
    }
}

pub fn assert_delay_near(actual: f64, expected: f64, samples: f64) {
    assert!(
        (actual - expected).abs() <= samples * SAMPLE_PERIOD + 1e-12,
        "delay {} not within {} sample(s) of {}",
        actual,
        samples,
        expected
    );
}

pub fn write_fixture_wav(dir: &Path, name: &str, signal: &Signal) -> PathBuf {
    let path = dir.join(name);
    write_wav(&path, signal).expect("write fixture wav");
    path
}
