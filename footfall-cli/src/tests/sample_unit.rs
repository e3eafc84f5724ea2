//! Focused unit tests covering the sample-bins command.

use super::*;
use crate::sample::{SampleBinsConfig, execute_sample_bins};
use camino::Utf8PathBuf;
use footfall_data::{DEFAULT_SAMPLE_COUNT, SAMPLE_SEED, generate_sample_bins, read_bins_csv};
use rstest::rstest;
use tempfile::TempDir;

#[rstest]
fn converting_without_output_errors() {
    let err = SampleBinsConfig::try_from(SampleBinsArgs::default())
        .expect_err("missing output should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_OUTPUT);
            assert_eq!(env, ENV_SAMPLE_OUTPUT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn count_and_seed_default_to_the_reference_sample() {
    let args = SampleBinsArgs {
        output: Some(Utf8PathBuf::from("bins.csv")),
        ..SampleBinsArgs::default()
    };
    let config = SampleBinsConfig::try_from(args).expect("config should build");
    assert_eq!(config.count, DEFAULT_SAMPLE_COUNT);
    assert_eq!(config.seed, SAMPLE_SEED);
}

#[rstest]
fn writes_the_seeded_inventory() {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let config = SampleBinsConfig {
        output: root.join("data/sample_bins.csv"),
        count: 12,
        seed: 9,
    };
    let mut stdout = Vec::new();
    execute_sample_bins(&config, &mut stdout).expect("sample written");

    let written = read_bins_csv(&config.output).expect("inventory readable");
    assert_eq!(written, generate_sample_bins(12, 9));
    let message = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(message.contains("12 sample bins"));
}
