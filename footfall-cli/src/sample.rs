//! Sample-bins command implementation for the footfall CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use footfall_data::{DEFAULT_SAMPLE_COUNT, SAMPLE_SEED, generate_sample_bins, write_bins_csv};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_COUNT, ARG_OUTPUT, ARG_SEED, CliError, ENV_SAMPLE_OUTPUT};

/// CLI arguments for the `sample-bins` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Generate a seeded bin inventory over the Westminster study \
                 box, a third of it clustered around busy interchanges, and \
                 write it as CSV for use with `analyse --bins`.",
    about = "Write a sample bin inventory"
)]
#[ortho_config(prefix = "FOOTFALL")]
pub(crate) struct SampleBinsArgs {
    /// CSV file to write.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Number of bins to generate.
    #[arg(long = ARG_COUNT, value_name = "count")]
    #[serde(default)]
    pub(crate) count: Option<usize>,
    /// Generator seed.
    #[arg(long = ARG_SEED, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl SampleBinsArgs {
    pub(crate) fn into_config(self) -> Result<SampleBinsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SampleBinsConfig::try_from(merged)
    }
}

/// Resolved `sample-bins` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SampleBinsConfig {
    pub(crate) output: Utf8PathBuf,
    pub(crate) count: usize,
    pub(crate) seed: u64,
}

impl TryFrom<SampleBinsArgs> for SampleBinsConfig {
    type Error = CliError;

    fn try_from(args: SampleBinsArgs) -> Result<Self, Self::Error> {
        let output = args.output.ok_or(CliError::MissingArgument {
            field: ARG_OUTPUT,
            env: ENV_SAMPLE_OUTPUT,
        })?;
        Ok(Self {
            output,
            count: args.count.unwrap_or(DEFAULT_SAMPLE_COUNT),
            seed: args.seed.unwrap_or(SAMPLE_SEED),
        })
    }
}

pub(crate) fn run_sample_bins(
    args: SampleBinsArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    execute_sample_bins(&args.into_config()?, writer)
}

pub(crate) fn execute_sample_bins(
    config: &SampleBinsConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let bins = generate_sample_bins(config.count, config.seed);
    write_bins_csv(&config.output, &bins)?;
    writeln!(writer, "wrote {} sample bins to {}", bins.len(), config.output)
        .map_err(CliError::WriteOutput)
}
