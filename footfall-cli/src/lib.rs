//! Command-line interface for the footfall engine.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};

mod analyse;
mod error;
mod sample;

use analyse::{AnalyseArgs, run_analyse};
pub use error::CliError;
use sample::{SampleBinsArgs, run_sample_bins};

pub(crate) const ARG_BINS: &str = "bins";
pub(crate) const ARG_SAMPLE_BINS: &str = "sample-bins";
pub(crate) const ARG_SENSORS: &str = "sensors";
pub(crate) const ARG_RESOLUTION: &str = "resolution";
pub(crate) const ARG_CATEGORIES: &str = "categories";
pub(crate) const ARG_PLACEMENT: &str = "placement";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_COUNT: &str = "count";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ENV_SAMPLE_OUTPUT: &str = "FOOTFALL_CMDS_SAMPLE_BINS_OUTPUT";

/// Run the footfall CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when parsing, configuration, the analysis or any
/// artefact write fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Analyse(args) => run_analyse(args, &mut stdout),
        Command::SampleBins(args) => run_sample_bins(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "footfall",
    about = "Footfall scoring and bin sensor placement for Westminster",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score the grid, place sensors and write the artefacts.
    Analyse(AnalyseArgs),
    /// Generate a sample bin inventory.
    SampleBins(SampleBinsArgs),
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match footfall_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests;
