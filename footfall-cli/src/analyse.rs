//! Analyse command implementation for the footfall CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use footfall_core::{
    AnalysisConfig, AnalysisInputs, AnalysisStats, BinRecord, PlacementStrategy, Region, RunHandle,
};
use footfall_data::{
    DEFAULT_SAMPLE_COUNT, SAMPLE_SEED, export_outcome, generate_sample_bins, read_bins,
    reference_catalog,
};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_BINS, ARG_CATEGORIES, ARG_OUTPUT_DIR, ARG_PLACEMENT, ARG_RESOLUTION, ARG_SAMPLE_BINS,
    ARG_SENSORS, CliError,
};

/// Directory used when `--output-dir` is not given.
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "output";

/// CLI arguments for the `analyse` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Score the Westminster grid from stations, bus stops and \
                 licensed premises, assign bins to cells and choose sensor \
                 locations balanced across footfall categories. Writes the \
                 grid and sensor layers as CSV and GeoJSON plus a JSON summary, then \
                 prints headline statistics as JSON.",
    about = "Run the footfall analysis and write its artefacts"
)]
#[ortho_config(prefix = "FOOTFALL")]
pub(crate) struct AnalyseArgs {
    /// Bin inventory as CSV, or GeoJSON when the extension is .geojson/.json.
    #[arg(long = ARG_BINS, value_name = "path", conflicts_with = "sample_bins")]
    #[serde(default)]
    pub(crate) bins: Option<Utf8PathBuf>,
    /// Use a generated sample inventory instead of a file.
    #[arg(long = ARG_SAMPLE_BINS)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) sample_bins: bool,
    /// Number of sensors to place.
    #[arg(long = ARG_SENSORS, value_name = "count")]
    #[serde(default)]
    pub(crate) sensors: Option<usize>,
    /// Grid spacing in degrees.
    #[arg(long = ARG_RESOLUTION, value_name = "degrees")]
    #[serde(default)]
    pub(crate) resolution: Option<f64>,
    /// Number of footfall categories (1 to 8).
    #[arg(long = ARG_CATEGORIES, value_name = "count")]
    #[serde(default)]
    pub(crate) categories: Option<usize>,
    /// Within-category sampling: auto, dispersion or stride.
    #[arg(long = ARG_PLACEMENT, value_name = "strategy")]
    #[serde(default)]
    pub(crate) placement: Option<String>,
    /// Directory receiving the artefacts.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl AnalyseArgs {
    pub(crate) fn into_config(self) -> Result<AnalyseConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AnalyseConfig::try_from(merged)
    }
}

/// Where the bin inventory comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BinSource {
    /// Score the grid without bins.
    None,
    /// Read bins from a file.
    File(Utf8PathBuf),
    /// Generate the seeded sample inventory.
    Sample,
}

/// Resolved `analyse` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AnalyseConfig {
    /// Bin inventory source.
    pub(crate) bins: BinSource,
    /// Validated analysis settings.
    pub(crate) analysis: AnalysisConfig,
    /// Directory receiving the artefacts.
    pub(crate) output_dir: Utf8PathBuf,
}

impl AnalyseConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        if let BinSource::File(path) = &self.bins {
            crate::require_existing(path, ARG_BINS)?;
        }
        Self::require_output_dir(&self.output_dir)
    }

    fn require_output_dir(path: &Utf8Path) -> Result<(), CliError> {
        match footfall_fs::path_is_dir(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::OutputDirectoryNotDirectory {
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_OUTPUT_DIR,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<AnalyseArgs> for AnalyseConfig {
    type Error = CliError;

    fn try_from(args: AnalyseArgs) -> Result<Self, Self::Error> {
        let bins = match (args.bins, args.sample_bins) {
            (Some(_), true) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_BINS,
                    second: ARG_SAMPLE_BINS,
                });
            }
            (Some(path), false) => BinSource::File(path),
            (None, true) => BinSource::Sample,
            (None, false) => BinSource::None,
        };

        let mut analysis = AnalysisConfig::default();
        if let Some(sensors) = args.sensors {
            analysis = analysis.with_sensor_count(sensors);
        }
        if let Some(resolution) = args.resolution {
            analysis = analysis.with_resolution(resolution);
        }
        if let Some(categories) = args.categories {
            analysis = analysis.with_category_count(categories);
        }
        if let Some(name) = args.placement.as_deref() {
            analysis = analysis.with_placement(name.parse::<PlacementStrategy>()?);
        }
        analysis.validate()?;

        let output_dir = args
            .output_dir
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
        Ok(Self {
            bins,
            analysis,
            output_dir,
        })
    }
}

pub(crate) fn run_analyse(args: AnalyseArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    execute_analyse(&config, writer)
}

pub(crate) fn execute_analyse(
    config: &AnalyseConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let bins = load_bins(&config.bins)?;
    let catalog = reference_catalog(&config.analysis)?;
    let inputs = AnalysisInputs {
        config: config.analysis.clone(),
        region: Region::westminster(),
        catalog,
        bins,
    };
    let outcome = RunHandle::new().run_blocking(inputs)?;
    let files = export_outcome(&config.output_dir, &outcome)?;
    info!(
        "artefacts written to {}, {}, {}, {} and {}",
        files.grid_csv,
        files.grid_geojson,
        files.sensors_csv,
        files.sensors_geojson,
        files.summary_json
    );
    write_stats(writer, &AnalysisStats::from_outcome(&outcome))
}

fn load_bins(source: &BinSource) -> Result<Vec<BinRecord>, CliError> {
    match source {
        BinSource::None => {
            info!("no bin inventory given; scoring the grid only");
            Ok(Vec::new())
        }
        BinSource::File(path) => Ok(read_bins(path)?),
        BinSource::Sample => Ok(generate_sample_bins(DEFAULT_SAMPLE_COUNT, SAMPLE_SEED)),
    }
}

fn write_stats(writer: &mut dyn Write, stats: &AnalysisStats) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(stats).map_err(CliError::SerialiseStats)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AnalyseConfig, CliError> {
    let merged = AnalyseArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AnalyseConfig::try_from(merged)
}
