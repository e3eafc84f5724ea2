//! Error types emitted by the footfall CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use footfall_core::{ConfigError, RunError};
use footfall_data::{CatalogError, DataFormatError, ExportError};
use thiserror::Error;

/// Errors emitted by the footfall CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// Two mutually exclusive options were both set after merging.
    #[error("--{first} and --{second} cannot be combined")]
    ConflictingArguments {
        /// First option.
        first: &'static str,
        /// Second option.
        second: &'static str,
    },
    /// The merged analysis settings failed validation.
    #[error("invalid analysis settings: {0}")]
    InvalidSettings(#[from] ConfigError),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path that was not found.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} is not a directory")]
    OutputDirectoryNotDirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The reference catalogue could not be built.
    #[error("failed to build the reference catalogue: {0}")]
    Catalog(#[from] CatalogError),
    /// The bin inventory could not be read.
    #[error("failed to load bins: {0}")]
    LoadBins(#[from] DataFormatError),
    /// The analysis run failed.
    #[error("analysis failed: {0}")]
    Analysis(#[from] RunError),
    /// Writing artefacts failed.
    #[error("failed to write artefacts: {0}")]
    Export(#[from] ExportError),
    /// Serialising the run statistics failed.
    #[error("failed to serialise analysis statistics: {0}")]
    SerialiseStats(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
