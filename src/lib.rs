//! Facade crate for the footfall engine.
//!
//! This crate re-exports the core analysis types and exposes the reference
//! data sources and artefact writers behind the `data` feature.

#![forbid(unsafe_code)]

pub use footfall_core::{
    AnalysisConfig, AnalysisError, AnalysisInputs, AnalysisOutcome, AnalysisStats, BinRecord,
    BoundingBox, BusStop, ConfigError, GridCell, PipelineStage, PlacementStrategy, PoiCatalog,
    Region, RunError, RunHandle, RunSnapshot, RunStatus, SensorSummary, TransitStation, Venue,
    WardSummary, run_analysis,
};

#[cfg(feature = "data")]
pub use footfall_data::{
    AnalysisReport, DataFormatError, ExportError, export_outcome, generate_sample_bins, read_bins,
    reference_catalog,
};
