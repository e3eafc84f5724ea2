//! Data sources and artefact writers for the footfall engine.
//!
//! Responsibilities:
//! - Provide the reference Westminster point-of-interest catalogue.
//! - Read bin inventories from CSV and GeoJSON, and generate sample ones.
//! - Write grid, sensor and summary artefacts for a finished analysis.
//!
//! Boundaries:
//! - Do not encode scoring or placement rules (live in `footfall-core`).
//! - Keep every generator seeded so repeated runs produce identical data.

mod catalog;
mod export;
mod readers;
mod sample;

pub use catalog::{
    BUS_STOP_SEED, CatalogError, SCATTERED_STOP_COUNT, VENUE_SEED, generate_bus_stops,
    generate_venues, reference_catalog, reference_stations,
};
pub use export::{
    AnalysisReport, ExportError, ExportedFiles, GRID_CSV, GRID_GEOJSON, SENSORS_CSV,
    SENSORS_GEOJSON, SUMMARY_JSON, export_outcome, grid_feature_collection,
    sensor_feature_collection, write_bins_csv, write_grid_csv, write_grid_geojson,
    write_sensors_csv, write_sensors_geojson, write_summary_json,
};
pub use readers::{
    DataFormatError, read_bins, read_bins_csv, read_bins_csv_from, read_bins_geojson,
    read_bins_geojson_from,
};
pub use sample::{DEFAULT_SAMPLE_COUNT, SAMPLE_SEED, generate_sample_bins};
