//! Writers for analysis artefacts.
//!
//! A finished run produces five files: the scored grid as CSV and GeoJSON,
//! the recommended sensor locations as CSV and as a GeoJSON point layer, and
//! a JSON report bundling the headline statistics with the ward and sensor
//! summaries.

use std::io::{self, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use footfall_core::{
    AnalysisOutcome, AnalysisStats, BinRecord, GridCell, SensorSummary, WardSummary,
};
use footfall_fs::{create_utf8_file, ensure_dir};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use log::info;
use serde::Serialize;
use thiserror::Error;

/// File name of the scored grid CSV.
pub const GRID_CSV: &str = "westminster_footfall_grid.csv";
/// File name of the scored grid GeoJSON layer.
pub const GRID_GEOJSON: &str = "westminster_footfall_grid.geojson";
/// File name of the recommended sensor list.
pub const SENSORS_CSV: &str = "recommended_sensor_locations.csv";
/// File name of the recommended sensor point layer.
pub const SENSORS_GEOJSON: &str = "recommended_sensor_locations.geojson";
/// File name of the JSON report.
pub const SUMMARY_JSON: &str = "footfall_summary.json";

const GRID_HEADERS: [&str; 13] = [
    "cell_id",
    "center_lat",
    "center_lon",
    "transit_score",
    "bus_score",
    "venue_score",
    "footfall_score",
    "footfall_category",
    "footfall_category_name",
    "ward",
    "road_name",
    "estimated_people_per_hour",
    "estimated_bin_fill_rate",
];

const SENSOR_HEADERS: [&str; 13] = [
    "selection_rank",
    "bin_id",
    "lat",
    "lon",
    "bin_type",
    "capacity_liters",
    "cell_id",
    "footfall_category",
    "footfall_score",
    "ward",
    "road_name",
    "estimated_people_per_hour",
    "estimated_bin_fill_rate",
];

const BIN_HEADERS: [&str; 5] = ["bin_id", "lat", "lon", "bin_type", "capacity_liters"];

/// Errors raised while writing artefacts.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output directory could not be created.
    #[error("failed to create output directory {path}")]
    CreateDir {
        /// Directory that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The output file could not be created.
    #[error("failed to create {path}")]
    Create {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A CSV record could not be written.
    #[error("failed to write CSV to {path}")]
    Csv {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// A JSON document could not be written.
    #[error("failed to write JSON to {path}")]
    Json {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// Buffered output could not be flushed.
    #[error("failed to flush {path}")]
    Flush {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Headline statistics plus both summaries, as written to [`SUMMARY_JSON`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Counts and distributions.
    pub stats: AnalysisStats,
    /// Footfall by ward and road.
    pub wards: WardSummary,
    /// Chosen sensors by ward and road.
    pub sensors: SensorSummary,
}

impl AnalysisReport {
    /// Build every summary of `outcome`.
    #[must_use]
    pub fn from_outcome(outcome: &AnalysisOutcome) -> Self {
        Self {
            stats: AnalysisStats::from_outcome(outcome),
            wards: WardSummary::from_outcome(outcome),
            sensors: SensorSummary::from_outcome(outcome),
        }
    }
}

/// Paths written by [`export_outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFiles {
    /// Scored grid CSV.
    pub grid_csv: Utf8PathBuf,
    /// Scored grid GeoJSON.
    pub grid_geojson: Utf8PathBuf,
    /// Recommended sensor CSV.
    pub sensors_csv: Utf8PathBuf,
    /// Recommended sensor GeoJSON.
    pub sensors_geojson: Utf8PathBuf,
    /// JSON report.
    pub summary_json: Utf8PathBuf,
}

#[derive(Serialize)]
struct GridRow<'a> {
    cell_id: String,
    center_lat: f64,
    center_lon: f64,
    transit_score: f64,
    bus_score: f64,
    venue_score: f64,
    footfall_score: f64,
    footfall_category: usize,
    footfall_category_name: &'a str,
    ward: &'a str,
    road_name: &'a str,
    estimated_people_per_hour: f64,
    estimated_bin_fill_rate: f64,
}

impl<'a> From<&'a GridCell> for GridRow<'a> {
    fn from(cell: &'a GridCell) -> Self {
        Self {
            cell_id: cell.id.to_string(),
            center_lat: cell.center.y,
            center_lon: cell.center.x,
            transit_score: cell.transit_score,
            bus_score: cell.bus_score,
            venue_score: cell.venue_score,
            footfall_score: cell.footfall_score,
            footfall_category: cell.category,
            footfall_category_name: &cell.category_label,
            ward: cell.ward_or_unknown(),
            road_name: cell.road_or_unknown(),
            estimated_people_per_hour: cell.people_per_hour,
            estimated_bin_fill_rate: cell.bin_fill_rate,
        }
    }
}

#[derive(Serialize)]
struct SensorRow<'a> {
    selection_rank: Option<usize>,
    bin_id: &'a str,
    lat: f64,
    lon: f64,
    bin_type: &'a str,
    capacity_liters: u32,
    cell_id: Option<String>,
    footfall_category: Option<usize>,
    footfall_score: Option<f64>,
    ward: &'a str,
    road_name: &'a str,
    estimated_people_per_hour: Option<f64>,
    estimated_bin_fill_rate: Option<f64>,
}

impl<'a> From<&'a BinRecord> for SensorRow<'a> {
    fn from(bin: &'a BinRecord) -> Self {
        let assignment = bin.assignment.as_ref();
        Self {
            selection_rank: bin.selection_rank(),
            bin_id: &bin.id,
            lat: bin.location.y,
            lon: bin.location.x,
            bin_type: &bin.bin_type,
            capacity_liters: bin.capacity_litres,
            cell_id: assignment.map(|cell| cell.cell_id.to_string()),
            footfall_category: assignment.map(|cell| cell.category),
            footfall_score: assignment.map(|cell| cell.footfall_score),
            ward: bin.ward_or_unknown(),
            road_name: bin.road_or_unknown(),
            estimated_people_per_hour: assignment.map(|cell| cell.people_per_hour),
            estimated_bin_fill_rate: assignment.map(|cell| cell.bin_fill_rate),
        }
    }
}

#[derive(Serialize)]
struct BinRow<'a> {
    bin_id: &'a str,
    lat: f64,
    lon: f64,
    bin_type: &'a str,
    capacity_liters: u32,
}

impl<'a> From<&'a BinRecord> for BinRow<'a> {
    fn from(bin: &'a BinRecord) -> Self {
        Self {
            bin_id: &bin.id,
            lat: bin.location.y,
            lon: bin.location.x,
            bin_type: &bin.bin_type,
            capacity_liters: bin.capacity_litres,
        }
    }
}

fn create(path: &Utf8Path) -> Result<BufWriter<impl Write>, ExportError> {
    create_utf8_file(path)
        .map(BufWriter::new)
        .map_err(|source| ExportError::Create {
            path: path.to_path_buf(),
            source,
        })
}

fn write_rows<T: Serialize>(
    path: &Utf8Path,
    headers: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<usize, ExportError> {
    let csv_error = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(create(path)?);
    writer.write_record(headers).map_err(csv_error)?;
    let mut written = 0;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
        written += 1;
    }
    writer.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(written)
}

fn write_json<T: Serialize + ?Sized>(path: &Utf8Path, value: &T) -> Result<(), ExportError> {
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, value).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(|source| ExportError::Flush {
        path: path.to_path_buf(),
        source,
    })
}

/// Write every cell with its scores, band and estimates.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_grid_csv(path: &Utf8Path, cells: &[GridCell]) -> Result<(), ExportError> {
    let written = write_rows(path, &GRID_HEADERS, cells.iter().map(GridRow::from))?;
    info!("wrote {written} grid cells to {path}");
    Ok(())
}

/// Write the selected bins ordered by rank. Unselected bins are skipped.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_sensors_csv(path: &Utf8Path, bins: &[BinRecord]) -> Result<(), ExportError> {
    let mut selected: Vec<&BinRecord> = bins.iter().filter(|bin| bin.is_selected()).collect();
    selected.sort_by_key(|bin| bin.selection_rank());
    let written = write_rows(path, &SENSOR_HEADERS, selected.into_iter().map(SensorRow::from))?;
    info!("wrote {written} recommended sensor locations to {path}");
    Ok(())
}

/// Write a bin inventory in the layout [`crate::read_bins_csv`] reads.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_bins_csv(path: &Utf8Path, bins: &[BinRecord]) -> Result<(), ExportError> {
    let written = write_rows(path, &BIN_HEADERS, bins.iter().map(BinRow::from))?;
    info!("wrote {written} bins to {path}");
    Ok(())
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_wrap,
    reason = "decimal rounding scales by a small power of ten"
)]
fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10_f64.powi(places as i32);
    (value * scale).round() / scale
}

#[expect(
    clippy::float_arithmetic,
    reason = "cell squares extend half a resolution either side of the centre"
)]
fn cell_square(cell: &GridCell, resolution: f64) -> Value {
    let half = resolution / 2.0;
    let (x, y) = (cell.center.x, cell.center.y);
    Value::Polygon(vec![vec![
        vec![x - half, y - half],
        vec![x + half, y - half],
        vec![x + half, y + half],
        vec![x - half, y + half],
        vec![x - half, y - half],
    ]])
}

fn cell_feature(cell: &GridCell, resolution: f64) -> Feature {
    let mut feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(cell_square(cell, resolution))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    feature.set_property("cell_id", cell.id.to_string());
    feature.set_property("footfall_score", round_to(cell.footfall_score, 4));
    feature.set_property("footfall_category", cell.category);
    feature.set_property("footfall_category_name", cell.category_label.as_str());
    feature.set_property("transit_score", round_to(cell.transit_score, 2));
    feature.set_property("bus_score", round_to(cell.bus_score, 2));
    feature.set_property("venue_score", round_to(cell.venue_score, 2));
    feature.set_property("ward", cell.ward_or_unknown());
    feature
}

/// Square polygons of side `resolution` around each cell centre.
///
/// Footfall scores are rounded to four decimal places and component scores
/// to two.
#[must_use]
pub fn grid_feature_collection(cells: &[GridCell], resolution: f64) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: cells
            .iter()
            .map(|cell| cell_feature(cell, resolution))
            .collect(),
        foreign_members: None,
    }
}

/// Write the grid as a GeoJSON feature collection.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_grid_geojson(
    path: &Utf8Path,
    cells: &[GridCell],
    resolution: f64,
) -> Result<(), ExportError> {
    write_json(path, &grid_feature_collection(cells, resolution))?;
    info!("wrote {} grid polygons to {path}", cells.len());
    Ok(())
}

fn sensor_feature(bin: &BinRecord) -> Feature {
    let mut feature = Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            bin.location.x,
            bin.location.y,
        ]))),
        id: None,
        properties: None,
        foreign_members: None,
    };
    feature.set_property("bin_id", bin.id.as_str());
    feature.set_property("selection_rank", bin.selection_rank());
    feature.set_property("bin_type", bin.bin_type.as_str());
    feature.set_property("capacity_liters", bin.capacity_litres);
    if let Some(cell) = bin.assignment.as_ref() {
        feature.set_property("cell_id", cell.cell_id.to_string());
        feature.set_property("footfall_category", cell.category);
        feature.set_property("footfall_category_name", cell.category_label.as_str());
        feature.set_property("footfall_score", round_to(cell.footfall_score, 4));
        feature.set_property("estimated_people_per_hour", round_to(cell.people_per_hour, 1));
    }
    feature.set_property("ward", bin.ward_or_unknown());
    feature.set_property("road_name", bin.road_or_unknown());
    feature
}

/// Selected bins as `Point` features, ordered by rank.
///
/// Unselected bins are skipped, matching [`write_sensors_csv`].
#[must_use]
pub fn sensor_feature_collection(bins: &[BinRecord]) -> FeatureCollection {
    let mut selected: Vec<&BinRecord> = bins.iter().filter(|bin| bin.is_selected()).collect();
    selected.sort_by_key(|bin| bin.selection_rank());
    FeatureCollection {
        bbox: None,
        features: selected.into_iter().map(sensor_feature).collect(),
        foreign_members: None,
    }
}

/// Write the selected bins as a GeoJSON point layer.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_sensors_geojson(path: &Utf8Path, bins: &[BinRecord]) -> Result<(), ExportError> {
    let collection = sensor_feature_collection(bins);
    write_json(path, &collection)?;
    info!("wrote {} sensor points to {path}", collection.features.len());
    Ok(())
}

/// Write `report` as pretty-printed JSON.
///
/// # Errors
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_summary_json(path: &Utf8Path, report: &AnalysisReport) -> Result<(), ExportError> {
    write_json(path, report)
}

/// Write every artefact of `outcome` into `dir`, creating it if needed.
///
/// # Errors
/// Returns [`ExportError`] for the first artefact that fails.
pub fn export_outcome(dir: &Utf8Path, outcome: &AnalysisOutcome) -> Result<ExportedFiles, ExportError> {
    ensure_dir(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let files = ExportedFiles {
        grid_csv: dir.join(GRID_CSV),
        grid_geojson: dir.join(GRID_GEOJSON),
        sensors_csv: dir.join(SENSORS_CSV),
        sensors_geojson: dir.join(SENSORS_GEOJSON),
        summary_json: dir.join(SUMMARY_JSON),
    };
    write_grid_csv(&files.grid_csv, &outcome.cells)?;
    write_grid_geojson(&files.grid_geojson, &outcome.cells, outcome.config.resolution)?;
    write_sensors_csv(&files.sensors_csv, &outcome.bins)?;
    write_sensors_geojson(&files.sensors_geojson, &outcome.bins)?;
    write_summary_json(&files.summary_json, &AnalysisReport::from_outcome(outcome))?;
    Ok(files)
}
