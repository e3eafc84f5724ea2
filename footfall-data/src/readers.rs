//! Bin inventory readers for CSV and GeoJSON files.
//!
//! Both readers fail on the first malformed record rather than skipping it,
//! so a partially read inventory never reaches the analysis.

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use footfall_core::BinRecord;
use footfall_fs::open_utf8_file;
use geo::Coord;
use geojson::{Feature, GeoJson, Value};
use log::info;
use serde_json::Value as JsonValue;
use thiserror::Error;

const LAT_HEADERS: [&str; 2] = ["lat", "latitude"];
const LON_HEADERS: [&str; 3] = ["lon", "longitude", "lng"];

/// Errors raised while reading a bin inventory.
#[derive(Debug, Error)]
pub enum DataFormatError {
    /// The file could not be opened or read.
    #[error("failed to open bin inventory at {path}")]
    Open {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The CSV layer rejected the file.
    #[error("malformed CSV in {path}")]
    Csv {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
    /// No header matched a required column.
    #[error("{path} has no {column} column")]
    MissingColumn {
        /// File that failed.
        path: Utf8PathBuf,
        /// Column that was expected.
        column: &'static str,
    },
    /// A numeric field could not be parsed or was not finite.
    #[error("record {record} in {path} has invalid {column} value {value:?}")]
    InvalidNumber {
        /// File that failed.
        path: Utf8PathBuf,
        /// Zero-based record index.
        record: usize,
        /// Column or property holding the value.
        column: &'static str,
        /// Raw text of the value.
        value: String,
    },
    /// The file is not valid GeoJSON.
    #[error("malformed GeoJSON in {path}")]
    GeoJson {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying GeoJSON error.
        #[source]
        source: Box<geojson::Error>,
    },
    /// A feature lacks a usable point geometry.
    #[error("feature {record} in {path} is not a point: {reason}")]
    InvalidGeometry {
        /// File that failed.
        path: Utf8PathBuf,
        /// Zero-based feature index.
        record: usize,
        /// What was wrong with the geometry.
        reason: String,
    },
}

fn default_bin_id(index: usize) -> String {
    format!("BIN{index:05}")
}

fn open(path: &Utf8Path) -> Result<impl Read, DataFormatError> {
    open_utf8_file(path).map_err(|source| DataFormatError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Positions of the recognised columns in a CSV header.
#[derive(Debug, Clone, Copy)]
struct Columns {
    lat: usize,
    lon: usize,
    id: Option<usize>,
    bin_type: Option<usize>,
    capacity: Option<usize>,
}

impl Columns {
    fn resolve(path: &Utf8Path, headers: &csv::StringRecord) -> Result<Self, DataFormatError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|header| names.iter().any(|name| header.trim().eq_ignore_ascii_case(name)))
        };
        let missing = |column| DataFormatError::MissingColumn {
            path: path.to_path_buf(),
            column,
        };
        Ok(Self {
            lat: find(&LAT_HEADERS).ok_or_else(|| missing("lat"))?,
            lon: find(&LON_HEADERS).ok_or_else(|| missing("lon"))?,
            id: find(&["bin_id"]),
            bin_type: find(&["bin_type"]),
            capacity: find(&["capacity_liters"]),
        })
    }
}

fn parse_coordinate(
    path: &Utf8Path,
    record: usize,
    column: &'static str,
    raw: &str,
) -> Result<f64, DataFormatError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| DataFormatError::InvalidNumber {
            path: path.to_path_buf(),
            record,
            column,
            value: raw.to_owned(),
        })
}

fn parse_capacity(path: &Utf8Path, record: usize, raw: &str) -> Result<u32, DataFormatError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| DataFormatError::InvalidNumber {
            path: path.to_path_buf(),
            record,
            column: "capacity_liters",
            value: raw.to_owned(),
        })
}

fn field(row: &csv::StringRecord, column: Option<usize>) -> Option<&str> {
    column
        .and_then(|index| row.get(index))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn bin_from_row(
    path: &Utf8Path,
    index: usize,
    row: &csv::StringRecord,
    columns: Columns,
) -> Result<BinRecord, DataFormatError> {
    let lat = parse_coordinate(path, index, "lat", field(row, Some(columns.lat)).unwrap_or_default())?;
    let lon = parse_coordinate(path, index, "lon", field(row, Some(columns.lon)).unwrap_or_default())?;
    let id = field(row, columns.id).map_or_else(|| default_bin_id(index), str::to_owned);
    let mut bin = BinRecord::new(id, Coord { x: lon, y: lat });
    if let Some(kind) = field(row, columns.bin_type) {
        kind.clone_into(&mut bin.bin_type);
    }
    if let Some(raw) = field(row, columns.capacity) {
        bin.capacity_litres = parse_capacity(path, index, raw)?;
    }
    Ok(bin)
}

/// Read bins from a CSV file with a header row.
///
/// Latitude is taken from a `lat` or `latitude` column and longitude from
/// `lon`, `longitude` or `lng`, matched case-insensitively. `bin_id`,
/// `bin_type` and `capacity_liters` are optional; missing ids become
/// `BIN{index:05}` and missing details keep the [`BinRecord::new`] defaults.
///
/// # Errors
/// Returns [`DataFormatError`] for the first unreadable or invalid record.
pub fn read_bins_csv(path: &Utf8Path) -> Result<Vec<BinRecord>, DataFormatError> {
    read_bins_csv_from(path, open(path)?)
}

/// Read CSV bins from any reader; `path` only labels errors.
///
/// # Errors
/// Returns [`DataFormatError`] for the first unreadable or invalid record.
pub fn read_bins_csv_from<R: Read>(
    path: &Utf8Path,
    source: R,
) -> Result<Vec<BinRecord>, DataFormatError> {
    let csv_error = |source| DataFormatError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let columns = Columns::resolve(path, reader.headers().map_err(csv_error)?)?;
    let mut bins = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let record = row.map_err(csv_error)?;
        bins.push(bin_from_row(path, index, &record, columns)?);
    }
    info!("loaded {} bins from {path}", bins.len());
    Ok(bins)
}

fn property_text(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        // Whole floats such as 240.0 render without a fraction.
        JsonValue::Number(number) if number.is_f64() => number.as_f64().map(|value| value.to_string()),
        JsonValue::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn point_location(path: &Utf8Path, index: usize, feature: &Feature) -> Result<Coord<f64>, DataFormatError> {
    let invalid = |reason: &str| DataFormatError::InvalidGeometry {
        path: path.to_path_buf(),
        record: index,
        reason: reason.to_owned(),
    };
    let geometry = feature.geometry.as_ref().ok_or_else(|| invalid("missing geometry"))?;
    let Value::Point(position) = &geometry.value else {
        return Err(invalid("geometry type is not Point"));
    };
    let [lon, lat, ..] = position.as_slice() else {
        return Err(invalid("position has fewer than two ordinates"));
    };
    if !lon.is_finite() || !lat.is_finite() {
        return Err(invalid("position is not finite"));
    }
    Ok(Coord { x: *lon, y: *lat })
}

fn bin_from_feature(path: &Utf8Path, index: usize, feature: &Feature) -> Result<BinRecord, DataFormatError> {
    let location = point_location(path, index, feature)?;
    let id = property_text(feature, "bin_id").unwrap_or_else(|| default_bin_id(index));
    let mut bin = BinRecord::new(id, location);
    if let Some(kind) = property_text(feature, "bin_type") {
        bin.bin_type = kind;
    }
    if let Some(raw) = property_text(feature, "capacity_liters") {
        bin.capacity_litres = parse_capacity(path, index, &raw)?;
    }
    Ok(bin)
}

/// Read bins from a GeoJSON file of `Point` features.
///
/// Accepts a `FeatureCollection` or a single `Feature`. Properties follow the
/// CSV column names: `bin_id`, `bin_type` and `capacity_liters`, each
/// optional.
///
/// # Errors
/// Returns [`DataFormatError`] when the file is not GeoJSON or a feature is
/// not a finite point.
pub fn read_bins_geojson(path: &Utf8Path) -> Result<Vec<BinRecord>, DataFormatError> {
    read_bins_geojson_from(path, open(path)?)
}

/// Read GeoJSON bins from any reader; `path` only labels errors.
///
/// # Errors
/// Returns [`DataFormatError`] when the input is not GeoJSON or a feature is
/// not a finite point.
pub fn read_bins_geojson_from<R: Read>(
    path: &Utf8Path,
    source: R,
) -> Result<Vec<BinRecord>, DataFormatError> {
    let text = io::read_to_string(source).map_err(|source| DataFormatError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let document = text
        .parse::<GeoJson>()
        .map_err(|source| DataFormatError::GeoJson {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
    let features = match document {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(DataFormatError::InvalidGeometry {
                path: path.to_path_buf(),
                record: 0,
                reason: "expected features, found a bare geometry".to_owned(),
            });
        }
    };
    let bins = features
        .iter()
        .enumerate()
        .map(|(index, feature)| bin_from_feature(path, index, feature))
        .collect::<Result<Vec<_>, _>>()?;
    info!("loaded {} bins from {path}", bins.len());
    Ok(bins)
}

/// Read bins, choosing the format from the file extension.
///
/// `.geojson` and `.json` files are read as GeoJSON; anything else as CSV.
///
/// # Errors
/// Returns [`DataFormatError`] from the selected reader.
pub fn read_bins(path: &Utf8Path) -> Result<Vec<BinRecord>, DataFormatError> {
    match path.extension().map(str::to_ascii_lowercase).as_deref() {
        Some("geojson" | "json") => read_bins_geojson(path),
        _ => read_bins_csv(path),
    }
}
