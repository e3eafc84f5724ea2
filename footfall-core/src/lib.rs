//! Core engine for footfall analysis and bin sensor placement.
//!
//! The pipeline lays a regular lattice over a study region, scores each cell
//! by its proximity to transit stations, bus stops and licensed venues,
//! bands the scores into footfall categories, links candidate bins to their
//! nearest cell and finally chooses a category-balanced, spatially spread set
//! of bins to carry fill-level sensors.
//!
//! Every stage is deterministic: the same inputs always yield the same
//! cells, bands and sensor ranks.
//!
//! # Examples
//!
//! ```
//! use footfall_core::{
//!     AnalysisConfig, AnalysisInputs, BinRecord, PipelineStage, PoiCatalog, Region,
//!     TransitStation, run_analysis,
//! };
//! use geo::Coord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let station = TransitStation::new("Oxford Circus", Coord { x: -0.1415, y: 51.5154 }, 98.0)?;
//! let inputs = AnalysisInputs {
//!     config: AnalysisConfig::default().with_sensor_count(1),
//!     region: Region::westminster(),
//!     catalog: PoiCatalog::new(vec![station], Vec::new(), Vec::new()),
//!     bins: vec![BinRecord::new("BIN00001", Coord { x: -0.1415, y: 51.5154 })],
//! };
//! let outcome = run_analysis(inputs, &mut |_: PipelineStage| {})?;
//! assert_eq!(outcome.selected_bins().len(), 1);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod admin;
pub mod bins;
pub mod category;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod pipeline;
pub mod placement;
pub mod poi;
pub mod run;
pub mod scoring;
pub mod spatial_index;
pub mod summary;

pub use admin::{AdminTags, FALLBACK_ROAD, FALLBACK_WARD, tag_location, ward_names};
pub use bins::{AssignmentReport, BinRecord, CellAssignment, assign_bins};
pub use category::{
    REFERENCE_LABELS, categorize, category_label, estimate_bin_fill_rate,
    estimate_people_per_hour, label_index,
};
pub use config::{
    AnalysisConfig, BoundingBox, ConfigError, Influence, InfluenceSettings, PlacementStrategy,
};
pub use geometry::{Region, distance};
pub use grid::{CellId, GridCell, UNKNOWN_TAG, build_grid};
pub use pipeline::{
    AnalysisError, AnalysisInputs, AnalysisOutcome, PipelineStage, ProgressObserver, run_analysis,
};
pub use placement::{
    CATEGORY_FLOOR, CategoryTarget, DispersionSampler, PlacementReport, PlacementRequest,
    SpatialSampler, StrideSampler, allocate_targets, select_sensors,
};
pub use poi::{BusStop, PoiCatalog, PoiError, PoiKind, TransitStation, Venue, WeightedPoi};
pub use run::{RunError, RunHandle, RunSnapshot, RunStatus};
pub use scoring::{ComponentRange, DecayKernel, ScoringSummary, raw_influence, score_cells};
pub use spatial_index::PointIndex;
pub use summary::{AnalysisStats, SensorSummary, WardSummary};
