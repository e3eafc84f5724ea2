//! End-to-end analysis: grid, scores, bands, bin links and sensor picks.
//!
//! Stages run strictly in order and each one finishes before the next
//! starts. Callers follow progress through a [`ProgressObserver`].

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bins::{AssignmentReport, BinRecord, assign_bins};
use crate::category::categorize;
use crate::config::{AnalysisConfig, ConfigError};
use crate::geometry::Region;
use crate::grid::{GridCell, build_grid};
use crate::placement::{PlacementReport, PlacementRequest, select_sensors};
use crate::poi::PoiCatalog;
use crate::scoring::{ScoringSummary, score_cells};

/// Pipeline stage, reported as it begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Enumerating lattice cells inside the region.
    BuildingGrid,
    /// Computing influence scores.
    Scoring,
    /// Assigning footfall bands and tags.
    Categorising,
    /// Linking bins to cells.
    AssigningBins,
    /// Choosing sensor locations.
    PlacingSensors,
    /// All stages finished.
    Complete,
}

impl PipelineStage {
    /// Overall progress, in percent, when the stage begins.
    #[must_use]
    pub const fn progress(self) -> u8 {
        match self {
            Self::BuildingGrid => 35,
            Self::Scoring => 45,
            Self::Categorising => 60,
            Self::AssigningBins => 80,
            Self::PlacingSensors => 90,
            Self::Complete => 100,
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::BuildingGrid => "Creating analysis grid",
            Self::Scoring => "Calculating footfall scores",
            Self::Categorising => "Categorising footfall",
            Self::AssigningBins => "Assigning bins to grid cells",
            Self::PlacingSensors => "Selecting sensor locations",
            Self::Complete => "Analysis complete",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Receives stage transitions from [`run_analysis`].
pub trait ProgressObserver {
    /// Called as `stage` begins.
    fn on_stage(&mut self, stage: PipelineStage);
}

impl<F> ProgressObserver for F
where
    F: FnMut(PipelineStage),
{
    fn on_stage(&mut self, stage: PipelineStage) {
        self(stage);
    }
}

/// Errors that abort an analysis run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The configuration failed validation.
    #[error("invalid analysis configuration: {0}")]
    Config(#[from] ConfigError),
    /// No lattice point fell inside the region.
    #[error("region {region} contains no grid cells at the configured resolution")]
    EmptyGrid {
        /// Name of the region.
        region: String,
    },
}

/// Everything one run consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInputs {
    /// Run settings.
    pub config: AnalysisConfig,
    /// Study region outline.
    pub region: Region,
    /// Points of interest.
    pub catalog: PoiCatalog,
    /// Candidate bins.
    pub bins: Vec<BinRecord>,
}

/// Immutable result of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    /// Settings the run used.
    pub config: AnalysisConfig,
    /// Name of the study region.
    pub region: String,
    /// POI counts by kind: transit, bus stops, venues.
    pub poi_counts: [usize; 3],
    /// Scored and tagged cells in id order.
    pub cells: Vec<GridCell>,
    /// Bins in input order with assignments and selections.
    pub bins: Vec<BinRecord>,
    /// Raw and composite score ranges.
    pub scoring: ScoringSummary,
    /// Cells per footfall band.
    pub category_counts: Vec<usize>,
    /// Bin linking counts.
    pub assignment: AssignmentReport,
    /// Sensor placement summary.
    pub placement: PlacementReport,
}

impl AnalysisOutcome {
    /// Selected bins ordered by rank.
    #[must_use]
    pub fn selected_bins(&self) -> Vec<&BinRecord> {
        let mut selected: Vec<&BinRecord> =
            self.bins.iter().filter(|bin| bin.is_selected()).collect();
        selected.sort_by_key(|bin| bin.selection_rank());
        selected
    }
}

fn timed<T>(
    observer: &mut dyn ProgressObserver,
    stage: PipelineStage,
    work: impl FnOnce() -> T,
) -> T {
    log::debug!("{stage} ({}%)", stage.progress());
    observer.on_stage(stage);
    let started = Instant::now();
    let result = work();
    log::info!("{stage} took {:?}", started.elapsed());
    result
}

/// Run every stage over `inputs`, reporting progress to `observer`.
///
/// # Errors
/// Returns [`AnalysisError::Config`] for an invalid configuration and
/// [`AnalysisError::EmptyGrid`] when the region holds no cells.
///
/// # Examples
/// ```
/// use footfall_core::{
///     run_analysis, AnalysisConfig, AnalysisInputs, PipelineStage, PoiCatalog, Region,
/// };
///
/// let inputs = AnalysisInputs {
///     config: AnalysisConfig::default(),
///     region: Region::westminster(),
///     catalog: PoiCatalog::default(),
///     bins: Vec::new(),
/// };
/// let mut stages = Vec::new();
/// let outcome = run_analysis(inputs, &mut |stage: PipelineStage| stages.push(stage)).expect("analysis");
/// assert!(!outcome.cells.is_empty());
/// assert_eq!(stages.last().map(|s| s.progress()), Some(100));
/// ```
pub fn run_analysis(
    inputs: AnalysisInputs,
    observer: &mut dyn ProgressObserver,
) -> Result<AnalysisOutcome, AnalysisError> {
    let AnalysisInputs {
        config,
        region,
        catalog,
        mut bins,
    } = inputs;
    config.validate()?;

    let mut cells = timed(observer, PipelineStage::BuildingGrid, || {
        build_grid(&config, &region)
    })?;
    if cells.is_empty() {
        return Err(AnalysisError::EmptyGrid {
            region: region.name().to_owned(),
        });
    }
    let scoring = timed(observer, PipelineStage::Scoring, || {
        score_cells(&mut cells, &catalog, &config)
    });
    let category_counts = timed(observer, PipelineStage::Categorising, || {
        categorize(&mut cells, &config)
    });
    let assignment = timed(observer, PipelineStage::AssigningBins, || {
        assign_bins(&mut bins, &cells, &config)
    });
    let placement = timed(observer, PipelineStage::PlacingSensors, || {
        select_sensors(&mut bins, &PlacementRequest::from(&config))
    });
    observer.on_stage(PipelineStage::Complete);

    Ok(AnalysisOutcome {
        poi_counts: [
            catalog.transit.len(),
            catalog.bus_stops.len(),
            catalog.venues.len(),
        ],
        region: region.name().to_owned(),
        config,
        cells,
        bins,
        scoring,
        category_counts,
        assignment,
        placement,
    })
}
