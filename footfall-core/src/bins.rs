//! Candidate bin locations and their link to scored cells.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::grid::{CellId, GridCell, UNKNOWN_TAG};
use crate::spatial_index::PointIndex;

/// Cell attributes a bin inherits once it is linked to the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAssignment {
    /// Nearest cell.
    pub cell_id: CellId,
    /// Distance to the cell centre in degrees.
    pub distance: f64,
    /// Footfall band of the cell.
    pub category: usize,
    /// Band label of the cell.
    pub category_label: String,
    /// Composite score of the cell.
    pub footfall_score: f64,
    /// Estimated pedestrians per hour at the cell.
    pub people_per_hour: f64,
    /// Estimated daily fill percentage at the cell.
    pub bin_fill_rate: f64,
    /// Ward of the cell.
    pub ward: Option<String>,
    /// Road of the cell.
    pub road: Option<String>,
}

impl CellAssignment {
    fn from_cell(cell: &GridCell, distance: f64) -> Self {
        Self {
            cell_id: cell.id,
            distance,
            category: cell.category,
            category_label: cell.category_label.clone(),
            footfall_score: cell.footfall_score,
            people_per_hour: cell.people_per_hour,
            bin_fill_rate: cell.bin_fill_rate,
            ward: cell.ward.clone(),
            road: cell.road.clone(),
        }
    }
}

/// A candidate bin location.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use footfall_core::BinRecord;
///
/// let bin = BinRecord::new("BIN00001", Coord { x: -0.14, y: 51.51 });
/// assert!(!bin.is_assigned());
/// assert_eq!(bin.selection_rank(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    /// Bin identifier.
    pub id: String,
    /// Bin position.
    pub location: Coord<f64>,
    /// Waste stream, e.g. `General Waste`.
    pub bin_type: String,
    /// Nominal capacity in litres.
    pub capacity_litres: u32,
    /// Link to the nearest cell, when close enough.
    pub assignment: Option<CellAssignment>,
    /// Sensor selection rank, starting at one.
    pub selection: Option<usize>,
}

/// Waste stream recorded when a source omits it.
pub const DEFAULT_BIN_TYPE: &str = "General Waste";

/// Capacity recorded when a source omits it.
pub const DEFAULT_CAPACITY_LITRES: u32 = 240;

impl BinRecord {
    /// A general-waste 240 L bin at `location`.
    #[must_use]
    pub fn new(id: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id: id.into(),
            location,
            bin_type: DEFAULT_BIN_TYPE.to_owned(),
            capacity_litres: DEFAULT_CAPACITY_LITRES,
            assignment: None,
            selection: None,
        }
    }

    /// Replace the waste stream and capacity.
    #[must_use]
    pub fn with_details(mut self, bin_type: impl Into<String>, capacity_litres: u32) -> Self {
        self.bin_type = bin_type.into();
        self.capacity_litres = capacity_litres;
        self
    }

    /// Whether the bin is linked to a cell.
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.assignment.is_some()
    }

    /// Whether the bin was chosen for a sensor.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selection.is_some()
    }

    /// Sensor rank, if selected.
    #[must_use]
    pub const fn selection_rank(&self) -> Option<usize> {
        self.selection
    }

    /// Footfall band inherited from the linked cell.
    #[must_use]
    pub fn category(&self) -> Option<usize> {
        self.assignment.as_ref().map(|assignment| assignment.category)
    }

    /// Ward inherited from the linked cell, or `"Unknown"`.
    #[must_use]
    pub fn ward_or_unknown(&self) -> &str {
        self.assignment
            .as_ref()
            .and_then(|assignment| assignment.ward.as_deref())
            .unwrap_or(UNKNOWN_TAG)
    }

    /// Road inherited from the linked cell, or `"Unknown"`.
    #[must_use]
    pub fn road_or_unknown(&self) -> &str {
        self.assignment
            .as_ref()
            .and_then(|assignment| assignment.road.as_deref())
            .unwrap_or(UNKNOWN_TAG)
    }
}

/// Outcome counts of [`assign_bins`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReport {
    /// Bins linked to a cell.
    pub assigned: usize,
    /// Bins left without a cell.
    pub unassigned: usize,
}

/// Link each bin to its nearest cell within `2 * resolution`.
///
/// Bins further away, or with a non-finite position, are left unassigned and
/// counted in the report. Any previous assignment or selection is cleared.
pub fn assign_bins(
    bins: &mut [BinRecord],
    cells: &[GridCell],
    config: &AnalysisConfig,
) -> AssignmentReport {
    let threshold = config.assignment_threshold();
    let index = PointIndex::build(cells.iter().map(|cell| cell.center));
    let mut report = AssignmentReport::default();

    for bin in bins.iter_mut() {
        bin.selection = None;
        bin.assignment = None;
        if !(bin.location.x.is_finite() && bin.location.y.is_finite()) {
            report.unassigned += 1;
            continue;
        }
        let nearest = index
            .nearest(bin.location)
            .filter(|&(_, d)| d < threshold)
            .and_then(|(i, d)| cells.get(i).map(|cell| (cell, d)));
        match nearest {
            Some((cell, d)) => {
                bin.assignment = Some(CellAssignment::from_cell(cell, d));
                report.assigned += 1;
            }
            None => report.unassigned += 1,
        }
    }

    if report.unassigned > 0 {
        log::warn!(
            "{} of {} bins lie further than {threshold} degrees from every cell and were left unassigned",
            report.unassigned,
            bins.len()
        );
    }
    log::info!("assigned {} bins to grid cells", report.assigned);
    report
}

#[cfg(test)]
#[expect(clippy::indexing_slicing, reason = "tests inspect single-bin fixtures")]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn cells() -> Vec<GridCell> {
        [(0.0, 0.0), (0.001, 0.0), (0.0, 0.001)]
            .into_iter()
            .enumerate()
            .map(|(i, (x, y))| {
                let id = u32::try_from(i).expect("small index");
                let mut cell = GridCell::new(CellId::new(id), Coord { x, y });
                cell.category = i;
                cell.ward = Some(format!("Ward {i}"));
                cell
            })
            .collect()
    }

    #[rstest]
    fn links_nearest_cell_and_inherits_attributes(cells: Vec<GridCell>) {
        let mut bins = vec![BinRecord::new("BIN00000", Coord { x: 0.0009, y: 0.0 })];
        let report = assign_bins(&mut bins, &cells, &AnalysisConfig::default());
        assert_eq!(report, AssignmentReport { assigned: 1, unassigned: 0 });
        let assignment = bins[0].assignment.as_ref().expect("assigned");
        assert_eq!(assignment.cell_id, CellId::new(1));
        assert_eq!(assignment.category, 1);
        assert_eq!(bins[0].ward_or_unknown(), "Ward 1");
        assert_eq!(bins[0].road_or_unknown(), "Unknown");
    }

    #[rstest]
    fn equidistant_bins_take_lowest_cell_id(cells: Vec<GridCell>) {
        let mut bins = vec![BinRecord::new("BIN00000", Coord { x: 0.0005, y: 0.0005 })];
        assign_bins(&mut bins, &cells, &AnalysisConfig::default());
        assert_eq!(bins[0].assignment.as_ref().map(|a| a.cell_id), Some(CellId::new(0)));
    }

    #[rstest]
    fn distant_and_invalid_bins_stay_unassigned(cells: Vec<GridCell>) {
        let mut bins = vec![
            BinRecord::new("far", Coord { x: 0.01, y: 0.01 }),
            BinRecord::new("beyond", Coord { x: 0.0035, y: 0.0 }),
            BinRecord::new("nan", Coord { x: f64::NAN, y: 0.0 }),
        ];
        let report = assign_bins(&mut bins, &cells, &AnalysisConfig::default());
        assert_eq!(report, AssignmentReport { assigned: 0, unassigned: 3 });
        assert!(bins.iter().all(|bin| !bin.is_assigned()));
    }

    #[rstest]
    fn empty_grid_leaves_every_bin_unassigned() {
        let mut bins = vec![BinRecord::new("BIN00000", Coord { x: 0.0, y: 0.0 })];
        let report = assign_bins(&mut bins, &[], &AnalysisConfig::default());
        assert_eq!(report.unassigned, 1);
    }

    #[rstest]
    fn reassignment_clears_previous_selection(cells: Vec<GridCell>) {
        let mut bins = vec![BinRecord::new("BIN00000", Coord { x: 0.0, y: 0.0 })];
        bins[0].selection = Some(1);
        assign_bins(&mut bins, &cells, &AnalysisConfig::default());
        assert!(!bins[0].is_selected());
        assert!(bins[0].is_assigned());
    }
}
