//! Candidate cells covering the study region.
//!
//! The grid is a regular lattice over the configured bounding box, filtered
//! to points inside the region outline. Cells are created here and later
//! filled in by the scorer and categoriser.

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, ConfigError, MAX_LATTICE_POINTS};
use crate::geometry::Region;

/// Tolerance that keeps the maximum edge on the lattice despite rounding.
const LATTICE_TOLERANCE: f64 = 1e-9;

/// Dense identifier of a grid cell, assigned in scan order.
///
/// # Examples
/// ```
/// use footfall_core::CellId;
///
/// assert_eq!(CellId::new(42).to_string(), "CELL00042");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw index.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CELL{:05}", self.0)
    }
}

/// One lattice point of the analysis grid with its scores and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Cell identifier.
    pub id: CellId,
    /// Lattice point at the cell centre.
    pub center: Coord<f64>,
    /// Raw rail influence.
    pub transit_score: f64,
    /// Raw bus influence.
    pub bus_score: f64,
    /// Raw venue influence.
    pub venue_score: f64,
    /// Weighted sum of the normalised components.
    pub footfall_score: f64,
    /// Footfall band in `[0, K)`.
    pub category: usize,
    /// Human-readable band label.
    pub category_label: String,
    /// Estimated pedestrians per hour.
    pub people_per_hour: f64,
    /// Estimated daily bin fill, as a percentage of a 240 L bin.
    pub bin_fill_rate: f64,
    /// Administrative ward, when tagged.
    pub ward: Option<String>,
    /// Road name, when tagged.
    pub road: Option<String>,
}

/// Placeholder shown for missing administrative tags.
pub const UNKNOWN_TAG: &str = "Unknown";

impl GridCell {
    /// A fresh cell with zeroed scores and no tags.
    #[must_use]
    pub const fn new(id: CellId, center: Coord<f64>) -> Self {
        Self {
            id,
            center,
            transit_score: 0.0,
            bus_score: 0.0,
            venue_score: 0.0,
            footfall_score: 0.0,
            category: 0,
            category_label: String::new(),
            people_per_hour: 0.0,
            bin_fill_rate: 0.0,
            ward: None,
            road: None,
        }
    }

    /// Ward name, or `"Unknown"` when untagged.
    #[must_use]
    pub fn ward_or_unknown(&self) -> &str {
        self.ward.as_deref().unwrap_or(UNKNOWN_TAG)
    }

    /// Road name, or `"Unknown"` when untagged.
    #[must_use]
    pub fn road_or_unknown(&self) -> &str {
        self.road.as_deref().unwrap_or(UNKNOWN_TAG)
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "span over spacing is non-negative; oversized counts saturate"
)]
fn lattice_steps(min: f64, max: f64, resolution: f64) -> usize {
    let span = ((max - min) / resolution + LATTICE_TOLERANCE).floor() as usize;
    span.saturating_add(1)
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "lattice coordinates are offsets from the box minimum"
)]
fn lattice_coord(min: f64, index: usize, resolution: f64) -> f64 {
    min + index as f64 * resolution
}

/// Enumerate lattice points inside `region`, latitude-major.
///
/// Points are visited latitude ascending, then longitude ascending, at
/// `min + i * resolution`, including the maximum edge when it lies on the
/// lattice. Ids are dense in scan order.
///
/// # Errors
/// Returns [`ConfigError`] when the configuration fails validation or the
/// lattice would exceed [`MAX_LATTICE_POINTS`].
///
/// # Examples
/// ```
/// use footfall_core::{build_grid, AnalysisConfig, Region};
///
/// let cells = build_grid(&AnalysisConfig::default(), &Region::westminster())
///     .expect("default config is valid");
/// assert!(!cells.is_empty());
/// assert_eq!(cells[0].id.get(), 0);
/// ```
pub fn build_grid(config: &AnalysisConfig, region: &Region) -> Result<Vec<GridCell>, ConfigError> {
    config.validate()?;
    let bounds = config.bounds;
    let lon_steps = lattice_steps(bounds.min_lon, bounds.max_lon, config.resolution);
    let lat_steps = lattice_steps(bounds.min_lat, bounds.max_lat, config.resolution);
    let points = lon_steps.saturating_mul(lat_steps);
    if points > MAX_LATTICE_POINTS {
        return Err(ConfigError::ResolutionTooFine {
            resolution: config.resolution,
            points,
            limit: MAX_LATTICE_POINTS,
        });
    }

    let mut cells = Vec::new();
    for lat_index in 0..lat_steps {
        let y = lattice_coord(bounds.min_lat, lat_index, config.resolution);
        for lon_index in 0..lon_steps {
            let x = lattice_coord(bounds.min_lon, lon_index, config.resolution);
            let center = Coord { x, y };
            if !region.contains(center) {
                continue;
            }
            // MAX_LATTICE_POINTS keeps the count well inside u32.
            let id = u32::try_from(cells.len()).unwrap_or(u32::MAX);
            cells.push(GridCell::new(CellId::new(id), center));
        }
    }
    log::info!(
        "built {} grid cells from {} lattice points in {}",
        cells.len(),
        points,
        region.name()
    );
    Ok(cells)
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests offset and compare lattice coordinates"
)]
mod tests {
    use super::*;
    use crate::config::BoundingBox;
    use geo::Rect;
    use rstest::rstest;

    fn covering_region(bounds: BoundingBox) -> Region {
        let rect = Rect::new(
            Coord {
                x: bounds.min_lon - 1.0,
                y: bounds.min_lat - 1.0,
            },
            Coord {
                x: bounds.max_lon + 1.0,
                y: bounds.max_lat + 1.0,
            },
        );
        Region::from_rect("cover", rect)
    }

    #[rstest]
    fn lattice_includes_maximum_edge() {
        let bounds = BoundingBox::new(0.0, 0.3, 0.0, 0.2);
        let config = AnalysisConfig::default()
            .with_bounds(bounds)
            .with_resolution(0.1);
        let cells = build_grid(&config, &covering_region(bounds)).expect("grid");
        assert_eq!(cells.len(), 4 * 3);
        let last = cells.last().expect("cells");
        assert!((last.center.x - 0.3).abs() < 1e-12);
        assert!((last.center.y - 0.2).abs() < 1e-12);
    }

    #[rstest]
    fn scan_is_latitude_major_with_dense_ids() {
        let bounds = BoundingBox::new(0.0, 0.1, 0.0, 0.1);
        let config = AnalysisConfig::default()
            .with_bounds(bounds)
            .with_resolution(0.1);
        let cells = build_grid(&config, &covering_region(bounds)).expect("grid");
        let centres: Vec<(f64, f64)> = cells.iter().map(|c| (c.center.x, c.center.y)).collect();
        assert_eq!(centres, vec![(0.0, 0.0), (0.1, 0.0), (0.0, 0.1), (0.1, 0.1)]);
        let ids: Vec<u32> = cells.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[rstest]
    fn westminster_grid_stays_inside_outline() {
        let region = Region::westminster();
        let cells = build_grid(&AnalysisConfig::default(), &region).expect("grid");
        assert!(cells.len() < 91 * 51);
        assert!(cells.iter().all(|cell| region.contains(cell.center)));
    }

    #[rstest]
    fn disjoint_region_yields_no_cells() {
        let far = Region::from_rect(
            "far",
            Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 11.0, y: 11.0 }),
        );
        let cells = build_grid(&AnalysisConfig::default(), &far).expect("grid");
        assert!(cells.is_empty());
    }

    #[rstest]
    fn rejects_lattice_beyond_limit() {
        let config = AnalysisConfig::default().with_resolution(1e-6);
        let err = build_grid(&config, &Region::westminster()).expect_err("too fine");
        assert!(matches!(err, ConfigError::ResolutionTooFine { .. }));
    }

    #[rstest]
    fn vanishing_resolution_is_too_fine_rather_than_empty() {
        let config = AnalysisConfig::default().with_resolution(1e-300);
        config.validate().expect("positive finite resolution validates");
        let err = build_grid(&config, &Region::westminster()).expect_err("too fine");
        match err {
            ConfigError::ResolutionTooFine { points, limit, .. } => {
                assert_eq!(points, usize::MAX);
                assert_eq!(limit, MAX_LATTICE_POINTS);
            }
            other => panic!("expected ResolutionTooFine, found {other:?}"),
        }
    }

    #[rstest]
    fn untagged_cells_render_unknown() {
        let cell = GridCell::new(CellId::new(0), Coord { x: 0.0, y: 0.0 });
        assert_eq!(cell.ward_or_unknown(), "Unknown");
        assert_eq!(cell.road_or_unknown(), "Unknown");
    }
}
