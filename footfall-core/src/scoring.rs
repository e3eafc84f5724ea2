//! Distance-decay footfall scoring.
//!
//! Every cell accumulates one raw score per POI kind by summing the decayed
//! weights of features strictly inside that kind's radius. The raw
//! components are min-max normalised across the run and combined with the
//! configured weights into the composite footfall score.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::config::{AnalysisConfig, Influence};
use crate::grid::GridCell;
use crate::poi::{PoiCatalog, PoiKind, WeightedPoi};
use crate::spatial_index::PointIndex;

/// Shape of the influence falloff between the feature and its radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayKernel {
    /// `weight * (1 - d / radius)^2`.
    Quadratic,
    /// `weight * (1 - d / radius)`.
    Linear,
}

impl DecayKernel {
    /// Kernel applied to features of `kind`.
    #[must_use]
    pub const fn for_kind(kind: PoiKind) -> Self {
        match kind {
            PoiKind::Transit => Self::Quadratic,
            PoiKind::BusStop | PoiKind::Venue => Self::Linear,
        }
    }

    /// Decayed contribution of `weight` at `distance`.
    ///
    /// The distance is raised to `floor` first; callers filter out features
    /// at or beyond `radius`.
    ///
    /// # Examples
    /// ```
    /// use footfall_core::DecayKernel;
    ///
    /// let near = DecayKernel::Linear.contribution(10.0, 0.5, 1.0, 1e-5);
    /// assert!((near - 5.0).abs() < 1e-12);
    /// ```
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "kernel evaluation")]
    pub fn contribution(self, weight: f64, distance: f64, radius: f64, floor: f64) -> f64 {
        let falloff = 1.0 - distance.max(floor) / radius;
        match self {
            Self::Quadratic => weight * falloff * falloff,
            Self::Linear => weight * falloff,
        }
    }
}

/// Observed range of one raw component across all cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentRange {
    /// Smallest raw value.
    pub min: f64,
    /// Largest raw value.
    pub max: f64,
}

impl ComponentRange {
    fn observe(values: &[f64]) -> Self {
        let mut iter = values.iter().copied();
        let Some(first) = iter.next() else {
            return Self { min: 0.0, max: 0.0 };
        };
        iter.fold(Self { min: first, max: first }, |range, value| Self {
            min: range.min.min(value),
            max: range.max.max(value),
        })
    }

    /// Map `value` onto `[0, 1]`; a flat range maps everything to zero.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "min-max normalisation")]
    pub fn normalise(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span > 0.0 {
            (value - self.min) / span
        } else {
            0.0
        }
    }
}

/// Ranges observed while scoring; useful for diagnostics and exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringSummary {
    /// Raw rail influence range.
    pub transit: ComponentRange,
    /// Raw bus influence range.
    pub bus_stop: ComponentRange,
    /// Raw venue influence range.
    pub venue: ComponentRange,
    /// Composite score range after combination.
    pub footfall: ComponentRange,
}

/// Raw influence of `pois` at each centre.
///
/// Contributions are summed in feature order, so the result is independent
/// of the spatial index layout.
#[must_use]
pub fn raw_influence<P: WeightedPoi>(
    centres: &[Coord<f64>],
    pois: &[P],
    influence: Influence,
    floor: f64,
) -> Vec<f64> {
    let kernel = DecayKernel::for_kind(P::KIND);
    let index = PointIndex::build(pois.iter().map(WeightedPoi::location));
    centres
        .iter()
        .map(|&centre| {
            index
                .within(centre, influence.radius)
                .into_iter()
                .filter_map(|(poi, d)| pois.get(poi).map(|p| (p.weight(), d)))
                .map(|(weight, d)| kernel.contribution(weight, d, influence.radius, floor))
                .sum()
        })
        .collect()
}

/// Fill raw, composite and normalised scores on every cell.
///
/// Callers validate `config` beforehand; [`crate::run_analysis`] does so.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use footfall_core::{score_cells, AnalysisConfig, CellId, GridCell, PoiCatalog};
///
/// let mut cells = vec![
///     GridCell::new(CellId::new(0), Coord { x: 0.0, y: 0.0 }),
///     GridCell::new(CellId::new(1), Coord { x: 0.001, y: 0.0 }),
/// ];
/// score_cells(&mut cells, &PoiCatalog::default(), &AnalysisConfig::default());
/// assert!(cells.iter().all(|cell| cell.footfall_score == 0.0));
/// ```
#[expect(clippy::float_arithmetic, reason = "weighted sum of normalised components")]
pub fn score_cells(
    cells: &mut [GridCell],
    catalog: &PoiCatalog,
    config: &AnalysisConfig,
) -> ScoringSummary {
    let centres: Vec<Coord<f64>> = cells.iter().map(|cell| cell.center).collect();
    let floor = config.distance_floor;
    let settings = config.influence;
    let transit = raw_influence(&centres, &catalog.transit, settings.transit, floor);
    let bus = raw_influence(&centres, &catalog.bus_stops, settings.bus_stop, floor);
    let venue = raw_influence(&centres, &catalog.venues, settings.venue, floor);

    let ranges = [
        ComponentRange::observe(&transit),
        ComponentRange::observe(&bus),
        ComponentRange::observe(&venue),
    ];
    let [w_transit, w_bus, w_venue] = settings.normalised_weights();
    let [r_transit, r_bus, r_venue] = ranges;

    for (((cell, t), b), v) in cells.iter_mut().zip(transit).zip(bus).zip(venue) {
        cell.transit_score = t;
        cell.bus_score = b;
        cell.venue_score = v;
        cell.footfall_score = w_transit * r_transit.normalise(t)
            + w_bus * r_bus.normalise(b)
            + w_venue * r_venue.normalise(v);
    }

    let composite: Vec<f64> = cells.iter().map(|cell| cell.footfall_score).collect();
    let summary = ScoringSummary {
        transit: r_transit,
        bus_stop: r_bus,
        venue: r_venue,
        footfall: ComponentRange::observe(&composite),
    };
    log::info!(
        "scored {} cells against {} points of interest (footfall {:.3}..{:.3})",
        cells.len(),
        catalog.len(),
        summary.footfall.min,
        summary.footfall.max
    );
    summary
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "tests compare float scores by cell position"
)]
mod tests {
    use super::*;
    use crate::grid::CellId;
    use crate::poi::{BusStop, TransitStation, Venue};
    use rstest::{fixture, rstest};

    #[fixture]
    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    fn cell(id: u32, x: f64, y: f64) -> GridCell {
        GridCell::new(CellId::new(id), Coord { x, y })
    }

    #[rstest]
    #[case(DecayKernel::Quadratic, 0.5, 25.0)]
    #[case(DecayKernel::Linear, 0.5, 50.0)]
    #[case(DecayKernel::Linear, 0.0, 100.0 * (1.0 - 1e-5))]
    fn kernels_decay_with_distance(
        #[case] kernel: DecayKernel,
        #[case] distance: f64,
        #[case] expected: f64,
    ) {
        let value = kernel.contribution(100.0, distance, 1.0, 1e-5);
        assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
    }

    #[rstest]
    fn station_at_cell_centre_uses_distance_floor(config: AnalysisConfig) {
        let station =
            TransitStation::new("Centre", Coord { x: 0.0, y: 0.0 }, 100.0).expect("station");
        let mut cells = vec![cell(0, 0.0, 0.0), cell(1, 0.005, 0.0), cell(2, 0.0025, 0.0)];
        let catalog = PoiCatalog::new(vec![station], Vec::new(), Vec::new());
        score_cells(&mut cells, &catalog, &config);

        let falloff = 1.0 - config.distance_floor / 0.005;
        let expected = 100.0 * falloff * falloff;
        assert!((cells[0].transit_score - expected).abs() < 1e-9);
        assert_eq!(cells[1].transit_score, 0.0, "features at the radius are excluded");
        assert!((cells[2].transit_score - 25.0).abs() < 1e-9);
    }

    #[rstest]
    fn composite_is_weighted_sum_of_normalised_components(config: AnalysisConfig) {
        let catalog = PoiCatalog::new(
            vec![TransitStation::new("T", Coord { x: 0.0, y: 0.0 }, 50.0).expect("station")],
            vec![BusStop::new("BS0001", Coord { x: 1.0, y: 0.0 }, 10).expect("stop")],
            vec![Venue::new("LP00001", "A", "Pub", Coord { x: 2.0, y: 0.0 }, 100).expect("venue")],
        );
        let mut cells = vec![
            cell(0, 0.0, 0.0),
            cell(1, 1.0, 0.0),
            cell(2, 2.0, 0.0),
            cell(3, 3.0, 0.0),
        ];
        let summary = score_cells(&mut cells, &catalog, &config);
        let scores: Vec<f64> = cells.iter().map(|c| c.footfall_score).collect();

        assert!((scores[0] - 0.45).abs() < 1e-9);
        assert!((scores[1] - 0.30).abs() < 1e-9);
        assert!((scores[2] - 0.25).abs() < 1e-9);
        assert_eq!(scores[3], 0.0);
        assert_eq!(summary.transit.min, 0.0);
        assert!((summary.footfall.max - 0.45).abs() < 1e-9);
    }

    #[rstest]
    fn empty_catalogue_scores_zero(config: AnalysisConfig) {
        let mut cells = vec![cell(0, 0.0, 0.0), cell(1, 0.001, 0.0)];
        let summary = score_cells(&mut cells, &PoiCatalog::default(), &config);
        assert!(cells.iter().all(|c| c.footfall_score == 0.0));
        assert_eq!(summary.footfall, ComponentRange { min: 0.0, max: 0.0 });
    }

    #[rstest]
    fn overlapping_features_accumulate(config: AnalysisConfig) {
        let stops = vec![
            BusStop::new("BS0001", Coord { x: 0.0005, y: 0.0 }, 10).expect("stop"),
            BusStop::new("BS0002", Coord { x: -0.0005, y: 0.0 }, 10).expect("stop"),
        ];
        let raw = raw_influence(&[Coord { x: 0.0, y: 0.0 }], &stops, config.influence.bus_stop, 1e-5);
        assert!((raw[0] - 15.0).abs() < 1e-9);
    }
}
