//! Percentile banding of composite scores and derived footfall estimates.

use crate::admin;
use crate::config::{AnalysisConfig, REFERENCE_CATEGORY_COUNT};
use crate::grid::GridCell;

/// Band labels for the eight-category reference scale, lowest first.
pub const REFERENCE_LABELS: [&str; REFERENCE_CATEGORY_COUNT] = [
    "Very Low Footfall (Residential)",
    "Low Footfall",
    "Low-Medium Footfall",
    "Medium Footfall",
    "Medium-High Footfall",
    "High Footfall",
    "Very High Footfall",
    "Peak Footfall (Commercial Core)",
];

/// Baseline pedestrians per hour for each reference band.
pub const PEOPLE_PER_HOUR_BASE: [f64; REFERENCE_CATEGORY_COUNT] =
    [50.0, 150.0, 350.0, 700.0, 1200.0, 2000.0, 3500.0, 5000.0];

const MIN_PEOPLE_PER_HOUR: f64 = 10.0;
const MAX_FILL_RATE: f64 = 200.0;
const ACTIVE_HOURS: f64 = 12.0;
const WASTE_KG_PER_PERSON: f64 = 0.02;
const WASTE_KG_PER_LITRE: f64 = 0.1;
const REFERENCE_BIN_LITRES: f64 = 240.0;

/// Position of band `category` (of `category_count`) on the reference scale.
///
/// Bands are spread proportionally: `round(c * 7 / (K - 1))`, with a single
/// band mapping to the lowest label.
///
/// # Examples
/// ```
/// use footfall_core::label_index;
///
/// assert_eq!(label_index(3, 4), 7);
/// assert_eq!(label_index(1, 4), 2);
/// assert_eq!(label_index(0, 1), 0);
/// ```
#[must_use]
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "rounded integer scaling between band counts"
)]
pub fn label_index(category: usize, category_count: usize) -> usize {
    let top = REFERENCE_CATEGORY_COUNT - 1;
    if category_count <= 1 {
        return 0;
    }
    let span = category_count - 1;
    let clamped = category.min(span);
    ((clamped * top * 2 + span) / (span * 2)).min(top)
}

/// Reference label for band `category` of `category_count`.
#[must_use]
pub fn category_label(category: usize, category_count: usize) -> &'static str {
    REFERENCE_LABELS
        .get(label_index(category, category_count))
        .copied()
        .unwrap_or(REFERENCE_LABELS[0])
}

/// Estimated pedestrians per hour for a cell.
///
/// Starts from the band baseline and shifts it by up to ±30 % with the
/// composite score; never drops below ten.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "estimate scales a baseline")]
pub fn estimate_people_per_hour(score: f64, category: usize, category_count: usize) -> f64 {
    let base = PEOPLE_PER_HOUR_BASE
        .get(label_index(category, category_count))
        .copied()
        .unwrap_or(PEOPLE_PER_HOUR_BASE[0]);
    (base + base * 0.3 * (score * 2.0 - 0.5)).max(MIN_PEOPLE_PER_HOUR)
}

/// Estimated daily fill of a 240 L bin as a percentage, capped at 200.
#[must_use]
#[expect(clippy::float_arithmetic, reason = "waste volume arithmetic")]
pub fn estimate_bin_fill_rate(people_per_hour: f64) -> f64 {
    let litres = people_per_hour * ACTIVE_HOURS * WASTE_KG_PER_PERSON / WASTE_KG_PER_LITRE;
    (litres / REFERENCE_BIN_LITRES * 100.0).min(MAX_FILL_RATE)
}

/// Assign percentile bands, labels, estimates and ward/road tags.
///
/// Cells are ranked by composite score with a stable sort, so equal scores
/// keep id order. Returns the number of cells in each band.
#[expect(
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "percentile band is floor(rank * K / n)"
)]
pub fn categorize(cells: &mut [GridCell], config: &AnalysisConfig) -> Vec<usize> {
    let count = config.category_count.max(1);
    let total = cells.len();
    let mut order: Vec<usize> = (0..total).collect();
    order.sort_by(|&a, &b| {
        let score = |i: usize| cells.get(i).map_or(0.0, |cell| cell.footfall_score);
        score(a).total_cmp(&score(b))
    });

    let mut distribution = vec![0_usize; count];
    for (rank, index) in order.into_iter().enumerate() {
        let category = (rank * count / total).min(count - 1);
        if let Some(cell) = cells.get_mut(index) {
            cell.category = category;
        }
        if let Some(slot) = distribution.get_mut(category) {
            *slot += 1;
        }
    }

    for cell in cells.iter_mut() {
        cell.category_label = category_label(cell.category, count).to_owned();
        cell.people_per_hour = estimate_people_per_hour(cell.footfall_score, cell.category, count);
        cell.bin_fill_rate = estimate_bin_fill_rate(cell.people_per_hour);
        let tags = admin::tag_location(cell.center);
        cell.ward = Some(tags.ward.to_owned());
        cell.road = Some(tags.road.to_owned());
    }
    log::info!("categorised {total} cells into {count} bands: {distribution:?}");
    distribution
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    clippy::indexing_slicing,
    reason = "tests index cells and compare float estimates"
)]
mod tests {
    use super::*;
    use crate::grid::CellId;
    use geo::Coord;
    use rstest::{fixture, rstest};

    fn cells_with_scores(scores: &[f64]) -> Vec<GridCell> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                let id = u32::try_from(i).expect("small index");
                let mut cell = GridCell::new(CellId::new(id), Coord { x: -0.14, y: 51.51 });
                cell.footfall_score = score;
                cell
            })
            .collect()
    }

    #[fixture]
    fn config() -> AnalysisConfig {
        AnalysisConfig::default().with_category_count(4)
    }

    #[rstest]
    fn bands_follow_percentile_rank(config: AnalysisConfig) {
        let mut cells = cells_with_scores(&[0.9, 0.1, 0.5, 0.3, 0.7, 0.2, 0.8, 0.4]);
        let distribution = categorize(&mut cells, &config);
        let bands: Vec<usize> = cells.iter().map(|c| c.category).collect();
        assert_eq!(bands, vec![3, 0, 2, 1, 2, 0, 3, 1]);
        assert_eq!(distribution, vec![2, 2, 2, 2]);
    }

    #[rstest]
    fn equal_scores_keep_id_order(config: AnalysisConfig) {
        let mut cells = cells_with_scores(&[0.0; 8]);
        categorize(&mut cells, &config);
        let bands: Vec<usize> = cells.iter().map(|c| c.category).collect();
        assert_eq!(bands, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[rstest]
    fn categorising_tags_every_cell(config: AnalysisConfig) {
        let mut cells = cells_with_scores(&[0.2, 0.6]);
        categorize(&mut cells, &config);
        for cell in &cells {
            assert!(cell.ward.is_some());
            assert!(cell.road.is_some());
            assert!(!cell.category_label.is_empty());
        }
    }

    #[rstest]
    fn empty_grid_has_empty_bands(config: AnalysisConfig) {
        let mut cells: Vec<GridCell> = Vec::new();
        assert_eq!(categorize(&mut cells, &config), vec![0, 0, 0, 0]);
    }

    #[rstest]
    #[case(0, 8, 0)]
    #[case(7, 8, 7)]
    #[case(1, 3, 4)]
    #[case(2, 3, 7)]
    #[case(1, 2, 7)]
    fn label_indices_spread_proportionally(
        #[case] category: usize,
        #[case] count: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(label_index(category, count), expected);
    }

    #[rstest]
    fn reference_scale_labels() {
        assert_eq!(category_label(0, 8), "Very Low Footfall (Residential)");
        assert_eq!(category_label(7, 8), "Peak Footfall (Commercial Core)");
    }

    #[rstest]
    #[case(1.0, 7, 5000.0 + 5000.0 * 0.3 * 1.5)]
    #[case(0.0, 0, 50.0 - 50.0 * 0.3 * 0.5)]
    fn people_per_hour_scales_baseline(
        #[case] score: f64,
        #[case] category: usize,
        #[case] expected: f64,
    ) {
        let value = estimate_people_per_hour(score, category, 8);
        assert!((value - expected).abs() < 1e-9);
    }

    #[rstest]
    fn fill_rate_is_capped() {
        assert!((estimate_bin_fill_rate(100.0) - 100.0).abs() < 1e-9);
        assert_eq!(estimate_bin_fill_rate(10_000.0), 200.0);
    }
}
