//! Unit coverage for sensor placement.

use super::*;
use crate::bins::CellAssignment;
use crate::grid::CellId;
use rstest::{fixture, rstest};

fn assigned_bin(index: usize, category: usize, x: f64, y: f64) -> BinRecord {
    let mut bin = BinRecord::new(format!("BIN{index:05}"), Coord { x, y });
    bin.assignment = Some(CellAssignment {
        cell_id: CellId::new(0),
        distance: 0.0,
        category,
        category_label: String::new(),
        footfall_score: 0.0,
        people_per_hour: 0.0,
        bin_fill_rate: 0.0,
        ward: None,
        road: None,
    });
    bin
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "bins are laid out along one row per band"
)]
fn banded_bins(counts: &[usize]) -> Vec<BinRecord> {
    let mut bins = Vec::new();
    for (category, &count) in counts.iter().enumerate() {
        for offset in 0..count {
            let index = bins.len();
            bins.push(assigned_bin(
                index,
                category,
                offset as f64 * 0.001,
                category as f64,
            ));
        }
    }
    bins
}

#[fixture]
fn request() -> PlacementRequest {
    PlacementRequest {
        sensor_count: 30,
        category_count: 3,
        strategy: PlacementStrategy::default(),
    }
}

#[rstest]
#[case(&[4, 100, 4], 30, &[4, 22, 4])]
#[case(&[100, 100], 10, &[5, 5])]
#[case(&[0, 50, 0], 10, &[0, 10, 0])]
#[case(&[30, 30, 30], 0, &[0, 0, 0])]
#[case(&[25, 25, 25, 25], 40, &[10, 10, 10, 10])]
fn allocation_matches_expected(
    #[case] counts: &[usize],
    #[case] sensors: usize,
    #[case] expected: &[usize],
) {
    assert_eq!(allocate_targets(counts, sensors), expected);
}

#[rstest]
fn allocation_sums_to_requested_total() {
    let counts = [3, 500, 40, 1, 1200, 75, 9, 260];
    let targets = allocate_targets(&counts, 1_000);
    assert_eq!(targets.iter().sum::<usize>(), 1_000);
    for (target, count) in targets.iter().zip(counts) {
        assert!(*target <= count);
        assert!(*target >= count.min(CATEGORY_FLOOR));
    }
}

#[rstest]
fn short_circuit_selects_every_assigned_bin_in_order(request: PlacementRequest) {
    let mut bins = banded_bins(&[2, 3]);
    bins.push(BinRecord::new("loose", Coord { x: 5.0, y: 5.0 }));
    let report = select_sensors(&mut bins, &request);

    assert!(report.short_circuited);
    assert_eq!(report.selected, 5);
    let ranks: Vec<Option<usize>> = bins.iter().map(BinRecord::selection_rank).collect();
    assert_eq!(
        ranks,
        vec![Some(1), Some(2), Some(3), Some(4), Some(5), None]
    );
}

#[rstest]
fn balanced_selection_honours_targets_and_dense_ranks(request: PlacementRequest) {
    let mut bins = banded_bins(&[4, 100, 4]);
    let report = select_sensors(&mut bins, &request);

    assert!(!report.short_circuited);
    assert_eq!(report.selected, 30);
    let targets: Vec<usize> = report.targets.iter().map(|t| t.target).collect();
    assert_eq!(targets, vec![4, 22, 4]);

    let mut ranked: Vec<(usize, usize)> = bins
        .iter()
        .filter_map(|bin| bin.selection_rank().zip(bin.category()))
        .collect();
    ranked.sort_unstable();
    let ranks: Vec<usize> = ranked.iter().map(|(rank, _)| *rank).collect();
    assert_eq!(ranks, (1..=30).collect::<Vec<_>>());
    let categories: Vec<usize> = ranked.iter().map(|(_, category)| *category).collect();
    assert!(categories.windows(2).all(|pair| pair.first() <= pair.last()));
}

#[rstest]
fn zero_sensors_selects_nothing(mut request: PlacementRequest) {
    request.sensor_count = 0;
    let mut bins = banded_bins(&[5, 5]);
    let report = select_sensors(&mut bins, &request);
    assert_eq!(report.selected, 0);
    assert!(bins.iter().all(|bin| !bin.is_selected()));
}

#[rstest]
#[case(PlacementStrategy::Dispersion)]
#[case(PlacementStrategy::Stride)]
#[case(PlacementStrategy::Auto { dispersion_limit: 10 })]
fn every_strategy_fills_its_targets(mut request: PlacementRequest, #[case] strategy: PlacementStrategy) {
    request.strategy = strategy;
    let mut bins = banded_bins(&[40, 40, 40]);
    let report = select_sensors(&mut bins, &request);
    assert_eq!(report.selected, 30);
    assert_eq!(bins.iter().filter(|bin| bin.is_selected()).count(), 30);
}

fn ranks_with(strategy: PlacementStrategy, counts: &[usize]) -> Vec<Option<usize>> {
    let mut bins = banded_bins(counts);
    let request = PlacementRequest {
        sensor_count: 4,
        category_count: 1,
        strategy,
    };
    select_sensors(&mut bins, &request);
    bins.iter().map(BinRecord::selection_rank).collect()
}

#[rstest]
#[case::at_the_limit(40, PlacementStrategy::Dispersion, PlacementStrategy::Stride)]
#[case::above_the_limit(41, PlacementStrategy::Stride, PlacementStrategy::Dispersion)]
fn auto_switches_sampler_at_dispersion_limit(
    #[case] candidates: usize,
    #[case] expected: PlacementStrategy,
    #[case] other: PlacementStrategy,
) {
    let counts = [candidates];
    let auto = ranks_with(PlacementStrategy::Auto { dispersion_limit: 40 }, &counts);
    assert_eq!(auto, ranks_with(expected, &counts));
    assert_ne!(auto, ranks_with(other, &counts));
}

#[rstest]
fn rerunning_replaces_previous_selection(request: PlacementRequest) {
    let mut bins = banded_bins(&[40, 40, 40]);
    select_sensors(&mut bins, &request);
    let report = select_sensors(&mut bins, &request);
    assert_eq!(bins.iter().filter(|bin| bin.is_selected()).count(), report.selected);
}
