#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for category-balanced sensor placement.

mod support;

use std::cell::RefCell;

use footfall_core::{
    BinRecord, PlacementReport, PlacementRequest, PlacementStrategy, select_sensors,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use support::banded_bins;

#[fixture]
fn bins() -> RefCell<Vec<BinRecord>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn request() -> RefCell<PlacementRequest> {
    RefCell::new(PlacementRequest {
        sensor_count: 0,
        category_count: 3,
        strategy: PlacementStrategy::default(),
    })
}

#[fixture]
fn report() -> RefCell<Option<PlacementReport>> {
    RefCell::new(None)
}

fn sorted_ranks(bins: &[BinRecord]) -> Vec<usize> {
    let mut ranks: Vec<usize> = bins.iter().filter_map(BinRecord::selection_rank).collect();
    ranks.sort_unstable();
    ranks
}

#[given("50 assigned bins in 3 bands")]
fn given_fifty_bins(#[from(bins)] bins: &RefCell<Vec<BinRecord>>) {
    *bins.borrow_mut() = banded_bins(&[20, 20, 10]);
}

#[given("assigned bins with band counts 4, 100 and 4")]
fn given_uneven_bands(#[from(bins)] bins: &RefCell<Vec<BinRecord>>) {
    *bins.borrow_mut() = banded_bins(&[4, 100, 4]);
}

#[given("a request for 1000 sensors")]
fn given_thousand_sensors(#[from(request)] request: &RefCell<PlacementRequest>) {
    request.borrow_mut().sensor_count = 1_000;
}

#[given("a request for 30 sensors")]
fn given_thirty_sensors(#[from(request)] request: &RefCell<PlacementRequest>) {
    request.borrow_mut().sensor_count = 30;
}

#[when("sensors are selected")]
fn when_selected(
    #[from(bins)] bins: &RefCell<Vec<BinRecord>>,
    #[from(request)] request: &RefCell<PlacementRequest>,
    #[from(report)] report: &RefCell<Option<PlacementReport>>,
) {
    let outcome = select_sensors(&mut bins.borrow_mut(), &request.borrow());
    *report.borrow_mut() = Some(outcome);
}

#[then("all 50 bins are selected with ranks 1 to 50")]
fn then_all_selected(
    #[from(bins)] bins: &RefCell<Vec<BinRecord>>,
    #[from(report)] report: &RefCell<Option<PlacementReport>>,
) {
    let ranks: Vec<Option<usize>> = bins.borrow().iter().map(BinRecord::selection_rank).collect();
    let expected: Vec<Option<usize>> = (1..=50).map(Some).collect();
    assert_eq!(ranks, expected, "ranks follow input order");
    let guard = report.borrow();
    let placed = guard.as_ref().expect("selection ran");
    assert!(placed.short_circuited);
    assert_eq!(placed.selected, 50);
}

#[then("no band targets are reported")]
fn then_no_targets(#[from(report)] report: &RefCell<Option<PlacementReport>>) {
    assert!(report.borrow().as_ref().expect("selection ran").targets.is_empty());
}

#[then("the band targets are 4, 22 and 4")]
fn then_floor_targets(#[from(report)] report: &RefCell<Option<PlacementReport>>) {
    let guard = report.borrow();
    let placed = guard.as_ref().expect("selection ran");
    assert!(!placed.short_circuited);
    let targets: Vec<usize> = placed.targets.iter().map(|t| t.target).collect();
    assert_eq!(targets, vec![4, 22, 4]);
}

#[then("30 bins are selected with contiguous ranks")]
fn then_contiguous(#[from(bins)] bins: &RefCell<Vec<BinRecord>>) {
    let expected: Vec<usize> = (1..=30).collect();
    assert_eq!(sorted_ranks(&bins.borrow()), expected);
}

#[scenario(path = "tests/features/placement.feature", index = 0)]
fn scenario_short_circuit(
    bins: RefCell<Vec<BinRecord>>,
    request: RefCell<PlacementRequest>,
    report: RefCell<Option<PlacementReport>>,
) {
    let _ = (bins, request, report);
}

#[scenario(path = "tests/features/placement.feature", index = 1)]
fn scenario_floor_and_reconciliation(
    bins: RefCell<Vec<BinRecord>>,
    request: RefCell<PlacementRequest>,
    report: RefCell<Option<PlacementReport>>,
) {
    let _ = (bins, request, report);
}
