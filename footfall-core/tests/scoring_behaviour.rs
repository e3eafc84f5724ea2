#![expect(
    clippy::expect_used,
    clippy::float_arithmetic,
    reason = "tests fail fast on setup and compare float scores"
)]

//! Behavioural coverage for grid scoring and banding.

use std::cell::RefCell;

use footfall_core::{
    AnalysisConfig, AnalysisInputs, AnalysisOutcome, BoundingBox, PipelineStage, PoiCatalog,
    Region, TransitStation, run_analysis,
};
use geo::{Coord, Rect};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[fixture]
fn config() -> RefCell<AnalysisConfig> {
    RefCell::new(AnalysisConfig::default())
}

#[fixture]
fn region() -> RefCell<Option<Region>> {
    RefCell::new(None)
}

#[fixture]
fn catalog() -> RefCell<PoiCatalog> {
    RefCell::new(PoiCatalog::default())
}

#[fixture]
fn outcome() -> RefCell<Option<AnalysisOutcome>> {
    RefCell::new(None)
}

fn with_outcome<T>(
    outcome: &RefCell<Option<AnalysisOutcome>>,
    check: impl FnOnce(&AnalysisOutcome) -> T,
) -> T {
    check(outcome.borrow().as_ref().expect("analysis ran"))
}

#[given("the reference bounding box at resolution 0.001")]
fn given_reference_box(
    #[from(config)] config: &RefCell<AnalysisConfig>,
    #[from(region)] region: &RefCell<Option<Region>>,
) {
    let reference = AnalysisConfig::default().with_resolution(0.001);
    *region.borrow_mut() = Some(Region::from_rect("reference box", reference.bounds.to_rect()));
    *config.borrow_mut() = reference;
}

#[given("a small grid at resolution 0.005")]
fn given_small_grid(
    #[from(config)] config: &RefCell<AnalysisConfig>,
    #[from(region)] region: &RefCell<Option<Region>>,
) {
    let bounds = BoundingBox::new(0.0, 0.02, 0.0, 0.02);
    *config.borrow_mut() = AnalysisConfig::default()
        .with_bounds(bounds)
        .with_resolution(0.005);
    *region.borrow_mut() = Some(Region::from_rect(
        "small grid",
        Rect::new(Coord { x: -0.005, y: -0.005 }, Coord { x: 0.025, y: 0.025 }),
    ));
}

#[given("no points of interest")]
fn given_no_pois(#[from(catalog)] catalog: &RefCell<PoiCatalog>) {
    *catalog.borrow_mut() = PoiCatalog::default();
}

#[given("a transit station with usage 100 at the centre of cell 0")]
fn given_station_at_origin(#[from(catalog)] catalog: &RefCell<PoiCatalog>) {
    let station =
        TransitStation::new("Origin", Coord { x: 0.0, y: 0.0 }, 100.0).expect("valid station");
    catalog.borrow_mut().transit = vec![station];
}

#[when("the analysis runs")]
fn when_analysis_runs(
    #[from(config)] config: &RefCell<AnalysisConfig>,
    #[from(region)] region: &RefCell<Option<Region>>,
    #[from(catalog)] catalog: &RefCell<PoiCatalog>,
    #[from(outcome)] outcome: &RefCell<Option<AnalysisOutcome>>,
) {
    let inputs = AnalysisInputs {
        config: config.borrow().clone(),
        region: region.borrow().clone().expect("region chosen"),
        catalog: catalog.borrow().clone(),
        bins: Vec::new(),
    };
    let result = run_analysis(inputs, &mut |_: PipelineStage| {}).expect("analysis succeeds");
    *outcome.borrow_mut() = Some(result);
}

#[then("every raw and composite score is zero")]
fn then_scores_zero(#[from(outcome)] outcome: &RefCell<Option<AnalysisOutcome>>) {
    with_outcome(outcome, |result| {
        assert!(!result.cells.is_empty(), "expected cells in the reference box");
        for cell in &result.cells {
            assert_eq!(cell.transit_score, 0.0);
            assert_eq!(cell.bus_score, 0.0);
            assert_eq!(cell.venue_score, 0.0);
            assert_eq!(cell.footfall_score, 0.0);
        }
    });
}

#[then("cells are banded in id order")]
fn then_banded_by_id(#[from(outcome)] outcome: &RefCell<Option<AnalysisOutcome>>) {
    with_outcome(outcome, |result| {
        let categories: Vec<usize> = result.cells.iter().map(|cell| cell.category).collect();
        assert!(
            categories.windows(2).all(|pair| pair.first() <= pair.last()),
            "tied cells must be banded by id"
        );
        let counts = &result.category_counts;
        assert_eq!(counts.len(), result.config.category_count);
        let smallest = counts.iter().min().copied().unwrap_or_default();
        let largest = counts.iter().max().copied().unwrap_or_default();
        assert!(smallest > 0, "every band should hold cells");
        assert!(largest - smallest <= 1, "bands differ by rounding only");
    });
}

#[then("the transit score of cell 0 follows the quadratic decay at the distance floor")]
fn then_floor_decay(#[from(outcome)] outcome: &RefCell<Option<AnalysisOutcome>>) {
    with_outcome(outcome, |result| {
        let radius = result.config.influence.transit.radius;
        let floor = result.config.distance_floor;
        let expected = 100.0 * (1.0 - floor / radius).powi(2);
        let first = result.cells.first().expect("cell 0 exists");
        assert_eq!(first.center, Coord { x: 0.0, y: 0.0 });
        assert!((first.transit_score - expected).abs() < 1e-9);
    });
}

#[then("the transit score of the neighbouring cell is zero")]
fn then_radius_excluded(#[from(outcome)] outcome: &RefCell<Option<AnalysisOutcome>>) {
    with_outcome(outcome, |result| {
        let neighbour = result.cells.get(1).expect("cell 1 exists");
        assert_eq!(neighbour.center, Coord { x: 0.005, y: 0.0 });
        assert_eq!(neighbour.transit_score, 0.0);
    });
}

#[scenario(path = "tests/features/scoring.feature", index = 0)]
fn scenario_zero_features_tie_break(
    config: RefCell<AnalysisConfig>,
    region: RefCell<Option<Region>>,
    catalog: RefCell<PoiCatalog>,
    outcome: RefCell<Option<AnalysisOutcome>>,
) {
    let _ = (config, region, catalog, outcome);
}

#[scenario(path = "tests/features/scoring.feature", index = 1)]
fn scenario_station_at_cell_centre(
    config: RefCell<AnalysisConfig>,
    region: RefCell<Option<Region>>,
    catalog: RefCell<PoiCatalog>,
    outcome: RefCell<Option<AnalysisOutcome>>,
) {
    let _ = (config, region, catalog, outcome);
}
