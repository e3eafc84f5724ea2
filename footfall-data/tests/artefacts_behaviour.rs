#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for bin inventories and exported artefacts.

use std::cell::RefCell;
use std::fs;

use camino::Utf8PathBuf;
use footfall_core::{
    AnalysisConfig, AnalysisInputs, AnalysisOutcome, BinRecord, PipelineStage, PoiCatalog, Region,
    run_analysis,
};
use footfall_data::{
    DataFormatError, ExportedFiles, SAMPLE_SEED, export_outcome, generate_sample_bins,
    read_bins_csv, reference_catalog, write_bins_csv,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// Temporary directory kept alive for the whole scenario.
struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    Workspace { _dir: dir, root }
}

#[fixture]
fn bins() -> RefCell<Vec<BinRecord>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn catalog() -> RefCell<PoiCatalog> {
    RefCell::new(PoiCatalog::default())
}

#[fixture]
fn loaded() -> RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>> {
    RefCell::new(None)
}

#[fixture]
fn exported() -> RefCell<Option<(AnalysisOutcome, ExportedFiles)>> {
    RefCell::new(None)
}

#[given("120 sample bins")]
fn given_small_sample(#[from(bins)] bins: &RefCell<Vec<BinRecord>>) {
    *bins.borrow_mut() = generate_sample_bins(120, SAMPLE_SEED);
}

#[given("300 sample bins")]
fn given_large_sample(#[from(bins)] bins: &RefCell<Vec<BinRecord>>) {
    *bins.borrow_mut() = generate_sample_bins(300, SAMPLE_SEED);
}

#[given("the reference catalogue")]
fn given_reference_catalog(#[from(catalog)] catalog: &RefCell<PoiCatalog>) {
    *catalog.borrow_mut() =
        reference_catalog(&AnalysisConfig::default()).expect("reference catalogue");
}

#[given("a bin CSV whose second record has longitude \"west\"")]
fn given_malformed_csv(#[from(workspace)] workspace: &Workspace) {
    let text = "bin_id,lat,lon\nA,51.51,-0.14\nB,51.52,west\n";
    fs::write(workspace.root.join("bins.csv"), text).expect("write fixture");
}

#[when("the bins are written to CSV and read back")]
fn when_round_trip(
    #[from(workspace)] workspace: &Workspace,
    #[from(bins)] bins: &RefCell<Vec<BinRecord>>,
    #[from(loaded)] loaded: &RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
) {
    let path = workspace.root.join("inventory/bins.csv");
    write_bins_csv(&path, &bins.borrow()).expect("write bins");
    *loaded.borrow_mut() = Some(read_bins_csv(&path));
}

#[when("the bins are read")]
fn when_read(
    #[from(workspace)] workspace: &Workspace,
    #[from(loaded)] loaded: &RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
) {
    *loaded.borrow_mut() = Some(read_bins_csv(&workspace.root.join("bins.csv")));
}

#[when("an analysis for 50 sensors is exported")]
fn when_exported(
    #[from(workspace)] workspace: &Workspace,
    #[from(bins)] bins: &RefCell<Vec<BinRecord>>,
    #[from(catalog)] catalog: &RefCell<PoiCatalog>,
    #[from(exported)] exported: &RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let inputs = AnalysisInputs {
        config: AnalysisConfig::default()
            .with_resolution(0.002)
            .with_sensor_count(50),
        region: Region::westminster(),
        catalog: catalog.borrow().clone(),
        bins: bins.borrow().clone(),
    };
    let outcome = run_analysis(inputs, &mut |_: PipelineStage| {}).expect("analysis succeeds");
    let files = export_outcome(&workspace.root.join("output"), &outcome).expect("export");
    *exported.borrow_mut() = Some((outcome, files));
}

#[then("the bins read back match the originals")]
fn then_round_trip_matches(
    #[from(bins)] bins: &RefCell<Vec<BinRecord>>,
    #[from(loaded)] loaded: &RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
) {
    let guard = loaded.borrow();
    let read = guard
        .as_ref()
        .expect("read attempted")
        .as_ref()
        .expect("read succeeds");
    assert_eq!(read, &*bins.borrow());
}

#[then("every artefact exists")]
fn then_artefacts_exist(
    #[from(exported)] exported: &RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let guard = exported.borrow();
    let (_, files) = guard.as_ref().expect("export ran");
    for path in [
        &files.grid_csv,
        &files.grid_geojson,
        &files.sensors_csv,
        &files.sensors_geojson,
        &files.summary_json,
    ] {
        assert!(path.is_file(), "{path} should exist");
    }
}

#[then("the sensor CSV lists every selected bin in rank order")]
fn then_sensor_rows(
    #[from(exported)] exported: &RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let guard = exported.borrow();
    let (outcome, files) = guard.as_ref().expect("export ran");
    let mut reader = csv::Reader::from_path(files.sensors_csv.as_std_path()).expect("open CSV");
    let ranks: Vec<usize> = reader
        .records()
        .map(|row| {
            row.expect("row")
                .get(0)
                .expect("rank column")
                .parse()
                .expect("numeric rank")
        })
        .collect();
    let expected: Vec<usize> = (1..=outcome.placement.selected).collect();
    assert_eq!(ranks, expected);
    assert!(outcome.placement.selected > 0, "sample should place sensors");
}

#[then("the summary JSON reports the same selection count")]
fn then_summary_counts(
    #[from(exported)] exported: &RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let guard = exported.borrow();
    let (outcome, files) = guard.as_ref().expect("export ran");
    let text = fs::read_to_string(&files.summary_json).expect("read summary");
    let report: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
    let selected = report
        .pointer("/stats/selected_bins")
        .and_then(serde_json::Value::as_u64)
        .expect("selected count");
    assert_eq!(
        usize::try_from(selected).expect("small count"),
        outcome.placement.selected
    );
}

#[then("reading fails with an invalid lon value in record 1")]
fn then_invalid_lon(
    #[from(loaded)] loaded: &RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
) {
    let guard = loaded.borrow();
    let result = guard.as_ref().expect("read attempted");
    assert!(matches!(
        result,
        Err(DataFormatError::InvalidNumber {
            column: "lon",
            record: 1,
            ..
        })
    ));
}

#[scenario(path = "tests/features/artefacts.feature", index = 0)]
fn scenario_csv_round_trip(
    workspace: Workspace,
    bins: RefCell<Vec<BinRecord>>,
    catalog: RefCell<PoiCatalog>,
    loaded: RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
    exported: RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let _ = (workspace, bins, catalog, loaded, exported);
}

#[scenario(path = "tests/features/artefacts.feature", index = 1)]
fn scenario_exports_artefacts(
    workspace: Workspace,
    bins: RefCell<Vec<BinRecord>>,
    catalog: RefCell<PoiCatalog>,
    loaded: RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
    exported: RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let _ = (workspace, bins, catalog, loaded, exported);
}

#[scenario(path = "tests/features/artefacts.feature", index = 2)]
fn scenario_malformed_longitude(
    workspace: Workspace,
    bins: RefCell<Vec<BinRecord>>,
    catalog: RefCell<PoiCatalog>,
    loaded: RefCell<Option<Result<Vec<BinRecord>, DataFormatError>>>,
    exported: RefCell<Option<(AnalysisOutcome, ExportedFiles)>>,
) {
    let _ = (workspace, bins, catalog, loaded, exported);
}
