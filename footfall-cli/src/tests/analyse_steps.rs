//! Behaviour-driven step definitions driving the analyse CLI scenarios.

use super::helpers::CommandWorld;
use super::*;
use footfall_core::ConfigError;
use footfall_data::{GRID_CSV, GRID_GEOJSON, SENSORS_CSV, SENSORS_GEOJSON, SUMMARY_JSON};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[fixture]
fn world() -> CommandWorld {
    let world = CommandWorld::new();
    let output = world.root.join("out");
    world.push_flag(ARG_OUTPUT_DIR, Some(output.as_str()));
    world
}

#[given("the sample bin inventory is requested")]
fn sample_inventory_requested(#[from(world)] world: &CommandWorld) {
    world.push_flag(ARG_SAMPLE_BINS, None);
}

#[given("a request for 40 sensors at resolution 0.002")]
fn forty_sensors(#[from(world)] world: &CommandWorld) {
    world.push_flag(ARG_SENSORS, Some("40"));
    world.push_flag(ARG_RESOLUTION, Some("0.002"));
}

#[given("a bins path that does not exist")]
fn missing_bins_path(#[from(world)] world: &CommandWorld) {
    let missing = world.root.join("missing.csv");
    world.push_flag(ARG_BINS, Some(missing.as_str()));
}

#[given("the placement strategy \"random\"")]
fn random_placement(#[from(world)] world: &CommandWorld) {
    world.push_flag(ARG_PLACEMENT, Some("random"));
}

#[when("I run the analyse command")]
fn run_analyse_command(#[from(world)] world: &CommandWorld) {
    world.run("analyse");
}

#[then("the command succeeds and prints statistics for 40 sensors")]
fn succeeds_with_statistics(#[from(world)] world: &CommandWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let stats: serde_json::Value =
        serde_json::from_str(&world.stdout_text()).expect("stdout should be JSON statistics");
    assert_eq!(
        stats.get("selected_bins").and_then(serde_json::Value::as_u64),
        Some(40)
    );
    assert_eq!(
        stats.get("transit_count").and_then(serde_json::Value::as_u64),
        Some(31)
    );
}

#[then("every artefact is written to the output directory")]
fn artefacts_written(#[from(world)] world: &CommandWorld) {
    let output = world.root.join("out");
    for name in [
        GRID_CSV,
        GRID_GEOJSON,
        SENSORS_CSV,
        SENSORS_GEOJSON,
        SUMMARY_JSON,
    ] {
        let path = output.join(name);
        assert!(path.is_file(), "{path} should exist");
    }
}

#[then("the command fails because the bins file is missing")]
fn fails_missing_bins(#[from(world)] world: &CommandWorld) {
    world.with_error(|error| match error {
        CliError::MissingSourceFile { field, .. } => assert_eq!(*field, ARG_BINS),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    });
}

#[then("the command fails because the settings are invalid")]
fn fails_invalid_settings(#[from(world)] world: &CommandWorld) {
    world.with_error(|error| match error {
        CliError::InvalidSettings(ConfigError::UnknownPlacement { name }) => {
            assert_eq!(name, "random");
        }
        other => panic!("expected InvalidSettings, found {other:?}"),
    });
}

#[then("the command fails during argument parsing")]
fn fails_argument_parsing(#[from(world)] world: &CommandWorld) {
    world.with_error(|error| match error {
        CliError::ArgumentParsing(_) => {}
        other => panic!("expected ArgumentParsing, found {other:?}"),
    });
}

macro_rules! register_analyse_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/analyse_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_analyse_scenario!(
    analyse_sample_bins,
    "analysing sample bins writes artefacts and prints statistics"
);
register_analyse_scenario!(analyse_missing_bins, "rejecting a missing bins file");
register_analyse_scenario!(
    analyse_unknown_placement,
    "rejecting an unknown placement strategy"
);
register_analyse_scenario!(analyse_conflicting_sources, "rejecting combined bin sources");
