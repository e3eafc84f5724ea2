//! Behaviour-driven step definitions driving the sample-bins CLI scenarios.

use super::helpers::CommandWorld;
use super::*;
use footfall_data::read_bins_csv;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[fixture]
fn world() -> CommandWorld {
    CommandWorld::new()
}

#[given("an output path for 25 sample bins")]
fn output_for_twenty_five(#[from(world)] world: &CommandWorld) {
    let output = world.root.join("bins.csv");
    world.push_flag(ARG_OUTPUT, Some(output.as_str()));
    world.push_flag(ARG_COUNT, Some("25"));
}

#[when("I run the sample-bins command")]
fn run_sample_command(#[from(world)] world: &CommandWorld) {
    world.run("sample-bins");
}

#[then("the inventory holds 25 bins")]
fn inventory_holds_bins(#[from(world)] world: &CommandWorld) {
    let bins = read_bins_csv(&world.root.join("bins.csv")).expect("inventory readable");
    assert_eq!(bins.len(), 25);
}

#[then("the command reports where the bins were written")]
fn reports_destination(#[from(world)] world: &CommandWorld) {
    let stdout = world.stdout_text();
    assert!(stdout.contains(world.root.join("bins.csv").as_str()));
}

#[then("the command fails because the output path is missing")]
fn fails_missing_output(#[from(world)] world: &CommandWorld) {
    world.with_error(|error| match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_OUTPUT);
            assert_eq!(*env, ENV_SAMPLE_OUTPUT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    });
}

macro_rules! register_sample_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/sample_bins_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: CommandWorld) {
            let _ = world;
        }
    };
}

register_sample_scenario!(sample_writes_inventory, "writing a sample inventory");
register_sample_scenario!(sample_missing_output, "rejecting a missing output path");
