//! Shared test harness modules for the footfall CLI.

use super::*;

mod analyse_steps;
mod helpers;
mod sample_steps;
mod sample_unit;
