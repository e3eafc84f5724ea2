//! Category-balanced, spatially-dispersed sensor placement.
//!
//! Targets per footfall band grow with the square root of the band's bin
//! count, so busy bands get more sensors without drowning out quiet ones.
//! Every non-empty band keeps a floor of up to [`CATEGORY_FLOOR`] sensors.
//! Within a band a [`SpatialSampler`] spreads the picks out.

mod sampler;

pub use sampler::{DispersionSampler, SpatialSampler, StrideSampler};

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::bins::BinRecord;
use crate::config::{AnalysisConfig, PlacementStrategy};

/// Minimum sensors per band, capped by the band's bin count.
pub const CATEGORY_FLOOR: usize = 20;

/// Inputs to [`select_sensors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRequest {
    /// Number of sensors to place.
    pub sensor_count: usize,
    /// Number of footfall bands `K`.
    pub category_count: usize,
    /// Within-band sampling strategy.
    pub strategy: PlacementStrategy,
}

impl From<&AnalysisConfig> for PlacementRequest {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            sensor_count: config.sensor_count,
            category_count: config.category_count,
            strategy: config.placement,
        }
    }
}

/// Allocation for one footfall band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTarget {
    /// Band index.
    pub category: usize,
    /// Assigned bins in the band.
    pub available: usize,
    /// Sensors allocated to the band.
    pub target: usize,
}

/// Outcome of [`select_sensors`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementReport {
    /// Sensors selected.
    pub selected: usize,
    /// Assigned bins considered.
    pub candidates: usize,
    /// Whether every assigned bin was selected without balancing.
    pub short_circuited: bool,
    /// Per-band allocation; empty after a short-circuit.
    pub targets: Vec<CategoryTarget>,
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "square-root proportional share is rounded to a whole sensor count"
)]
fn proportional_share(sensor_count: usize, count: usize, sqrt_total: f64) -> usize {
    if count == 0 || sqrt_total <= 0.0 {
        return 0;
    }
    (sensor_count as f64 * (count as f64).sqrt() / sqrt_total).round() as usize
}

/// Split `sensor_count` across bands holding `counts` bins.
///
/// Shares are `round(n * sqrt(count) / Σ sqrt(count))`, raised to
/// `min(20, count)`, capped at `count`, then reconciled one sensor at a time:
/// the smallest target with spare bins grows while the total is short, and
/// the largest target above its floor shrinks while the total is over (the
/// largest target overall once every band sits on its floor). Ties go to the
/// lowest band. The result sums to `min(sensor_count, Σ count)`.
///
/// # Examples
/// ```
/// use footfall_core::allocate_targets;
///
/// assert_eq!(allocate_targets(&[4, 100, 4], 30), vec![4, 22, 4]);
/// ```
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "square roots of bin counts")]
pub fn allocate_targets(counts: &[usize], sensor_count: usize) -> Vec<usize> {
    let sqrt_total: f64 = counts.iter().map(|&count| (count as f64).sqrt()).sum();
    let floors: Vec<usize> = counts.iter().map(|&count| count.min(CATEGORY_FLOOR)).collect();
    let mut targets: Vec<usize> = counts
        .iter()
        .zip(&floors)
        .map(|(&count, &floor)| {
            proportional_share(sensor_count, count, sqrt_total)
                .max(floor)
                .min(count)
        })
        .collect();

    let goal = sensor_count.min(counts.iter().sum());
    let mut total: usize = targets.iter().sum();

    while total < goal {
        let grow = targets
            .iter()
            .zip(counts)
            .enumerate()
            .filter(|(_, (target, count))| target < count)
            .min_by_key(|&(index, (target, _))| (*target, index))
            .map(|(index, _)| index);
        let Some(slot) = grow.and_then(|index| targets.get_mut(index)) else {
            break;
        };
        *slot += 1;
        total += 1;
    }

    while total > goal {
        let above_floor = largest_index(
            targets
                .iter()
                .zip(&floors)
                .enumerate()
                .filter(|(_, (target, floor))| target > floor)
                .map(|(index, (target, _))| (index, *target)),
        );
        let shrink = above_floor.or_else(|| {
            largest_index(
                targets
                    .iter()
                    .copied()
                    .enumerate()
                    .filter(|&(_, target)| target > 0),
            )
        });
        let Some(slot) = shrink.and_then(|index| targets.get_mut(index)) else {
            break;
        };
        *slot -= 1;
        total -= 1;
    }
    targets
}

/// Index of the largest value, lowest index on ties.
fn largest_index(values: impl Iterator<Item = (usize, usize)>) -> Option<usize> {
    values
        .fold(None, |best: Option<(usize, usize)>, (index, value)| match best {
            Some((_, current)) if current >= value => best,
            _ => Some((index, value)),
        })
        .map(|(index, _)| index)
}

fn sampler_for(strategy: PlacementStrategy, candidates: usize) -> &'static dyn SpatialSampler {
    match strategy {
        PlacementStrategy::Dispersion => &DispersionSampler,
        PlacementStrategy::Stride => &StrideSampler,
        PlacementStrategy::Auto { dispersion_limit } if candidates <= dispersion_limit => {
            &DispersionSampler
        }
        PlacementStrategy::Auto { .. } => &StrideSampler,
    }
}

/// Choose sensor locations among assigned bins and rank them from one.
///
/// Previous selections are cleared first. When there are no more assigned
/// bins than sensors, all of them are selected in input order. Otherwise
/// each band receives its [`allocate_targets`] share, sampled spatially,
/// and ranks run by ascending band then selection order.
pub fn select_sensors(bins: &mut [BinRecord], request: &PlacementRequest) -> PlacementReport {
    for bin in bins.iter_mut() {
        bin.selection = None;
    }
    let assigned: Vec<(usize, usize)> = bins
        .iter()
        .enumerate()
        .filter_map(|(index, bin)| bin.category().map(|category| (index, category)))
        .collect();

    if assigned.len() <= request.sensor_count {
        for (rank, &(index, _)) in assigned.iter().enumerate() {
            if let Some(bin) = bins.get_mut(index) {
                bin.selection = Some(rank + 1);
            }
        }
        log::warn!(
            "{} assigned bins do not exceed the {} sensor target; selecting all of them",
            assigned.len(),
            request.sensor_count
        );
        return PlacementReport {
            selected: assigned.len(),
            candidates: assigned.len(),
            short_circuited: true,
            targets: Vec::new(),
        };
    }

    let band_count = assigned
        .iter()
        .map(|&(_, category)| category + 1)
        .max()
        .unwrap_or(0)
        .max(request.category_count);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); band_count];
    for &(index, category) in &assigned {
        if let Some(list) = members.get_mut(category) {
            list.push(index);
        }
    }
    let counts: Vec<usize> = members.iter().map(Vec::len).collect();
    let targets = allocate_targets(&counts, request.sensor_count);
    log::debug!("sensor targets per band: {targets:?}");

    let mut rank = 0;
    for (list, &target) in members.iter().zip(&targets) {
        let positions: Vec<Coord<f64>> = list
            .iter()
            .filter_map(|&index| bins.get(index).map(|bin| bin.location))
            .collect();
        let sampler = sampler_for(request.strategy, positions.len());
        for local in sampler.sample(&positions, target) {
            if let Some(bin) = list.get(local).and_then(|&index| bins.get_mut(index)) {
                rank += 1;
                bin.selection = Some(rank);
            }
        }
    }
    log::info!(
        "selected {rank} sensors from {} assigned bins across {band_count} bands",
        assigned.len()
    );

    PlacementReport {
        selected: rank,
        candidates: assigned.len(),
        short_circuited: false,
        targets: counts
            .iter()
            .zip(&targets)
            .enumerate()
            .map(|(category, (&available, &target))| CategoryTarget {
                category,
                available,
                target,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests;
