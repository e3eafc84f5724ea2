//! Synthetic bin inventories for demos and tests.

use footfall_core::{AnalysisConfig, BinRecord};
use geo::Coord;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;

/// Seed used when no other is requested.
pub const SAMPLE_SEED: u64 = 44;

/// Bin count used when no other is requested.
pub const DEFAULT_SAMPLE_COUNT: usize = 3_000;

const CLUSTER_SPREAD: f64 = 0.003;

/// Oxford Circus, Victoria and Covent Garden.
const CLUSTER_CENTRES: [Coord<f64>; 3] = [
    Coord { x: -0.1418, y: 51.5154 },
    Coord { x: -0.1447, y: 51.4965 },
    Coord { x: -0.1240, y: 51.5117 },
];

const BIN_TYPES: [&str; 3] = ["General Waste", "Recycling", "Food Waste"];
const CAPACITIES: [u32; 4] = [120, 240, 360, 1_100];

/// Generate `count` bins over the reference study box.
///
/// The first third are clustered around busy interchanges with a Gaussian
/// spread of 0.003 degrees; the rest are uniform over the box. Ids run from
/// `BIN00000`. The same `seed` always yields the same bins.
///
/// # Examples
/// ```
/// use footfall_data::generate_sample_bins;
///
/// let bins = generate_sample_bins(30, 44);
/// assert_eq!(bins.len(), 30);
/// assert_eq!(bins[0].id, "BIN00000");
/// ```
#[must_use]
pub fn generate_sample_bins(count: usize, seed: u64) -> Vec<BinRecord> {
    let bounds = AnalysisConfig::default().bounds;
    let clustered = count.div_euclid(3);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|index| {
            let uniform = Coord {
                x: rng.gen_range(bounds.min_lon..bounds.max_lon),
                y: rng.gen_range(bounds.min_lat..bounds.max_lat),
            };
            let location = if index < clustered {
                clustered_location(&mut rng)
            } else {
                uniform
            };
            let bin_type = BIN_TYPES.choose(&mut rng).copied().unwrap_or("General Waste");
            let capacity = CAPACITIES.choose(&mut rng).copied().unwrap_or(240);
            BinRecord::new(format!("BIN{index:05}"), location).with_details(bin_type, capacity)
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    reason = "clustered bins are offset by scaled normal draws"
)]
fn clustered_location(rng: &mut ChaCha8Rng) -> Coord<f64> {
    let centre = CLUSTER_CENTRES
        .choose(rng)
        .copied()
        .unwrap_or(Coord { x: -0.1418, y: 51.5154 });
    let north: f64 = rng.sample(StandardNormal);
    let east: f64 = rng.sample(StandardNormal);
    Coord {
        x: centre.x + east * CLUSTER_SPREAD,
        y: centre.y + north * CLUSTER_SPREAD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(90)]
    fn produces_requested_count(#[case] count: usize) {
        assert_eq!(generate_sample_bins(count, SAMPLE_SEED).len(), count);
    }

    #[rstest]
    fn same_seed_same_bins() {
        assert_eq!(
            generate_sample_bins(50, SAMPLE_SEED),
            generate_sample_bins(50, SAMPLE_SEED)
        );
        assert_ne!(generate_sample_bins(50, 1), generate_sample_bins(50, 2));
    }

    #[rstest]
    fn uniform_bins_stay_in_the_box() {
        let bounds = AnalysisConfig::default().bounds;
        let bins = generate_sample_bins(300, SAMPLE_SEED);
        let uniform = bins.get(100..).expect("uniform tail");
        assert!(uniform.iter().all(|bin| bounds.contains(bin.location)));
    }

    #[rstest]
    fn details_come_from_fixed_lists() {
        for bin in generate_sample_bins(60, SAMPLE_SEED) {
            assert!(BIN_TYPES.contains(&bin.bin_type.as_str()));
            assert!(CAPACITIES.contains(&bin.capacity_litres));
            assert!(!bin.is_assigned());
        }
    }
}
