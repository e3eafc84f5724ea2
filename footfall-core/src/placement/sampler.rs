//! Within-category spatial samplers.

use geo::Coord;

use crate::geometry::distance;

/// Choose `target` well-spread candidates from a list of positions.
///
/// Implementations return indices into `candidates`, in selection order,
/// without duplicates and never more than `target`.
pub trait SpatialSampler: Send + Sync {
    /// Pick up to `target` candidate indices.
    fn sample(&self, candidates: &[Coord<f64>], target: usize) -> Vec<usize>;
}

/// Greedy max-min dispersion.
///
/// Seeds with the candidate nearest the centroid, then repeatedly adds the
/// candidate whose distance to the chosen set is largest. Ties keep the
/// earliest candidate. Runs in `O(target * candidates)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispersionSampler;

/// Even stride through candidates ordered by latitude, then longitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrideSampler;

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "centroid is the mean candidate position"
)]
fn centroid(candidates: &[Coord<f64>]) -> Coord<f64> {
    let count = candidates.len().max(1) as f64;
    let (x, y) = candidates
        .iter()
        .fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));
    Coord {
        x: x / count,
        y: y / count,
    }
}

/// Index of the first maximum (or minimum when `smallest`) of `values`.
fn first_extreme(values: impl Iterator<Item = (usize, f64)>, smallest: bool) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in values {
        let better = best.is_none_or(|(_, current)| {
            if smallest {
                value < current
            } else {
                value > current
            }
        });
        if better {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

impl SpatialSampler for DispersionSampler {
    fn sample(&self, candidates: &[Coord<f64>], target: usize) -> Vec<usize> {
        if target == 0 || candidates.is_empty() {
            return Vec::new();
        }
        if target >= candidates.len() {
            return (0..candidates.len()).collect();
        }

        let centre = centroid(candidates);
        let Some(seed) = first_extreme(
            candidates.iter().map(|c| distance(*c, centre)).enumerate(),
            true,
        ) else {
            return Vec::new();
        };

        let mut chosen = vec![false; candidates.len()];
        let mut gap = vec![f64::INFINITY; candidates.len()];
        let mut selected = Vec::with_capacity(target);
        let mut next = Some(seed);

        while let Some(pick) = next {
            selected.push(pick);
            if selected.len() >= target {
                break;
            }
            let Some(anchor) = candidates.get(pick).copied() else {
                break;
            };
            if let Some(flag) = chosen.get_mut(pick) {
                *flag = true;
            }
            for ((slot, point), taken) in gap.iter_mut().zip(candidates).zip(&chosen) {
                if !taken {
                    *slot = slot.min(distance(*point, anchor));
                }
            }
            next = first_extreme(
                gap.iter()
                    .zip(&chosen)
                    .enumerate()
                    .filter(|(_, (_, taken))| !**taken)
                    .map(|(index, (value, _))| (index, *value)),
                false,
            );
        }
        selected
    }
}

impl SpatialSampler for StrideSampler {
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "stride is floor(candidates / target)"
    )]
    fn sample(&self, candidates: &[Coord<f64>], target: usize) -> Vec<usize> {
        if target == 0 || candidates.is_empty() {
            return Vec::new();
        }
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            let (pa, pb) = (candidates.get(a), candidates.get(b));
            let key = |p: Option<&Coord<f64>>| p.map_or((0.0, 0.0), |c| (c.y, c.x));
            let ((ya, xa), (yb, xb)) = (key(pa), key(pb));
            ya.total_cmp(&yb).then(xa.total_cmp(&xb)).then(a.cmp(&b))
        });
        let step = (candidates.len() / target).max(1);
        order.into_iter().step_by(step).take(target).collect()
    }
}
