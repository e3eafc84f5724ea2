//! R\*-tree lookups over point positions.
//!
//! Query results are always returned in ascending input order so that float
//! sums and tie-breaks match a linear scan over the same points.

use geo::Coord;
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use crate::geometry::distance;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Static R\*-tree over a list of positions, keyed by their input index.
#[derive(Debug, Clone)]
pub struct PointIndex {
    tree: RTree<IndexedPoint>,
    positions: Vec<Coord<f64>>,
}

impl PointIndex {
    /// Bulk-load positions; each is identified by its position in `points`.
    #[must_use]
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let positions: Vec<Coord<f64>> = points.into_iter().collect();
        let entries = positions
            .iter()
            .enumerate()
            .map(|(index, point)| GeomWithData::new([point.x, point.y], index))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
            positions,
        }
    }

    /// Number of indexed positions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index holds no positions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Points strictly closer than `radius` to `center`, with their distance.
    ///
    /// The envelope query over-approximates; membership is decided on the
    /// exact Euclidean distance.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "query envelope spans centre ± radius")]
    pub fn within(&self, center: Coord<f64>, radius: f64) -> Vec<(usize, f64)> {
        let envelope = AABB::from_corners(
            [center.x - radius, center.y - radius],
            [center.x + radius, center.y + radius],
        );
        let mut hits: Vec<(usize, f64)> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|entry| {
                let [x, y] = *entry.geom();
                let d = distance(center, Coord { x, y });
                (d < radius).then_some((entry.data, d))
            })
            .collect();
        hits.sort_unstable_by_key(|&(index, _)| index);
        hits
    }

    /// Nearest point to `center` and its distance.
    ///
    /// Equidistant candidates resolve to the lowest input index.
    #[must_use]
    pub fn nearest(&self, center: Coord<f64>) -> Option<(usize, f64)> {
        let mut candidates = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&[center.x, center.y]);
        let (first, best_d2) = candidates.next()?;
        let index = candidates
            .take_while(|&(_, d2)| d2 <= best_d2)
            .map(|(entry, _)| entry.data)
            .fold(first.data, usize::min);
        let position = self.positions.get(index).copied()?;
        Some((index, distance(center, position)))
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare distances against tolerances"
)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn index() -> PointIndex {
        PointIndex::build([
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 2.0 },
            Coord { x: -1.0, y: 0.0 },
        ])
    }

    #[rstest]
    fn within_is_strict_and_ordered(index: PointIndex) {
        let hits = index.within(Coord { x: 0.0, y: 0.0 }, 1.0);
        assert_eq!(hits, vec![(0, 0.0)]);

        let wider: Vec<usize> = index
            .within(Coord { x: 0.0, y: 0.0 }, 1.5)
            .into_iter()
            .map(|(i, _)| i)
            .collect();
        assert_eq!(wider, vec![0, 1, 3]);
    }

    #[rstest]
    fn nearest_breaks_ties_by_lowest_index(index: PointIndex) {
        let (hit, d) = index.nearest(Coord { x: 0.5, y: 0.0 }).expect("nearest");
        assert_eq!(hit, 0);
        assert!((d - 0.5).abs() < 1e-12);

        let (left, _) = index.nearest(Coord { x: -0.5, y: 0.0 }).expect("nearest");
        assert_eq!(left, 0);
    }

    #[rstest]
    fn empty_index_has_no_neighbours() {
        let index = PointIndex::build(std::iter::empty());
        assert!(index.is_empty());
        assert!(index.nearest(Coord { x: 0.0, y: 0.0 }).is_none());
        assert!(index.within(Coord { x: 0.0, y: 0.0 }, 10.0).is_empty());
    }
}
