//! Planar geometry over longitude/latitude pairs.
//!
//! Distances are raw Euclidean distances in degrees. Coordinates follow the
//! `geo` convention of `x = longitude` and `y = latitude`.

use geo::{Coord, LineString, Polygon, Rect};

/// Euclidean distance between two coordinates, in degrees.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use footfall_core::distance;
///
/// let d = distance(Coord { x: 0.0, y: 0.0 }, Coord { x: 3.0, y: 4.0 });
/// assert!((d - 5.0).abs() < 1e-12);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "distance is computed from coordinate deltas"
)]
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Ray-casting containment test against a closed ring.
///
/// An edge counts as crossed only when its endpoints straddle the ray
/// (`(yi > y) != (yj > y)`), so horizontal edges and vertices grazed from
/// below never toggle the result.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "ray casting interpolates the edge crossing point"
)]
pub fn point_in_ring(point: Coord<f64>, ring: &LineString<f64>) -> bool {
    let mut inside = false;
    for edge in ring.lines() {
        let (start, end) = (edge.start, edge.end);
        if (start.y > point.y) != (end.y > point.y) {
            let crossing = (end.x - start.x) * (point.y - start.y) / (end.y - start.y) + start.x;
            if point.x < crossing {
                inside = !inside;
            }
        }
    }
    inside
}

/// Arithmetic mean of a ring's vertices, ignoring the closing vertex.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "vertex averaging divides by a small vertex count"
)]
pub fn vertex_centroid(ring: &LineString<f64>) -> Option<Coord<f64>> {
    let coords: &[Coord<f64>] = &ring.0;
    let open = match coords.split_last() {
        Some((_, rest)) if ring.is_closed() && !rest.is_empty() => rest,
        _ => coords,
    };
    if open.is_empty() {
        return None;
    }
    let count = open.len() as f64;
    let (sum_x, sum_y) = open
        .iter()
        .fold((0.0, 0.0), |(x, y), coord| (x + coord.x, y + coord.y));
    Some(Coord {
        x: sum_x / count,
        y: sum_y / count,
    })
}

/// A named study area bounded by a fixed polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    boundary: Polygon<f64>,
}

/// Simplified outline of the City of Westminster, as `(longitude, latitude)`.
const WESTMINSTER_OUTLINE: [(f64, f64); 11] = [
    (-0.1634, 51.5275),
    (-0.1343, 51.5246),
    (-0.1165, 51.5180),
    (-0.1150, 51.5000),
    (-0.1240, 51.4870),
    (-0.1450, 51.4850),
    (-0.1600, 51.4867),
    (-0.1800, 51.5000),
    (-0.2000, 51.5100),
    (-0.1900, 51.5200),
    (-0.1634, 51.5275),
];

impl Region {
    /// Build a region from a name and an outline of `(lon, lat)` vertices.
    ///
    /// The outline is closed automatically when the last vertex differs
    /// from the first.
    #[must_use]
    pub fn new(name: impl Into<String>, outline: &[(f64, f64)]) -> Self {
        let ring: LineString<f64> = outline
            .iter()
            .map(|&(x, y)| Coord { x, y })
            .collect::<Vec<_>>()
            .into();
        Self {
            name: name.into(),
            boundary: Polygon::new(ring, Vec::new()),
        }
    }

    /// Axis-aligned rectangular region covering `rect`.
    #[must_use]
    pub fn from_rect(name: impl Into<String>, rect: Rect<f64>) -> Self {
        let (min, max) = (rect.min(), rect.max());
        Self::new(
            name,
            &[
                (min.x, min.y),
                (max.x, min.y),
                (max.x, max.y),
                (min.x, max.y),
                (min.x, min.y),
            ],
        )
    }

    /// The illustrative Westminster boundary used by the reference analysis.
    #[must_use]
    pub fn westminster() -> Self {
        Self::new("Westminster", &WESTMINSTER_OUTLINE)
    }

    /// Human-readable region name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outline polygon of the region.
    #[must_use]
    pub const fn boundary(&self) -> &Polygon<f64> {
        &self.boundary
    }

    /// Report whether `point` lies inside the region outline.
    #[must_use]
    pub fn contains(&self, point: Coord<f64>) -> bool {
        point_in_ring(point, self.boundary.exterior())
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::westminster()
    }
}

#[cfg(test)]
#[expect(
    clippy::float_arithmetic,
    reason = "tests compare float results against tolerances"
)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn unit_square() -> LineString<f64> {
        vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ]
        .into()
    }

    #[rstest]
    #[case(Coord { x: 0.5, y: 0.5 }, true)]
    #[case(Coord { x: 1.5, y: 0.5 }, false)]
    #[case(Coord { x: -0.5, y: 0.5 }, false)]
    #[case(Coord { x: 0.5, y: 1.5 }, false)]
    // The top edge is horizontal and never straddles the ray.
    #[case(Coord { x: 0.5, y: 1.0 }, false)]
    // The bottom edge counts as inside because `y > 0` flips on the sides.
    #[case(Coord { x: 0.5, y: 0.0 }, true)]
    fn ring_containment(#[case] point: Coord<f64>, #[case] expected: bool) {
        assert_eq!(point_in_ring(point, &unit_square()), expected);
    }

    #[rstest]
    fn westminster_contains_oxford_circus_but_not_greenwich() {
        let region = Region::westminster();
        assert!(region.contains(Coord {
            x: -0.1418,
            y: 51.5152
        }));
        assert!(!region.contains(Coord { x: 0.0, y: 51.48 }));
    }

    #[rstest]
    fn vertex_centroid_ignores_closing_vertex() {
        let centroid = vertex_centroid(&unit_square()).expect("centroid");
        assert!((centroid.x - 0.5).abs() < 1e-12);
        assert!((centroid.y - 0.5).abs() < 1e-12);
    }

    #[rstest]
    fn from_rect_closes_outline() {
        let rect = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 2.0 });
        let region = Region::from_rect("box", rect);
        assert!(region.boundary().exterior().is_closed());
        assert!(region.contains(Coord { x: 1.0, y: 1.0 }));
        assert_eq!(region.name(), "box");
    }
}
