//! Illustrative ward and road tagging for grid cells.
//!
//! Wards are simplified rectangles and each carries a short list of
//! representative streets. A location belongs to the first ward whose
//! outline contains it, falling back to the ward with the nearest centroid.
//! Road picks are seeded only by position, so they repeat across runs.

use std::sync::LazyLock;

use geo::{Coord, Rect};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::geometry::{Region, distance, vertex_centroid};

/// Ward assumed when the table cannot be consulted.
pub const FALLBACK_WARD: &str = "West End";

/// Road assumed when a ward has no streets listed.
pub const FALLBACK_ROAD: &str = "Unknown Road";

struct WardDefinition {
    name: &'static str,
    west: f64,
    east: f64,
    south: f64,
    north: f64,
    roads: &'static [&'static str],
}

const WARD_TABLE: [WardDefinition; 23] = [
    WardDefinition {
        name: "West End",
        west: -0.1500,
        east: -0.1250,
        south: 51.5050,
        north: 51.5200,
        roads: &[
            "Oxford Street",
            "Regent Street",
            "Bond Street",
            "Carnaby Street",
            "Wardour Street",
            "Dean Street",
            "Frith Street",
            "Old Compton Street",
            "Shaftesbury Avenue",
            "Charing Cross Road",
        ],
    },
    WardDefinition {
        name: "St James's",
        west: -0.1500,
        east: -0.1200,
        south: 51.4950,
        north: 51.5050,
        roads: &[
            "Piccadilly",
            "Pall Mall",
            "St James's Street",
            "Jermyn Street",
            "The Mall",
            "Haymarket",
            "Whitehall",
            "Trafalgar Square",
        ],
    },
    WardDefinition {
        name: "Marylebone High Street",
        west: -0.1650,
        east: -0.1450,
        south: 51.5150,
        north: 51.5280,
        roads: &[
            "Marylebone High Street",
            "George Street",
            "Baker Street",
            "Gloucester Place",
            "Welbeck Street",
            "Wigmore Street",
        ],
    },
    WardDefinition {
        name: "Regent's Park",
        west: -0.1700,
        east: -0.1350,
        south: 51.5280,
        north: 51.5400,
        roads: &[
            "Park Road",
            "Prince Albert Road",
            "Outer Circle",
            "Albany Street",
            "Portland Place",
        ],
    },
    WardDefinition {
        name: "Hyde Park",
        west: -0.1850,
        east: -0.1500,
        south: 51.4950,
        north: 51.5150,
        roads: &[
            "Park Lane",
            "Mount Street",
            "South Audley Street",
            "North Audley Street",
            "Grosvenor Square",
        ],
    },
    WardDefinition {
        name: "Lancaster Gate",
        west: -0.1950,
        east: -0.1750,
        south: 51.5050,
        north: 51.5200,
        roads: &[
            "Lancaster Gate",
            "Bayswater Road",
            "Craven Road",
            "Leinster Gardens",
            "Westbourne Street",
        ],
    },
    WardDefinition {
        name: "Bayswater",
        west: -0.2050,
        east: -0.1850,
        south: 51.5050,
        north: 51.5200,
        roads: &[
            "Queensway",
            "Westbourne Grove",
            "Porchester Road",
            "Moscow Road",
            "Inverness Terrace",
        ],
    },
    WardDefinition {
        name: "Maida Vale",
        west: -0.2050,
        east: -0.1850,
        south: 51.5280,
        north: 51.5400,
        roads: &[
            "Maida Vale",
            "Elgin Avenue",
            "Sutherland Avenue",
            "Randolph Avenue",
            "Clifton Gardens",
        ],
    },
    WardDefinition {
        name: "Little Venice",
        west: -0.1900,
        east: -0.1700,
        south: 51.5200,
        north: 51.5280,
        roads: &[
            "Warwick Avenue",
            "Clifton Road",
            "Formosa Street",
            "Blomfield Road",
            "Delamere Terrace",
        ],
    },
    WardDefinition {
        name: "Church Street",
        west: -0.1800,
        east: -0.1600,
        south: 51.5200,
        north: 51.5350,
        roads: &[
            "Church Street",
            "Lisson Grove",
            "Bell Street",
            "Salisbury Street",
            "Frampton Street",
        ],
    },
    WardDefinition {
        name: "Vincent Square",
        west: -0.1400,
        east: -0.1200,
        south: 51.4880,
        north: 51.4980,
        roads: &[
            "Vincent Square",
            "Rochester Row",
            "Greycoat Place",
            "Francis Street",
            "Artillery Row",
        ],
    },
    WardDefinition {
        name: "Pimlico North",
        west: -0.1450,
        east: -0.1200,
        south: 51.4850,
        north: 51.4900,
        roads: &[
            "Belgrave Road",
            "St George's Drive",
            "Lupus Street",
            "Claverton Street",
            "Cambridge Street",
        ],
    },
    WardDefinition {
        name: "Pimlico South",
        west: -0.1450,
        east: -0.1100,
        south: 51.4800,
        north: 51.4850,
        roads: &[
            "Lupus Street",
            "Moreton Street",
            "Churton Street",
            "Tachbrook Street",
            "Warwick Way",
        ],
    },
    WardDefinition {
        name: "Churchill",
        west: -0.1500,
        east: -0.1300,
        south: 51.4930,
        north: 51.5000,
        roads: &[
            "Victoria Street",
            "Buckingham Gate",
            "Petty France",
            "Broadway",
            "Palace Street",
        ],
    },
    WardDefinition {
        name: "Knightsbridge & Belgravia",
        west: -0.1850,
        east: -0.1500,
        south: 51.4900,
        north: 51.5050,
        roads: &[
            "Knightsbridge",
            "Sloane Street",
            "Belgrave Square",
            "Eaton Square",
            "Pont Street",
        ],
    },
    WardDefinition {
        name: "Warwick",
        west: -0.1500,
        east: -0.1300,
        south: 51.4850,
        north: 51.4950,
        roads: &[
            "Vauxhall Bridge Road",
            "Belgrave Road",
            "Warwick Street",
            "St George's Square",
            "Dolphin Square",
        ],
    },
    WardDefinition {
        name: "Fitzrovia",
        west: -0.1500,
        east: -0.1250,
        south: 51.5150,
        north: 51.5280,
        roads: &[
            "Charlotte Street",
            "Goodge Street",
            "Tottenham Court Road",
            "Cleveland Street",
            "Rathbone Place",
        ],
    },
    WardDefinition {
        name: "Abbey Road",
        west: -0.2050,
        east: -0.1800,
        south: 51.5200,
        north: 51.5350,
        roads: &[
            "Abbey Road",
            "Boundary Road",
            "Carlton Vale",
            "Kilburn Park Road",
            "Quex Road",
        ],
    },
    WardDefinition {
        name: "Bryanston & Dorset Square",
        west: -0.1750,
        east: -0.1550,
        south: 51.5150,
        north: 51.5250,
        roads: &[
            "Edgware Road",
            "Seymour Place",
            "Crawford Street",
            "Dorset Street",
            "Boston Place",
        ],
    },
    WardDefinition {
        name: "Westbourne",
        west: -0.2050,
        east: -0.1850,
        south: 51.5000,
        north: 51.5150,
        roads: &[
            "Westbourne Park Road",
            "Great Western Road",
            "Harrow Road",
            "Westbourne Park Villas",
            "Porchester Gardens",
        ],
    },
    WardDefinition {
        name: "Queen's Park",
        west: -0.2050,
        east: -0.1900,
        south: 51.5250,
        north: 51.5350,
        roads: &[
            "Queen's Park",
            "Salusbury Road",
            "Kilburn Lane",
            "Chamberlayne Road",
            "Harvist Road",
        ],
    },
    WardDefinition {
        name: "Harrow Road",
        west: -0.2050,
        east: -0.1850,
        south: 51.5200,
        north: 51.5280,
        roads: &[
            "Harrow Road",
            "Shirland Road",
            "Ashmore Road",
            "Fernhead Road",
            "Walterton Road",
        ],
    },
    WardDefinition {
        name: "Tachbrook",
        west: -0.1400,
        east: -0.1200,
        south: 51.4800,
        north: 51.4880,
        roads: &[
            "Tachbrook Street",
            "Charlwood Street",
            "Aylesford Street",
            "Clarendon Street",
            "Denbigh Street",
        ],
    },
];

struct Ward {
    name: &'static str,
    region: Region,
    centroid: Coord<f64>,
    roads: &'static [&'static str],
}

static WARDS: LazyLock<Vec<Ward>> = LazyLock::new(|| {
    WARD_TABLE
        .iter()
        .map(|def| {
            let rect = Rect::new(
                Coord {
                    x: def.west,
                    y: def.south,
                },
                Coord {
                    x: def.east,
                    y: def.north,
                },
            );
            let region = Region::from_rect(def.name, rect);
            let centroid = vertex_centroid(region.boundary().exterior()).unwrap_or_else(|| rect.center());
            Ward {
                name: def.name,
                region,
                centroid,
                roads: def.roads,
            }
        })
        .collect()
});

/// Ward and road assigned to a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminTags {
    /// Ward name.
    pub ward: &'static str,
    /// Representative road within the ward.
    pub road: &'static str,
}

fn ward_for(location: Coord<f64>) -> Option<&'static Ward> {
    WARDS
        .iter()
        .find(|ward| ward.region.contains(location))
        .or_else(|| {
            WARDS.iter().min_by(|a, b| {
                distance(location, a.centroid).total_cmp(&distance(location, b.centroid))
            })
        })
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "position seed folds scaled coordinates into a bounded integer"
)]
fn position_seed(location: Coord<f64>) -> u64 {
    (location.y * 10_000.0 + location.x * 10_000.0).rem_euclid(1_000_000.0) as u64
}

/// Names of every ward in table order.
#[must_use = "iterators are lazy"]
pub fn ward_names() -> impl Iterator<Item = &'static str> {
    WARD_TABLE.iter().map(|def| def.name)
}

/// Tag `location` with a ward and a representative road.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use footfall_core::tag_location;
///
/// let tags = tag_location(Coord { x: -0.1418, y: 51.5152 });
/// assert_eq!(tags.ward, "West End");
/// assert_eq!(tags, tag_location(Coord { x: -0.1418, y: 51.5152 }));
/// ```
#[must_use]
pub fn tag_location(location: Coord<f64>) -> AdminTags {
    let Some(ward) = ward_for(location) else {
        return AdminTags {
            ward: FALLBACK_WARD,
            road: FALLBACK_ROAD,
        };
    };
    let mut rng = ChaCha8Rng::seed_from_u64(position_seed(location));
    let road = ward.roads.choose(&mut rng).copied().unwrap_or(FALLBACK_ROAD);
    AdminTags {
        ward: ward.name,
        road,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Coord { x: -0.1418, y: 51.5152 }, "West End")]
    #[case(Coord { x: -0.1350, y: 51.5000 }, "St James's")]
    #[case(Coord { x: -0.1300, y: 51.4820 }, "Pimlico South")]
    fn containing_ward_wins(#[case] location: Coord<f64>, #[case] expected: &str) {
        assert_eq!(tag_location(location).ward, expected);
    }

    #[rstest]
    fn first_matching_ward_wins_on_overlap() {
        // Inside both West End and Marylebone High Street.
        let tags = tag_location(Coord { x: -0.1470, y: 51.5170 });
        assert_eq!(tags.ward, "West End");
    }

    #[rstest]
    fn locations_outside_every_ward_use_nearest_centroid() {
        let tags = tag_location(Coord { x: -0.1000, y: 51.5200 });
        assert_eq!(tags.ward, "Fitzrovia");
    }

    #[rstest]
    fn road_comes_from_the_ward_list() {
        let location = Coord { x: -0.1418, y: 51.5152 };
        let tags = tag_location(location);
        let ward = ward_for(location).expect("ward");
        assert!(ward.roads.contains(&tags.road));
        assert_eq!(tag_location(location), tags);
    }

    #[rstest]
    fn table_lists_every_ward_once() {
        let mut names: Vec<&str> = ward_names().collect();
        assert_eq!(names.len(), 23);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 23);
    }
}
