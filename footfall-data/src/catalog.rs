//! Reference points of interest for Westminster.
//!
//! Transit stations are a fixed table of annual usage figures. Bus stops and
//! licensed premises are generated from seeded corridors and hotspots so the
//! catalogue is identical on every run.

use footfall_core::{AnalysisConfig, BoundingBox, BusStop, PoiCatalog, PoiError, TransitStation, Venue};
use geo::Coord;
use log::info;
use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Seed used for the bus stop network.
pub const BUS_STOP_SEED: u64 = 42;

/// Seed used for licensed premises.
pub const VENUE_SEED: u64 = 43;

/// Random stops scattered across the study box in addition to the corridors.
pub const SCATTERED_STOP_COUNT: usize = 150;

const CORRIDOR_JITTER: f64 = 0.001;
const FREQUENCY_JITTER: i32 = 5;
const SCATTER_INSET: f64 = 0.01;

/// Errors raised while building the reference catalogue.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A generated record failed validation.
    #[error("invalid reference point of interest")]
    Poi(#[from] PoiError),
    /// The venue type weights could not be turned into a distribution.
    #[error("invalid venue type weights")]
    Weights(#[from] WeightedError),
}

/// Station name, latitude, longitude and annual usage in millions.
const STATIONS: [(&str, f64, f64, f64); 31] = [
    ("Victoria", 51.4965, -0.1447, 82.0),
    ("Oxford Circus", 51.5152, -0.1418, 98.0),
    ("Paddington", 51.5154, -0.1755, 50.0),
    ("King's Cross St. Pancras", 51.5308, -0.1238, 97.0),
    ("Baker Street", 51.5226, -0.1571, 30.0),
    ("Westminster", 51.5010, -0.1254, 25.0),
    ("Green Park", 51.5067, -0.1428, 35.0),
    ("Piccadilly Circus", 51.5100, -0.1347, 40.0),
    ("Leicester Square", 51.5113, -0.1281, 35.0),
    ("Tottenham Court Road", 51.5165, -0.1310, 32.0),
    ("Bond Street", 51.5142, -0.1494, 28.0),
    ("Marble Arch", 51.5136, -0.1586, 18.0),
    ("Hyde Park Corner", 51.5027, -0.1527, 12.0),
    ("Knightsbridge", 51.5015, -0.1607, 15.0),
    ("Pimlico", 51.4893, -0.1334, 8.0),
    ("St. James's Park", 51.4994, -0.1335, 10.0),
    ("Charing Cross", 51.5074, -0.1270, 15.0),
    ("Embankment", 51.5074, -0.1223, 18.0),
    ("Covent Garden", 51.5129, -0.1243, 20.0),
    ("Holborn", 51.5174, -0.1200, 25.0),
    ("Warren Street", 51.5247, -0.1384, 12.0),
    ("Great Portland Street", 51.5238, -0.1439, 8.0),
    ("Regent's Park", 51.5234, -0.1466, 6.0),
    ("Edgware Road (Bakerloo)", 51.5199, -0.1679, 7.0),
    ("Edgware Road (Circle)", 51.5203, -0.1680, 8.0),
    ("Marylebone", 51.5225, -0.1631, 15.0),
    ("Lancaster Gate", 51.5119, -0.1756, 8.0),
    ("Queensway", 51.5107, -0.1871, 10.0),
    ("Bayswater", 51.5122, -0.1879, 7.0),
    ("Warwick Avenue", 51.5235, -0.1835, 5.0),
    ("Maida Vale", 51.5298, -0.1854, 4.0),
];

#[derive(Debug, Clone, Copy)]
enum Axis {
    /// Fixed latitude, stops spread along longitude.
    EastWest,
    /// Fixed longitude, stops spread along latitude.
    NorthSouth,
}

#[derive(Debug, Clone, Copy)]
struct Corridor {
    axis: Axis,
    fixed: f64,
    span: (f64, f64),
    stops: u32,
    frequency: u32,
}

impl Corridor {
    const fn east_west(lat: f64, span: (f64, f64), frequency: u32) -> Self {
        Self {
            axis: Axis::EastWest,
            fixed: lat,
            span,
            stops: 8,
            frequency,
        }
    }

    const fn north_south(lon: f64, span: (f64, f64), frequency: u32) -> Self {
        Self {
            axis: Axis::NorthSouth,
            fixed: lon,
            span,
            stops: 6,
            frequency,
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "stops are interpolated along the corridor with positional jitter"
    )]
    fn stop_location(&self, step: u32, rng: &mut ChaCha8Rng) -> Coord<f64> {
        let last = self.stops.saturating_sub(1).max(1);
        let fraction = f64::from(step) / f64::from(last);
        let (start, end) = self.span;
        let along = start + fraction * (end - start);
        let across = self.fixed + rng.gen_range(-CORRIDOR_JITTER..=CORRIDOR_JITTER);
        match self.axis {
            Axis::EastWest => Coord { x: along, y: across },
            Axis::NorthSouth => Coord { x: across, y: along },
        }
    }
}

const CORRIDORS: [Corridor; 9] = [
    // Oxford Street
    Corridor::east_west(51.5154, (-0.16, -0.13), 60),
    // Piccadilly
    Corridor::east_west(51.5088, (-0.17, -0.13), 45),
    // Victoria Street
    Corridor::east_west(51.4985, (-0.145, -0.125), 40),
    // Strand
    Corridor::east_west(51.5108, (-0.13, -0.12), 45),
    // Marylebone Road
    Corridor::east_west(51.5225, (-0.18, -0.13), 35),
    // Edgware Road
    Corridor::north_south(-0.1679, (51.50, 51.53), 35),
    // Park Lane
    Corridor::north_south(-0.1510, (51.50, 51.52), 30),
    // Whitehall
    Corridor::north_south(-0.1265, (51.50, 51.51), 35),
    // Regent Street
    Corridor::north_south(-0.1400, (51.51, 51.52), 40),
];

/// A cluster of licensed premises.
#[derive(Debug, Clone, Copy)]
struct Hotspot {
    name: &'static str,
    center: Coord<f64>,
    radius: f64,
    count: u32,
}

const fn hotspot(name: &'static str, lat: f64, lon: f64, radius: f64, count: u32) -> Hotspot {
    Hotspot {
        name,
        center: Coord { x: lon, y: lat },
        radius,
        count,
    }
}

const HOTSPOTS: [Hotspot; 13] = [
    hotspot("Soho", 51.5136, -0.1340, 0.008, 150),
    hotspot("Covent Garden", 51.5117, -0.1240, 0.006, 100),
    hotspot("Leicester Square", 51.5105, -0.1300, 0.005, 80),
    hotspot("West End Theatre", 51.5115, -0.1260, 0.007, 60),
    hotspot("Mayfair", 51.5095, -0.1470, 0.010, 70),
    hotspot("Fitzrovia", 51.5190, -0.1380, 0.007, 50),
    hotspot("Marylebone", 51.5200, -0.1550, 0.008, 45),
    hotspot("Victoria", 51.4970, -0.1440, 0.007, 55),
    hotspot("Pimlico", 51.4880, -0.1350, 0.008, 30),
    hotspot("Paddington", 51.5165, -0.1780, 0.008, 40),
    hotspot("Bayswater", 51.5115, -0.1870, 0.007, 35),
    hotspot("Chinatown", 51.5112, -0.1310, 0.003, 90),
    hotspot("St James", 51.5060, -0.1380, 0.006, 40),
];

/// Venue type, draw weight and inclusive capacity range.
const VENUE_TYPES: [(&str, f64, (u32, u32)); 6] = [
    ("Restaurant", 0.35, (30, 150)),
    ("Pub", 0.25, (50, 200)),
    ("Bar", 0.20, (40, 150)),
    ("Club", 0.05, (100, 500)),
    ("Cafe", 0.10, (15, 60)),
    ("Hotel Bar", 0.05, (30, 100)),
];

/// The fixed table of underground and mainline stations.
///
/// # Errors
/// Returns [`PoiError`] if a table entry fails validation.
pub fn reference_stations() -> Result<Vec<TransitStation>, PoiError> {
    STATIONS
        .iter()
        .map(|&(name, lat, lon, usage)| TransitStation::new(name, Coord { x: lon, y: lat }, usage))
        .collect()
}

/// Bus stops along the main corridors plus a scattering across `bounds`.
///
/// Stop ids are `BS0000` onwards in generation order.
///
/// # Errors
/// Returns [`PoiError`] if a generated stop fails validation.
pub fn generate_bus_stops(bounds: &BoundingBox, seed: u64) -> Result<Vec<BusStop>, PoiError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut stops = Vec::new();
    for corridor in &CORRIDORS {
        for step in 0..corridor.stops {
            let location = corridor.stop_location(step, &mut rng);
            let delta = rng.gen_range(-FREQUENCY_JITTER..=FREQUENCY_JITTER);
            let frequency = corridor.frequency.saturating_add_signed(delta).max(1);
            stops.push(BusStop::new(format!("BS{:04}", stops.len()), location, frequency)?);
        }
    }
    for _ in 0..SCATTERED_STOP_COUNT {
        let location = scattered_location(bounds, &mut rng);
        let frequency = rng.gen_range(5..=25);
        stops.push(BusStop::new(format!("BS{:04}", stops.len()), location, frequency)?);
    }
    Ok(stops)
}

#[expect(
    clippy::float_arithmetic,
    reason = "scattered stops keep clear of the box edges"
)]
fn scattered_location(bounds: &BoundingBox, rng: &mut ChaCha8Rng) -> Coord<f64> {
    let lat_span = (bounds.min_lat + SCATTER_INSET, bounds.max_lat - SCATTER_INSET);
    let lon_span = (bounds.min_lon + SCATTER_INSET, bounds.max_lon - SCATTER_INSET);
    Coord {
        x: sample_span(rng, lon_span),
        y: sample_span(rng, lat_span),
    }
}

fn sample_span(rng: &mut ChaCha8Rng, (low, high): (f64, f64)) -> f64 {
    if low < high {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// Licensed premises clustered around the West End hotspots.
///
/// Positions are uniform over each hotspot disc. Venue ids are `LP00000`
/// onwards in generation order.
///
/// # Errors
/// Returns [`CatalogError`] if a generated venue fails validation.
pub fn generate_venues(seed: u64) -> Result<Vec<Venue>, CatalogError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let kinds = WeightedIndex::new(VENUE_TYPES.iter().map(|&(_, weight, _)| weight))?;
    let mut venues = Vec::new();
    for spot in &HOTSPOTS {
        for _ in 0..spot.count {
            let location = disc_location(spot, &mut rng);
            let Some(&(kind, _, (low, high))) = VENUE_TYPES.get(kinds.sample(&mut rng)) else {
                continue;
            };
            let capacity = rng.gen_range(low..=high);
            let id = format!("LP{:05}", venues.len());
            venues.push(Venue::new(id, spot.name, kind, location, capacity)?);
        }
    }
    Ok(venues)
}

#[expect(
    clippy::float_arithmetic,
    reason = "square-root radius keeps the disc uniformly filled"
)]
fn disc_location(spot: &Hotspot, rng: &mut ChaCha8Rng) -> Coord<f64> {
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);
    let reach = spot.radius * rng.r#gen::<f64>().sqrt();
    Coord {
        x: spot.center.x + reach * angle.sin(),
        y: spot.center.y + reach * angle.cos(),
    }
}

/// Stations, bus stops and venues for the study box in `config`.
///
/// # Errors
/// Returns [`CatalogError`] if any generated record fails validation.
///
/// # Examples
/// ```
/// use footfall_core::AnalysisConfig;
/// use footfall_data::reference_catalog;
///
/// let catalog = reference_catalog(&AnalysisConfig::default()).expect("catalogue");
/// assert_eq!(catalog.transit.len(), 31);
/// ```
pub fn reference_catalog(config: &AnalysisConfig) -> Result<PoiCatalog, CatalogError> {
    let catalog = PoiCatalog::new(
        reference_stations()?,
        generate_bus_stops(&config.bounds, BUS_STOP_SEED)?,
        generate_venues(VENUE_SEED)?,
    );
    info!(
        "reference catalogue: {} stations, {} bus stops, {} venues",
        catalog.transit.len(),
        catalog.bus_stops.len(),
        catalog.venues.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn station_table_is_complete() {
        let stations = reference_stations().expect("valid table");
        assert_eq!(stations.len(), 31);
        let victoria = stations.first().expect("first station");
        assert_eq!(victoria.name, "Victoria");
        assert_eq!(victoria.location, Coord { x: -0.1447, y: 51.4965 });
    }

    #[rstest]
    fn bus_network_has_corridors_and_scatter() {
        let bounds = AnalysisConfig::default().bounds;
        let stops = generate_bus_stops(&bounds, BUS_STOP_SEED).expect("valid stops");
        let corridor_stops = 5 * 8 + 4 * 6;
        assert_eq!(stops.len(), corridor_stops + SCATTERED_STOP_COUNT);
        assert_eq!(stops.first().map(|stop| stop.id.as_str()), Some("BS0000"));
        assert!(stops.iter().all(|stop| stop.frequency >= 1));
        assert!(stops.iter().all(|stop| bounds.contains(stop.location)));
    }

    #[rstest]
    fn scattered_stops_respect_frequency_range() {
        let bounds = AnalysisConfig::default().bounds;
        let stops = generate_bus_stops(&bounds, 7).expect("valid stops");
        let scattered = stops.get(64..).expect("scattered tail");
        assert!(scattered.iter().all(|stop| (5..=25).contains(&stop.frequency)));
    }

    #[rstest]
    #[expect(clippy::float_arithmetic, reason = "distance check against hotspot radius")]
    fn venues_stay_inside_their_hotspots() {
        let venues = generate_venues(VENUE_SEED).expect("valid venues");
        let expected: u32 = HOTSPOTS.iter().map(|spot| spot.count).sum();
        assert_eq!(venues.len(), usize::try_from(expected).expect("small count"));
        for venue in &venues {
            let spot = HOTSPOTS
                .iter()
                .find(|spot| spot.name == venue.area)
                .expect("known hotspot");
            let reach = footfall_core::distance(venue.location, spot.center);
            assert!(reach <= spot.radius + 1e-12);
            let (_, _, (low, high)) = VENUE_TYPES
                .iter()
                .find(|(kind, _, _)| *kind == venue.kind)
                .copied()
                .expect("known venue type");
            assert!((low..=high).contains(&venue.capacity));
        }
    }

    #[rstest]
    fn catalogue_is_deterministic() {
        let config = AnalysisConfig::default();
        let first = reference_catalog(&config).expect("catalogue");
        let second = reference_catalog(&config).expect("catalogue");
        assert_eq!(first, second);
    }
}
