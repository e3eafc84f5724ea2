//! Weighted points of interest that drive footfall.
//!
//! Three kinds of feature attract pedestrians: rail stations weighted by
//! annual usage, bus stops weighted by hourly frequency, and licensed venues
//! weighted by capacity. Each kind implements [`WeightedPoi`] so the scorer
//! can treat them uniformly.

use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a point of interest.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoiError {
    /// Latitude or longitude was NaN or infinite.
    #[error("point of interest {id} has a non-finite position")]
    InvalidLocation {
        /// Identifier or name of the rejected record.
        id: String,
    },
    /// Weight was negative, NaN or infinite.
    #[error("point of interest {id} has invalid weight {weight}")]
    InvalidWeight {
        /// Identifier or name of the rejected record.
        id: String,
        /// Offending weight value.
        weight: f64,
    },
    /// Venue capacity must be strictly positive.
    #[error("venue {id} must have a positive capacity")]
    ZeroCapacity {
        /// Identifier of the rejected venue.
        id: String,
    },
}

/// Kind of point of interest; selects the influence settings and kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    /// Rail or underground station.
    Transit,
    /// Bus stop.
    BusStop,
    /// Licensed premises such as pubs and restaurants.
    Venue,
}

impl PoiKind {
    /// All kinds in scoring order.
    pub const ALL: [Self; 3] = [Self::Transit, Self::BusStop, Self::Venue];
}

impl fmt::Display for PoiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Transit => "transit",
            Self::BusStop => "bus_stop",
            Self::Venue => "venue",
        };
        f.write_str(label)
    }
}

/// A positioned feature carrying a non-negative influence weight.
///
/// Implementations must return finite coordinates and a finite, non-negative
/// weight; the constructors in this module enforce both.
pub trait WeightedPoi {
    /// Kind used to pick the influence radius and decay kernel.
    const KIND: PoiKind;

    /// Position with `x = longitude` and `y = latitude`.
    fn location(&self) -> Coord<f64>;

    /// Influence weight before distance decay.
    fn weight(&self) -> f64;
}

fn check_location(id: &str, location: Coord<f64>) -> Result<(), PoiError> {
    if location.x.is_finite() && location.y.is_finite() {
        Ok(())
    } else {
        Err(PoiError::InvalidLocation { id: id.to_owned() })
    }
}

/// A rail station weighted by annual usage.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use footfall_core::{TransitStation, WeightedPoi};
///
/// let station = TransitStation::new("Victoria", Coord { x: -0.1447, y: 51.4965 }, 82.0)
///     .expect("valid station");
/// assert_eq!(station.weight(), 82.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStation {
    /// Station name.
    pub name: String,
    /// Station position.
    pub location: Coord<f64>,
    /// Annual usage, in millions of passengers for the reference data.
    pub usage: f64,
}

impl TransitStation {
    /// Validate and build a station.
    ///
    /// # Errors
    /// Returns [`PoiError`] for a non-finite position or a negative or
    /// non-finite usage figure.
    pub fn new(name: impl Into<String>, location: Coord<f64>, usage: f64) -> Result<Self, PoiError> {
        let station_name = name.into();
        check_location(&station_name, location)?;
        if !usage.is_finite() || usage < 0.0 {
            return Err(PoiError::InvalidWeight {
                id: station_name,
                weight: usage,
            });
        }
        Ok(Self {
            name: station_name,
            location,
            usage,
        })
    }
}

impl WeightedPoi for TransitStation {
    const KIND: PoiKind = PoiKind::Transit;

    fn location(&self) -> Coord<f64> {
        self.location
    }

    fn weight(&self) -> f64 {
        self.usage
    }
}

/// A bus stop weighted by buses per hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    /// Stop identifier, e.g. `BS0001`.
    pub id: String,
    /// Stop position.
    pub location: Coord<f64>,
    /// Buses per hour.
    pub frequency: u32,
}

impl BusStop {
    /// Validate and build a bus stop.
    ///
    /// # Errors
    /// Returns [`PoiError::InvalidLocation`] for a non-finite position.
    pub fn new(id: impl Into<String>, location: Coord<f64>, frequency: u32) -> Result<Self, PoiError> {
        let stop_id = id.into();
        check_location(&stop_id, location)?;
        Ok(Self {
            id: stop_id,
            location,
            frequency,
        })
    }
}

impl WeightedPoi for BusStop {
    const KIND: PoiKind = PoiKind::BusStop;

    fn location(&self) -> Coord<f64> {
        self.location
    }

    fn weight(&self) -> f64 {
        f64::from(self.frequency)
    }
}

/// A licensed venue weighted by capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue identifier, e.g. `LP00001`.
    pub id: String,
    /// Neighbourhood or hotspot the venue belongs to.
    pub area: String,
    /// Venue kind label such as `Pub` or `Restaurant`.
    pub kind: String,
    /// Venue position.
    pub location: Coord<f64>,
    /// Licensed capacity in people; always positive.
    pub capacity: u32,
}

impl Venue {
    /// Validate and build a venue.
    ///
    /// # Errors
    /// Returns [`PoiError`] for a non-finite position or zero capacity.
    pub fn new(
        id: impl Into<String>,
        area: impl Into<String>,
        kind: impl Into<String>,
        location: Coord<f64>,
        capacity: u32,
    ) -> Result<Self, PoiError> {
        let venue_id = id.into();
        check_location(&venue_id, location)?;
        if capacity == 0 {
            return Err(PoiError::ZeroCapacity { id: venue_id });
        }
        Ok(Self {
            id: venue_id,
            area: area.into(),
            kind: kind.into(),
            location,
            capacity,
        })
    }
}

impl WeightedPoi for Venue {
    const KIND: PoiKind = PoiKind::Venue;

    fn location(&self) -> Coord<f64> {
        self.location
    }

    fn weight(&self) -> f64 {
        f64::from(self.capacity)
    }
}

/// All points of interest feeding one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoiCatalog {
    /// Rail stations.
    pub transit: Vec<TransitStation>,
    /// Bus stops.
    pub bus_stops: Vec<BusStop>,
    /// Licensed venues.
    pub venues: Vec<Venue>,
}

impl PoiCatalog {
    /// Bundle the three feature lists.
    #[must_use]
    pub const fn new(
        transit: Vec<TransitStation>,
        bus_stops: Vec<BusStop>,
        venues: Vec<Venue>,
    ) -> Self {
        Self {
            transit,
            bus_stops,
            venues,
        }
    }

    /// Total number of features across all kinds.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.transit.len() + self.bus_stops.len() + self.venues.len()
    }

    /// Whether the catalogue holds no features at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of features of `kind`.
    #[must_use]
    pub const fn count(&self, kind: PoiKind) -> usize {
        match kind {
            PoiKind::Transit => self.transit.len(),
            PoiKind::BusStop => self.bus_stops.len(),
            PoiKind::Venue => self.venues.len(),
        }
    }
}
