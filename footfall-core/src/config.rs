//! Analysis configuration and its validation rules.
//!
//! [`AnalysisConfig::default`] reproduces the reference Westminster
//! deployment. Every run validates its configuration before any stage runs.

use std::fmt;
use std::str::FromStr;

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::poi::PoiKind;

/// Number of footfall bands with reference labels and estimates.
pub const REFERENCE_CATEGORY_COUNT: usize = 8;

/// Candidate count above which [`PlacementStrategy::Auto`] falls back to
/// stride sampling.
pub const DEFAULT_DISPERSION_LIMIT: usize = 2_000;

/// Upper bound on lattice points scanned by the grid builder.
pub const MAX_LATTICE_POINTS: usize = 25_000_000;

/// Errors raised by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Bounding box is non-finite or has `min >= max` on an axis.
    #[error("invalid bounding box: {reason}")]
    InvalidBounds {
        /// What is wrong with the box.
        reason: String,
    },
    /// Cell resolution is not a positive finite number.
    #[error("cell resolution must be positive and finite, got {value}")]
    InvalidResolution {
        /// Offending resolution.
        value: f64,
    },
    /// Resolution yields more lattice points than the grid builder allows.
    #[error("resolution {resolution} yields {points} lattice points (limit {limit})")]
    ResolutionTooFine {
        /// Offending resolution.
        resolution: f64,
        /// Lattice points the resolution would require.
        points: usize,
        /// Maximum lattice size.
        limit: usize,
    },
    /// Influence radius is not a positive finite number.
    #[error("{kind} influence radius must be positive and finite, got {value}")]
    InvalidRadius {
        /// Kind the radius belongs to.
        kind: PoiKind,
        /// Offending radius.
        value: f64,
    },
    /// Combination weight is negative or non-finite.
    #[error("{kind} combination weight must be non-negative and finite, got {value}")]
    InvalidWeight {
        /// Kind the weight belongs to.
        kind: PoiKind,
        /// Offending weight.
        value: f64,
    },
    /// All combination weights are zero.
    #[error("combination weights must not all be zero")]
    ZeroWeightSum,
    /// Distance floor is not positive or not below every influence radius.
    #[error("distance floor must be positive and below every radius, got {value}")]
    InvalidDistanceFloor {
        /// Offending floor.
        value: f64,
    },
    /// Category count outside `1..=8`.
    #[error("category count must be between 1 and {max}, got {value}")]
    InvalidCategoryCount {
        /// Requested category count.
        value: usize,
        /// Largest supported count.
        max: usize,
    },
    /// Placement strategy name not recognised.
    #[error("unknown placement strategy `{name}` (expected auto, dispersion or stride)")]
    UnknownPlacement {
        /// Name that failed to parse.
        name: String,
    },
}

/// Axis-aligned study box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge (longitude).
    pub min_lon: f64,
    /// Eastern edge (longitude).
    pub max_lon: f64,
    /// Southern edge (latitude).
    pub min_lat: f64,
    /// Northern edge (latitude).
    pub max_lat: f64,
}

impl BoundingBox {
    /// Build a box from its four edges.
    #[must_use]
    pub const fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }

    /// Check the edges are finite and strictly ordered on both axes.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidBounds`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edges = [self.min_lon, self.max_lon, self.min_lat, self.max_lat];
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(ConfigError::InvalidBounds {
                reason: "edges must be finite".into(),
            });
        }
        if self.min_lon >= self.max_lon {
            return Err(ConfigError::InvalidBounds {
                reason: format!(
                    "min longitude {} is not below max longitude {}",
                    self.min_lon, self.max_lon
                ),
            });
        }
        if self.min_lat >= self.max_lat {
            return Err(ConfigError::InvalidBounds {
                reason: format!(
                    "min latitude {} is not below max latitude {}",
                    self.min_lat, self.max_lat
                ),
            });
        }
        Ok(())
    }

    /// Whether `point` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: Coord<f64>) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.x)
            && (self.min_lat..=self.max_lat).contains(&point.y)
    }

    /// Box as a `geo` rectangle.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min_lon,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lon,
                y: self.max_lat,
            },
        )
    }
}

/// Reach and relative importance of one POI kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Influence {
    /// Influence radius in degrees; POIs at or beyond it contribute nothing.
    pub radius: f64,
    /// Relative weight of the kind in the composite score.
    pub weight: f64,
}

impl Influence {
    /// Pair a radius with a combination weight.
    #[must_use]
    pub const fn new(radius: f64, weight: f64) -> Self {
        Self { radius, weight }
    }
}

/// Influence settings for every POI kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InfluenceSettings {
    /// Rail stations.
    pub transit: Influence,
    /// Bus stops.
    pub bus_stop: Influence,
    /// Licensed venues.
    pub venue: Influence,
}

impl InfluenceSettings {
    /// Settings for `kind`.
    #[must_use]
    pub const fn get(&self, kind: PoiKind) -> Influence {
        match kind {
            PoiKind::Transit => self.transit,
            PoiKind::BusStop => self.bus_stop,
            PoiKind::Venue => self.venue,
        }
    }

    /// Combination weights rescaled to sum to one, in [`PoiKind::ALL`] order.
    ///
    /// Callers must validate first; a zero sum yields all zeros.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "weights are rescaled by their sum"
    )]
    pub fn normalised_weights(&self) -> [f64; 3] {
        let raw = PoiKind::ALL.map(|kind| self.get(kind).weight);
        let total: f64 = raw.iter().sum();
        if total > 0.0 {
            raw.map(|weight| weight / total)
        } else {
            [0.0; 3]
        }
    }
}

impl Default for InfluenceSettings {
    fn default() -> Self {
        Self {
            transit: Influence::new(0.005, 0.45),
            bus_stop: Influence::new(0.002, 0.30),
            venue: Influence::new(0.0015, 0.25),
        }
    }
}

/// How sensors are sampled within each footfall category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStrategy {
    /// Dispersion for small categories, stride for large ones.
    Auto {
        /// Largest candidate count still sampled by dispersion.
        dispersion_limit: usize,
    },
    /// Greedy max-min distance sampling.
    Dispersion,
    /// Even stride through candidates sorted by latitude then longitude.
    Stride,
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        Self::Auto {
            dispersion_limit: DEFAULT_DISPERSION_LIMIT,
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto { .. } => f.write_str("auto"),
            Self::Dispersion => f.write_str("dispersion"),
            Self::Stride => f.write_str("stride"),
        }
    }
}

impl FromStr for PlacementStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::default()),
            "dispersion" => Ok(Self::Dispersion),
            "stride" => Ok(Self::Stride),
            _ => Err(ConfigError::UnknownPlacement { name: s.to_owned() }),
        }
    }
}

/// Immutable settings for one analysis run.
///
/// # Examples
/// ```
/// use footfall_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default().with_sensor_count(250);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.sensor_count, 250);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Study box scanned by the grid builder.
    pub bounds: BoundingBox,
    /// Lattice spacing in degrees.
    pub resolution: f64,
    /// Per-kind influence radii and combination weights.
    pub influence: InfluenceSettings,
    /// Minimum distance, in degrees, used inside the decay kernels.
    pub distance_floor: f64,
    /// Number of footfall categories `K`.
    pub category_count: usize,
    /// Number of sensors to place.
    pub sensor_count: usize,
    /// Within-category sampling strategy.
    pub placement: PlacementStrategy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::new(-0.20, -0.11, 51.485, 51.535),
            resolution: 0.001,
            influence: InfluenceSettings::default(),
            distance_floor: 1e-5,
            category_count: REFERENCE_CATEGORY_COUNT,
            sensor_count: 1_000,
            placement: PlacementStrategy::default(),
        }
    }
}

impl AnalysisConfig {
    /// Replace the lattice spacing.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Replace the sensor target.
    #[must_use]
    pub const fn with_sensor_count(mut self, sensor_count: usize) -> Self {
        self.sensor_count = sensor_count;
        self
    }

    /// Replace the category count.
    #[must_use]
    pub const fn with_category_count(mut self, category_count: usize) -> Self {
        self.category_count = category_count;
        self
    }

    /// Replace the placement strategy.
    #[must_use]
    pub const fn with_placement(mut self, placement: PlacementStrategy) -> Self {
        self.placement = placement;
        self
    }

    /// Replace the study box.
    #[must_use]
    pub const fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Bins further than this from every cell centre stay unassigned.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "threshold scales resolution")]
    pub fn assignment_threshold(&self) -> f64 {
        self.resolution * 2.0
    }

    /// Check every field against the rules the pipeline relies on.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found.
    #[expect(clippy::float_arithmetic, reason = "accumulate the weight total")]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::InvalidResolution {
                value: self.resolution,
            });
        }
        let mut smallest_radius = f64::INFINITY;
        let mut weight_sum = 0.0;
        for kind in PoiKind::ALL {
            let influence = self.influence.get(kind);
            if !influence.radius.is_finite() || influence.radius <= 0.0 {
                return Err(ConfigError::InvalidRadius {
                    kind,
                    value: influence.radius,
                });
            }
            if !influence.weight.is_finite() || influence.weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    kind,
                    value: influence.weight,
                });
            }
            smallest_radius = smallest_radius.min(influence.radius);
            weight_sum += influence.weight;
        }
        if weight_sum <= 0.0 {
            return Err(ConfigError::ZeroWeightSum);
        }
        if !self.distance_floor.is_finite()
            || self.distance_floor <= 0.0
            || self.distance_floor >= smallest_radius
        {
            return Err(ConfigError::InvalidDistanceFloor {
                value: self.distance_floor,
            });
        }
        if self.category_count == 0 || self.category_count > REFERENCE_CATEGORY_COUNT {
            return Err(ConfigError::InvalidCategoryCount {
                value: self.category_count,
                max: REFERENCE_CATEGORY_COUNT,
            });
        }
        Ok(())
    }
}
